//! Financial (serviceability) constraint: for one LVR band, the largest loan
//! that keeps the household surplus at zero, plus the property value that
//! loan and the savings together imply.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::loan_from_payment;
use crate::serviceability::{evaluate, ServiceabilityAssessment, ASSESSMENT_RATE_BUFFER};
use crate::stamp_duty::{PropertyPurpose, StateCode};
use crate::types::{FinancialsInput, LoanPreferences, LvrBand, Money, Rate};

use super::property::{solve_property_value, PropertyTarget, PurchaseContext};
use super::{ConstraintResult, CostBreakdown, LVR_TOLERANCE, MAX_ITERATIONS, SURPLUS_TOLERANCE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSolverInput {
    pub financials: FinancialsInput,
    pub preferences: LoanPreferences,
    /// Band-resolved product rate (pre-buffer).
    pub annual_rate: Rate,
    pub investment: bool,
    pub savings: Money,
    pub state: StateCode,
    pub first_home_buyer: bool,
    pub foreign_resident: bool,
    pub postcode: u32,
}

impl FinancialSolverInput {
    fn purpose(&self) -> PropertyPurpose {
        if self.investment {
            PropertyPurpose::Investment
        } else {
            PropertyPurpose::OwnerOccupied
        }
    }

    fn surplus_with_loan(&self, loan_amount: Money) -> ServiceabilityAssessment {
        evaluate(
            &self.financials,
            loan_amount,
            self.annual_rate,
            &self.preferences,
            self.investment,
            self.postcode,
        )
    }
}

/// Closed-form owner-occupied sizing: the zero-loan monthly surplus is the
/// payment capacity; invert the annuity at the buffered rate.
fn closed_form_loan(input: &FinancialSolverInput, zero_loan: &ServiceabilityAssessment) -> Money {
    loan_from_payment(
        zero_loan.monthly_surplus,
        input.annual_rate + ASSESSMENT_RATE_BUFFER,
        input.preferences.effective_pi_months(),
    )
}

/// Investment sizing has no closed form: the deductible interest feeds back
/// into taxable income, which feeds back into the affordable loan. Seed from
/// the closed form, expand the upper bound while the surplus is still
/// positive, then bisect on annual surplus.
fn search_investment_loan(
    input: &FinancialSolverInput,
    seed: Money,
) -> (Money, u32) {
    let mut lower = Decimal::ZERO;
    let mut upper = seed.max(dec!(1_000));
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let surplus = input.surplus_with_loan(upper).annual_surplus;
        if surplus.abs() < SURPLUS_TOLERANCE {
            return (upper, iterations);
        }
        if surplus < Decimal::ZERO {
            break;
        }
        lower = upper;
        upper *= Decimal::TWO;
    }

    let mut best = (lower + upper) / Decimal::TWO;
    while iterations < MAX_ITERATIONS {
        iterations += 1;
        best = (lower + upper) / Decimal::TWO;
        let surplus = input.surplus_with_loan(best).annual_surplus;
        if surplus.abs() < SURPLUS_TOLERANCE {
            break;
        }
        if surplus > Decimal::ZERO {
            lower = best;
        } else {
            upper = best;
        }
    }
    (best, iterations)
}

/// Solve one band: size the loan against serviceability, then resolve the
/// property value that loan implies through the shared deposit-sufficiency
/// search.
pub fn solve_financial_band(input: &FinancialSolverInput, band: LvrBand) -> ConstraintResult {
    let zero_loan = input.surplus_with_loan(Decimal::ZERO);

    let (loan_amount, loan_iterations) = if zero_loan.monthly_surplus <= Decimal::ZERO {
        (Decimal::ZERO, 0)
    } else if input.investment {
        let seed = closed_form_loan(input, &zero_loan);
        search_investment_loan(input, seed)
    } else {
        (closed_form_loan(input, &zero_loan), 0)
    };

    let ctx = PurchaseContext {
        savings: input.savings,
        state: input.state,
        purpose: input.purpose(),
        first_home_buyer: input.first_home_buyer,
        foreign_resident: input.foreign_resident,
    };

    // Property value lives between "all loan, no deposit" and "loan plus the
    // whole savings balance"; the shared bisection finds where the deposit
    // shortfall closes.
    let solution = solve_property_value(
        &ctx,
        PropertyTarget::LoanAmount(loan_amount),
        loan_amount,
        loan_amount + input.savings,
    );
    let f = &solution.figures;

    let deposit_used = (f.property_value - f.loan_amount).max(Decimal::ZERO);
    ConstraintResult {
        band,
        loan_amount,
        property_value: f.property_value,
        achieved_lvr: f.lvr,
        band_match: band.matches_achieved(f.lvr, LVR_TOLERANCE),
        iterations: loan_iterations + solution.iterations,
        costs: CostBreakdown {
            stamp_duty: f.stamp_duty,
            other_costs: f.total_costs - f.stamp_duty,
            deposit_used,
            remaining_savings: input.savings - f.total_costs - deposit_used,
        },
    }
}
