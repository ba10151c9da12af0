//! Serviceability evaluator: given a candidate loan, what annual surplus or
//! deficit does the household run after tax, the expense floor, buffered
//! existing debts and the buffered repayment on the candidate loan?
//!
//! Pure and unvalidated by contract: the orchestrator sanitises inputs
//! before anything reaches this module.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{average_annual_interest, monthly_payment};
use crate::expenses::{higher_of_declared_or_benchmark, ExpenseDecision, ExpenseParams, MaritalStatus};
use crate::tax::calculate_total_tax;
use crate::types::{Arrangement, FinancialsInput, LoanPreferences, Money, Rate};

// Income shading: the fraction of each declared stream the assessment trusts.
const SHADE_BASE: Decimal = dec!(0.90);
const SHADE_SUPPLEMENTARY: Decimal = dec!(0.80);
const SHADE_OTHER: Decimal = dec!(0.80);
const SHADE_RENTAL: Decimal = dec!(0.80);

/// Existing home-loan repayments are assessed at 1.3× the declared figure.
const HOME_LOAN_BUFFER: Decimal = dec!(1.3);

/// Revolving credit costs 3.8% of the limit per month regardless of balance.
const REVOLVING_MONTHLY_FACTOR: Decimal = dec!(0.038);

/// Added to the product rate when assessing the candidate loan's repayment.
pub const ASSESSMENT_RATE_BUFFER: Decimal = dec!(0.03);

const MONTHS_PER_YEAR: Decimal = dec!(12);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceabilityAssessment {
    pub monthly_surplus: Money,
    pub annual_surplus: Money,
    pub shaded_gross_annual: Money,
    pub net_annual_income: Money,
    pub annual_deductible_interest: Money,
    pub monthly_expenses: Money,
    pub monthly_liabilities: Money,
    pub monthly_repayment: Money,
    pub expense_decision: ExpenseDecision,
}

fn shaded_annual(applicant: &crate::types::ApplicantIncome) -> Money {
    applicant.base.annualised() * SHADE_BASE
        + applicant.supplementary.annualised() * SHADE_SUPPLEMENTARY
        + applicant.other.annualised() * SHADE_OTHER
        + applicant.rental.annualised() * SHADE_RENTAL
}

pub fn marital_status_for(arrangement: Arrangement) -> MaritalStatus {
    match arrangement {
        Arrangement::Single => MaritalStatus::Single,
        Arrangement::Joint => MaritalStatus::Couple,
    }
}

/// Annual interest the household can deduct on an investment loan: the full
/// interest bill when interest-only, otherwise the average over the first
/// five years of the amortising schedule.
fn deductible_interest(
    loan_amount: Money,
    annual_rate: Rate,
    preferences: &LoanPreferences,
) -> Money {
    if preferences.is_interest_only() {
        loan_amount * annual_rate
    } else {
        average_annual_interest(loan_amount, annual_rate, preferences.effective_pi_months())
    }
}

/// Evaluate the household's surplus with `loan_amount` on the books at
/// `annual_rate` (pre-buffer product rate).
pub fn evaluate(
    financials: &FinancialsInput,
    loan_amount: Money,
    annual_rate: Rate,
    preferences: &LoanPreferences,
    investment: bool,
    postcode: u32,
) -> ServiceabilityAssessment {
    let shaded: Vec<Money> = financials.applicants.iter().map(shaded_annual).collect();
    let shaded_gross_annual: Money = shaded.iter().copied().sum();

    let annual_deductible_interest = if investment {
        deductible_interest(loan_amount, annual_rate, preferences)
    } else {
        Decimal::ZERO
    };

    // Tax per applicant on shaded income, with the deduction apportioned
    // pro-rata by each applicant's share of shaded income.
    let mut total_tax = Decimal::ZERO;
    for applicant_shaded in &shaded {
        let share = if shaded_gross_annual.is_zero() {
            Decimal::ZERO
        } else {
            applicant_shaded / shaded_gross_annual
        };
        let taxable =
            (applicant_shaded - annual_deductible_interest * share).max(Decimal::ZERO);
        total_tax += calculate_total_tax(taxable).total_tax;
    }
    let net_annual_income = shaded_gross_annual - total_tax;

    let expense_decision = higher_of_declared_or_benchmark(
        financials.liabilities.declared_expenses.annualised(),
        &ExpenseParams {
            postcode,
            gross_annual_income: financials.gross_annual_income(),
            marital_status: marital_status_for(financials.arrangement),
            dependents: financials.dependents,
        },
    );
    let monthly_expenses = expense_decision.annual / MONTHS_PER_YEAR;

    let monthly_liabilities = financials.liabilities.home_loan_repayments.per_month()
        * HOME_LOAN_BUFFER
        + financials.liabilities.other_loan_repayments.per_month()
        + financials.liabilities.revolving_credit_limit * REVOLVING_MONTHLY_FACTOR;

    // monthly_payment already forces a zero repayment for a zero loan.
    let monthly_repayment = monthly_payment(
        loan_amount,
        annual_rate + ASSESSMENT_RATE_BUFFER,
        preferences.effective_pi_months(),
    );

    let monthly_surplus = net_annual_income / MONTHS_PER_YEAR
        - monthly_expenses
        - monthly_liabilities
        - monthly_repayment;

    ServiceabilityAssessment {
        monthly_surplus,
        annual_surplus: monthly_surplus * MONTHS_PER_YEAR,
        shaded_gross_annual,
        net_annual_income,
        annual_deductible_interest,
        monthly_expenses,
        monthly_liabilities,
        monthly_repayment,
        expense_decision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ApplicantIncome, Frequency, Liabilities, PeriodicAmount, RepaymentType,
    };

    fn salary_only(annual: Decimal) -> ApplicantIncome {
        ApplicantIncome {
            base: PeriodicAmount::annual(annual),
            supplementary: PeriodicAmount::zero(),
            other: PeriodicAmount::zero(),
            rental: PeriodicAmount::zero(),
        }
    }

    fn sample_household() -> FinancialsInput {
        FinancialsInput {
            arrangement: Arrangement::Single,
            applicants: vec![salary_only(dec!(110_000))],
            dependents: 0,
            liabilities: Liabilities {
                declared_expenses: PeriodicAmount {
                    amount: dec!(2_400),
                    frequency: Frequency::Monthly,
                },
                home_loan_repayments: PeriodicAmount::zero(),
                other_loan_repayments: PeriodicAmount::zero(),
                revolving_credit_limit: dec!(0),
            },
        }
    }

    fn prefs() -> LoanPreferences {
        LoanPreferences::default()
    }

    #[test]
    fn test_zero_loan_has_no_repayment() {
        let a = evaluate(&sample_household(), dec!(0), dec!(0.06), &prefs(), false, 2000);
        assert_eq!(a.monthly_repayment, dec!(0));
        assert!(a.monthly_surplus > dec!(0));
    }

    #[test]
    fn test_income_shading_applied() {
        let a = evaluate(&sample_household(), dec!(0), dec!(0.06), &prefs(), false, 2000);
        // 110,000 × 0.90 = 99,000
        assert_eq!(a.shaded_gross_annual, dec!(99_000));
    }

    #[test]
    fn test_larger_loan_lowers_surplus() {
        let h = sample_household();
        let small = evaluate(&h, dec!(200_000), dec!(0.06), &prefs(), false, 2000);
        let large = evaluate(&h, dec!(400_000), dec!(0.06), &prefs(), false, 2000);
        assert!(large.monthly_surplus < small.monthly_surplus);
    }

    #[test]
    fn test_repayment_uses_buffered_rate() {
        let h = sample_household();
        let a = evaluate(&h, dec!(300_000), dec!(0.06), &prefs(), false, 2000);
        let unbuffered = crate::amortization::monthly_payment(dec!(300_000), dec!(0.06), 360);
        assert!(a.monthly_repayment > unbuffered);
    }

    #[test]
    fn test_revolving_credit_costs_against_surplus() {
        let mut h = sample_household();
        let before = evaluate(&h, dec!(0), dec!(0.06), &prefs(), false, 2000);
        h.liabilities.revolving_credit_limit = dec!(10_000);
        let after = evaluate(&h, dec!(0), dec!(0.06), &prefs(), false, 2000);
        // 10,000 × 0.038 = 380/month
        assert_eq!(before.monthly_surplus - after.monthly_surplus, dec!(380));
    }

    #[test]
    fn test_home_loan_buffer_multiplier() {
        let mut h = sample_household();
        h.liabilities.home_loan_repayments = PeriodicAmount::monthly(dec!(1_000));
        let a = evaluate(&h, dec!(0), dec!(0.06), &prefs(), false, 2000);
        assert_eq!(a.monthly_liabilities, dec!(1_300));
    }

    #[test]
    fn test_expense_floor_uses_benchmark_when_declared_low() {
        let mut h = sample_household();
        h.liabilities.declared_expenses = PeriodicAmount::annual(dec!(6_000));
        let a = evaluate(&h, dec!(0), dec!(0.06), &prefs(), false, 2000);
        assert!(a.expense_decision.benchmark_used);
        assert_eq!(a.monthly_expenses * dec!(12), a.expense_decision.benchmark_annual);
    }

    #[test]
    fn test_investment_deduction_improves_surplus() {
        let h = sample_household();
        let loan = dec!(400_000);
        let owner = evaluate(&h, loan, dec!(0.06), &prefs(), false, 2000);
        let investor = evaluate(&h, loan, dec!(0.06), &prefs(), true, 2000);
        assert!(investor.annual_deductible_interest > dec!(0));
        assert!(investor.monthly_surplus > owner.monthly_surplus);
    }

    #[test]
    fn test_interest_only_deduction_is_full_interest() {
        let h = sample_household();
        let io_prefs = LoanPreferences {
            repayment_type: RepaymentType::InterestOnly { years: 5 },
            ..LoanPreferences::default()
        };
        let a = evaluate(&h, dec!(400_000), dec!(0.06), &io_prefs, true, 2000);
        assert_eq!(a.annual_deductible_interest, dec!(24_000));
    }

    #[test]
    fn test_joint_applicants_taxed_separately() {
        // Two applicants at 55k each pay less combined tax than one at 110k.
        let single = sample_household();
        let joint = FinancialsInput {
            arrangement: Arrangement::Joint,
            applicants: vec![salary_only(dec!(55_000)), salary_only(dec!(55_000))],
            ..sample_household()
        };
        let s = evaluate(&single, dec!(0), dec!(0.06), &prefs(), false, 2000);
        let j = evaluate(&joint, dec!(0), dec!(0.06), &prefs(), false, 2000);
        assert_eq!(s.shaded_gross_annual, j.shaded_gross_annual);
        assert!(j.net_annual_income > s.net_annual_income);
    }
}
