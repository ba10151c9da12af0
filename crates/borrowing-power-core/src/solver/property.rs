//! The one property-value bisection both solvers share.
//!
//! At any candidate property value the same figures fall out: duty and costs
//! at that value, the deposit the savings can still fund, the loan that
//! bridges the gap, and the resulting LVR. The deposit solver drives the
//! search toward a band's upper LVR; the financial solver drives it toward a
//! known loan amount. Only the convergence test differs, so it is the
//! parameter.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stamp_duty::{duty_components, PropertyPurpose, StateCode, OTHER_PURCHASE_COSTS};
use crate::types::{Money, Rate};

use super::{LVR_TOLERANCE, MAX_ITERATIONS, SHORTFALL_TOLERANCE};

/// The purchase-side inputs that stay fixed across a search.
#[derive(Debug, Clone, Copy)]
pub struct PurchaseContext {
    pub savings: Money,
    pub state: StateCode,
    pub purpose: PropertyPurpose,
    pub first_home_buyer: bool,
    pub foreign_resident: bool,
}

/// What the search is converging on.
#[derive(Debug, Clone, Copy)]
pub enum PropertyTarget {
    /// Drive the implied LVR to a band's upper bound (deposit solver).
    UpperLvr(Rate),
    /// Drive the deposit-implied loan to a known amount (financial solver).
    LoanAmount(Money),
}

/// Derived figures at one candidate property value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFigures {
    pub property_value: Money,
    pub stamp_duty: Money,
    pub total_costs: Money,
    pub available_deposit: Money,
    pub loan_amount: Money,
    pub lvr: Rate,
}

#[derive(Debug, Clone)]
pub struct PropertySolution {
    pub figures: PropertyFigures,
    pub iterations: u32,
    pub converged: bool,
}

pub fn figures_at(ctx: &PurchaseContext, property_value: Money) -> PropertyFigures {
    let duty = duty_components(
        ctx.state,
        property_value.max(Decimal::ZERO),
        ctx.purpose,
        ctx.first_home_buyer,
        ctx.foreign_resident,
    );
    let total_costs = duty.total_duty + OTHER_PURCHASE_COSTS;
    let available_deposit = ctx.savings - total_costs;
    let loan_amount = (property_value - available_deposit).max(Decimal::ZERO);
    let lvr = if property_value > Decimal::ZERO {
        loan_amount / property_value
    } else {
        Decimal::ZERO
    };
    PropertyFigures {
        property_value,
        stamp_duty: duty.total_duty,
        total_costs,
        available_deposit,
        loan_amount,
        lvr,
    }
}

/// Bisect property value between `lower` and `upper` until the target test
/// passes or the iteration cap is hit. Both the implied LVR and the implied
/// loan rise monotonically with property value, so one bracketing loop
/// serves both targets.
pub fn solve_property_value(
    ctx: &PurchaseContext,
    target: PropertyTarget,
    mut lower: Money,
    mut upper: Money,
) -> PropertySolution {
    if upper < lower {
        std::mem::swap(&mut lower, &mut upper);
    }

    let mut value = (lower + upper) / Decimal::TWO;
    let mut figures = figures_at(ctx, value);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        figures = figures_at(ctx, value);

        let overshoot = match target {
            PropertyTarget::UpperLvr(target_lvr) => {
                let delta = figures.lvr - target_lvr;
                if delta.abs() < LVR_TOLERANCE {
                    converged = true;
                    break;
                }
                delta > Decimal::ZERO
            }
            PropertyTarget::LoanAmount(target_loan) => {
                let shortfall = figures.loan_amount - target_loan;
                if shortfall.abs() < SHORTFALL_TOLERANCE {
                    converged = true;
                    break;
                }
                shortfall > Decimal::ZERO
            }
        };

        if overshoot {
            upper = value;
        } else {
            lower = value;
        }
        value = (lower + upper) / Decimal::TWO;
    }

    PropertySolution {
        figures,
        iterations,
        converged,
    }
}
