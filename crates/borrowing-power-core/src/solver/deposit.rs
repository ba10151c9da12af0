//! Deposit constraint: for one LVR band, the property value whose required
//! deposit, net of duty and costs, exactly exhausts the available savings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BorrowingError;
use crate::stamp_duty::{PropertyPurpose, StateCode};
use crate::types::{with_metadata, ComputationOutput, LoanScenario, LvrBand, Money};
use crate::BorrowingResult;

use super::property::{solve_property_value, PropertyTarget, PurchaseContext};
use super::{ConstraintResult, CostBreakdown, LVR_TOLERANCE};

/// Width of the seeding window below the band's upper LVR.
const SEED_LVR_WINDOW: Decimal = dec!(0.10);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositSolverInput {
    pub savings: Money,
    pub state: StateCode,
    pub first_home_buyer: bool,
    pub investment: bool,
    pub foreign_resident: bool,
}

impl DepositSolverInput {
    pub fn purpose(&self) -> PropertyPurpose {
        if self.investment {
            PropertyPurpose::Investment
        } else {
            PropertyPurpose::OwnerOccupied
        }
    }

    fn validate(&self) -> BorrowingResult<()> {
        if self.savings < Decimal::ZERO {
            return Err(BorrowingError::InvalidInput {
                field: "savings".into(),
                reason: "Savings cannot be negative.".into(),
            });
        }
        Ok(())
    }
}

/// Solve one band: binary-search property value until the implied LVR meets
/// the band's upper bound, then report what that purchase looks like.
pub fn solve_deposit_band(
    input: &DepositSolverInput,
    band: LvrBand,
) -> BorrowingResult<ConstraintResult> {
    input.validate()?;

    let upper_lvr = band.upper_bound();
    let ctx = PurchaseContext {
        savings: input.savings,
        state: input.state,
        purpose: input.purpose(),
        first_home_buyer: input.first_home_buyer,
        foreign_resident: input.foreign_resident,
    };

    // Seed bounds: at `upper` the whole savings balance is deposit with no
    // costs; at `lower` the deposit share is a full window fatter.
    let upper = input.savings / (Decimal::ONE - upper_lvr);
    let lower = input.savings / (Decimal::ONE - (upper_lvr - SEED_LVR_WINDOW));

    let solution = solve_property_value(&ctx, PropertyTarget::UpperLvr(upper_lvr), lower, upper);
    let f = &solution.figures;

    let deposit_used = (f.property_value - f.loan_amount).max(Decimal::ZERO);
    Ok(ConstraintResult {
        band,
        loan_amount: f.loan_amount,
        property_value: f.property_value,
        achieved_lvr: f.lvr,
        band_match: solution.converged && band.matches_achieved(f.lvr, LVR_TOLERANCE),
        iterations: solution.iterations,
        costs: CostBreakdown {
            stamp_duty: f.stamp_duty,
            other_costs: f.total_costs - f.stamp_duty,
            deposit_used,
            remaining_savings: input.savings - f.total_costs - deposit_used,
        },
    })
}

// ---------------------------------------------------------------------------
// Deposit-only surface
// ---------------------------------------------------------------------------

/// Deposit-side answer for callers that only want purchase power from
/// savings, without the serviceability side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositResult {
    pub selected: ConstraintResult,
    pub band_results: Vec<ConstraintResult>,
}

/// The band a product scenario shops in on the deposit side: the tailored
/// product reaches to 85% LVR, everything else stops at 80%.
pub fn deposit_band_for_scenario(scenario: LoanScenario) -> LvrBand {
    match scenario {
        LoanScenario::Tailored => LvrBand::From80To85,
        _ => LvrBand::From70To80,
    }
}

pub fn calculate_deposit_only(
    input: &DepositSolverInput,
    scenario: LoanScenario,
) -> BorrowingResult<ComputationOutput<DepositResult>> {
    let start = Instant::now();

    let mut band_results = Vec::with_capacity(LvrBand::ALL.len());
    for band in LvrBand::ALL {
        band_results.push(solve_deposit_band(input, band)?);
    }

    let selected_band = deposit_band_for_scenario(scenario);
    let selected = band_results
        .iter()
        .find(|r| r.band == selected_band)
        .cloned()
        .ok_or_else(|| {
            BorrowingError::InsufficientData("No deposit result for the selected band.".into())
        })?;

    let mut warnings = Vec::new();
    if !selected.band_match {
        warnings.push(format!(
            "Deposit search for {:?} did not land in-band (achieved LVR {}).",
            selected.band, selected.achieved_lvr
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "state": input.state,
        "scenario": scenario,
        "first_home_buyer": input.first_home_buyer,
        "investment": input.investment,
    });

    Ok(with_metadata(
        "Deposit Constraint (per-band LVR search)",
        &assumptions,
        warnings,
        elapsed,
        DepositResult {
            selected,
            band_results,
        },
    ))
}
