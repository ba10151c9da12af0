//! Per-band constraint solvers and their shared numeric search machinery.

pub mod deposit;
pub mod financial;
pub mod property;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{LvrBand, Money, Rate};

/// Hard cap on every binary search. Non-convergence at the cap is not an
/// error: the last estimate is returned with its iteration count.
pub const MAX_ITERATIONS: u32 = 20;

/// LVR agreement required to call a band search converged.
pub const LVR_TOLERANCE: Decimal = dec!(0.0001);

/// Annual-surplus agreement required by the investment loan search.
pub const SURPLUS_TOLERANCE: Decimal = dec!(100);

/// Deposit-shortfall agreement required by the implied-property search.
pub const SHORTFALL_TOLERANCE: Decimal = dec!(10);

/// Cash consumed by a purchase at the solved property value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub stamp_duty: Money,
    pub other_costs: Money,
    pub deposit_used: Money,
    pub remaining_savings: Money,
}

/// One band's answer from either solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub band: LvrBand,
    pub loan_amount: Money,
    pub property_value: Money,
    pub achieved_lvr: Rate,
    /// Whether the achieved LVR actually landed inside the targeted band.
    /// Bands are solved independently; a mismatch is information for the
    /// orchestrator, not a failure.
    pub band_match: bool,
    pub iterations: u32,
    pub costs: CostBreakdown,
}
