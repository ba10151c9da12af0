//! State transfer-duty engine: progressive per-state threshold tables,
//! first-home-buyer concessions and the foreign-resident surcharge.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BorrowingError;
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Rate};
use crate::BorrowingResult;

/// Conveyancing, transfer registration and sundry purchase costs, flat.
pub const OTHER_PURCHASE_COSTS: Decimal = dec!(1_500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateCode {
    NSW,
    VIC,
    QLD,
    WA,
    SA,
    TAS,
    ACT,
    NT,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyPurpose {
    OwnerOccupied,
    Investment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampDutyInput {
    pub state: StateCode,
    pub property_price: Money,
    pub purpose: PropertyPurpose,
    pub first_home_buyer: bool,
    pub foreign_resident: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampDutyResult {
    pub base_duty: Money,
    pub concession: Money,
    pub surcharge: Money,
    pub total_duty: Money,
}

// ---------------------------------------------------------------------------
// State tables (versioned lookup data)
// ---------------------------------------------------------------------------

struct DutyThreshold {
    min: Decimal,
    base: Decimal,
    rate: Rate,
}

struct StateDutyTable {
    state: StateCode,
    thresholds: &'static [DutyThreshold],
    /// First-home full exemption up to this price (owner-occupied only).
    fhb_exemption: Decimal,
    /// Concession slides linearly to zero at this price.
    fhb_concession_limit: Decimal,
    foreign_surcharge: Rate,
}

#[rustfmt::skip]
const DUTY_TABLES: &[StateDutyTable] = &[
    StateDutyTable {
        state: StateCode::NSW,
        thresholds: &[
            DutyThreshold { min: dec!(0), base: dec!(0), rate: dec!(0.0125) },
            DutyThreshold { min: dec!(16_000), base: dec!(200), rate: dec!(0.015) },
            DutyThreshold { min: dec!(35_000), base: dec!(485), rate: dec!(0.0175) },
            DutyThreshold { min: dec!(93_000), base: dec!(1_500), rate: dec!(0.035) },
            DutyThreshold { min: dec!(351_000), base: dec!(10_530), rate: dec!(0.045) },
            DutyThreshold { min: dec!(1_168_000), base: dec!(47_295), rate: dec!(0.055) },
        ],
        fhb_exemption: dec!(800_000),
        fhb_concession_limit: dec!(1_000_000),
        foreign_surcharge: dec!(0.08),
    },
    StateDutyTable {
        state: StateCode::VIC,
        thresholds: &[
            DutyThreshold { min: dec!(0), base: dec!(0), rate: dec!(0.014) },
            DutyThreshold { min: dec!(25_000), base: dec!(350), rate: dec!(0.024) },
            DutyThreshold { min: dec!(130_000), base: dec!(2_870), rate: dec!(0.05) },
            DutyThreshold { min: dec!(440_000), base: dec!(18_370), rate: dec!(0.06) },
            DutyThreshold { min: dec!(960_000), base: dec!(49_570), rate: dec!(0.065) },
        ],
        fhb_exemption: dec!(600_000),
        fhb_concession_limit: dec!(750_000),
        foreign_surcharge: dec!(0.08),
    },
    StateDutyTable {
        state: StateCode::QLD,
        thresholds: &[
            DutyThreshold { min: dec!(0), base: dec!(0), rate: dec!(0) },
            DutyThreshold { min: dec!(5_000), base: dec!(0), rate: dec!(0.015) },
            DutyThreshold { min: dec!(75_000), base: dec!(1_050), rate: dec!(0.035) },
            DutyThreshold { min: dec!(540_000), base: dec!(17_325), rate: dec!(0.045) },
            DutyThreshold { min: dec!(1_000_000), base: dec!(38_025), rate: dec!(0.0575) },
        ],
        fhb_exemption: dec!(500_000),
        fhb_concession_limit: dec!(550_000),
        foreign_surcharge: dec!(0.07),
    },
];

/// States without a loaded table use the NSW table rather than erroring.
fn table_for_state(state: StateCode) -> &'static StateDutyTable {
    DUTY_TABLES
        .iter()
        .find(|t| t.state == state)
        .unwrap_or(&DUTY_TABLES[0])
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

fn base_duty(table: &StateDutyTable, price: Money) -> Money {
    let row = table
        .thresholds
        .iter()
        .rev()
        .find(|t| price >= t.min)
        .unwrap_or(&table.thresholds[0]);
    row.base + row.rate * (price - row.min).max(Decimal::ZERO)
}

fn first_home_concession(table: &StateDutyTable, price: Money, duty: Money) -> Money {
    if price <= table.fhb_exemption {
        return duty;
    }
    if price >= table.fhb_concession_limit {
        return Decimal::ZERO;
    }
    // Linear slide: 100% concession at the exemption price, 0% at the limit.
    let span = table.fhb_concession_limit - table.fhb_exemption;
    let factor = (table.fhb_concession_limit - price) / span;
    duty * factor
}

/// Duty components without the output envelope; the deposit and financial
/// solvers call this at every search step.
pub fn duty_components(
    state: StateCode,
    price: Money,
    purpose: PropertyPurpose,
    first_home_buyer: bool,
    foreign_resident: bool,
) -> StampDutyResult {
    let table = table_for_state(state);
    let base = base_duty(table, price);

    let concession = if first_home_buyer && purpose == PropertyPurpose::OwnerOccupied {
        first_home_concession(table, price, base)
    } else {
        Decimal::ZERO
    };

    let surcharge = if foreign_resident {
        table.foreign_surcharge * price
    } else {
        Decimal::ZERO
    };

    let total = (base - concession).max(Decimal::ZERO) + surcharge;

    StampDutyResult {
        base_duty: round_cents(base),
        concession: round_cents(concession),
        surcharge: round_cents(surcharge),
        total_duty: round_cents(total),
    }
}

/// Duty plus flat legal/transfer costs: the all-in cash cost of a purchase
/// over and above the deposit.
pub fn purchase_costs(
    state: StateCode,
    price: Money,
    purpose: PropertyPurpose,
    first_home_buyer: bool,
    foreign_resident: bool,
) -> Money {
    duty_components(state, price, purpose, first_home_buyer, foreign_resident).total_duty
        + OTHER_PURCHASE_COSTS
}

/// Public duty calculation with input validation and the standard envelope.
pub fn calculate_stamp_duty(
    input: &StampDutyInput,
) -> BorrowingResult<ComputationOutput<StampDutyResult>> {
    let start = Instant::now();

    if input.property_price < Decimal::ZERO {
        return Err(BorrowingError::InvalidInput {
            field: "property_price".into(),
            reason: "Property price cannot be negative.".into(),
        });
    }

    let result = duty_components(
        input.state,
        input.property_price,
        input.purpose,
        input.first_home_buyer,
        input.foreign_resident,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "state": input.state,
        "first_home_buyer": input.first_home_buyer,
        "foreign_resident": input.foreign_resident,
    });

    Ok(with_metadata(
        "Progressive Transfer Duty (state threshold tables)",
        &assumptions,
        Vec::new(),
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nsw_input(price: Decimal) -> StampDutyInput {
        StampDutyInput {
            state: StateCode::NSW,
            property_price: price,
            purpose: PropertyPurpose::OwnerOccupied,
            first_home_buyer: false,
            foreign_resident: false,
        }
    }

    #[test]
    fn test_nsw_base_duty_walk() {
        // 600,000: 10,530 + 0.045 × (600,000 − 351,000) = 21,735
        let r = calculate_stamp_duty(&nsw_input(dec!(600_000))).unwrap();
        assert_eq!(r.result.base_duty, dec!(21_735.00));
        assert_eq!(r.result.total_duty, dec!(21_735.00));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = calculate_stamp_duty(&nsw_input(dec!(-1))).unwrap_err();
        match err {
            BorrowingError::InvalidInput { field, .. } => assert_eq!(field, "property_price"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_fhb_exemption_at_threshold() {
        let mut input = nsw_input(dec!(800_000));
        input.first_home_buyer = true;
        let r = calculate_stamp_duty(&input).unwrap();
        assert_eq!(r.result.total_duty, dec!(0.00));
        assert_eq!(r.result.concession, r.result.base_duty);
    }

    #[test]
    fn test_fhb_continuity_one_dollar_over() {
        // One dollar over the exemption: concession factor ≈ 1, duty ≈ 0.
        let mut input = nsw_input(dec!(800_001));
        input.first_home_buyer = true;
        let r = calculate_stamp_duty(&input).unwrap();
        assert!(r.result.total_duty < dec!(1.00));
        assert!(r.result.concession > dec!(0));
    }

    #[test]
    fn test_fhb_concession_midpoint() {
        // Halfway along the slide the concession is half the base duty.
        let mut input = nsw_input(dec!(900_000));
        input.first_home_buyer = true;
        let r = calculate_stamp_duty(&input).unwrap();
        let expected = round_cents(r.result.base_duty / dec!(2));
        assert!((r.result.concession - expected).abs() <= dec!(0.01));
    }

    #[test]
    fn test_fhb_no_concession_above_limit() {
        let mut input = nsw_input(dec!(1_000_000));
        input.first_home_buyer = true;
        let r = calculate_stamp_duty(&input).unwrap();
        assert_eq!(r.result.concession, dec!(0.00));
    }

    #[test]
    fn test_fhb_ignored_for_investment() {
        let mut input = nsw_input(dec!(700_000));
        input.first_home_buyer = true;
        input.purpose = PropertyPurpose::Investment;
        let r = calculate_stamp_duty(&input).unwrap();
        assert_eq!(r.result.concession, dec!(0.00));
        assert!(r.result.total_duty > dec!(0));
    }

    #[test]
    fn test_foreign_surcharge_additive() {
        let mut input = nsw_input(dec!(500_000));
        input.foreign_resident = true;
        let r = calculate_stamp_duty(&input).unwrap();
        assert_eq!(r.result.surcharge, dec!(40_000.00)); // 8% of price
        assert_eq!(r.result.total_duty, r.result.base_duty + r.result.surcharge);
    }

    #[test]
    fn test_qld_low_value_band_free() {
        let input = StampDutyInput {
            state: StateCode::QLD,
            property_price: dec!(4_000),
            purpose: PropertyPurpose::OwnerOccupied,
            first_home_buyer: false,
            foreign_resident: false,
        };
        let r = calculate_stamp_duty(&input).unwrap();
        assert_eq!(r.result.total_duty, dec!(0.00));
    }

    #[test]
    fn test_purchase_costs_include_flat_costs() {
        let costs = purchase_costs(
            StateCode::NSW,
            dec!(600_000),
            PropertyPurpose::OwnerOccupied,
            false,
            false,
        );
        assert_eq!(costs, dec!(21_735.00) + OTHER_PURCHASE_COSTS);
    }

    #[test]
    fn test_unloaded_state_falls_back_to_nsw_table() {
        let mut input = nsw_input(dec!(600_000));
        input.state = StateCode::TAS;
        let r = calculate_stamp_duty(&input).unwrap();
        assert_eq!(r.result.base_duty, dec!(21_735.00));
    }

    #[test]
    fn test_vic_duty_walk() {
        // 500,000: 18,370 + 0.06 × 60,000 = 21,970
        let input = StampDutyInput {
            state: StateCode::VIC,
            property_price: dec!(500_000),
            purpose: PropertyPurpose::OwnerOccupied,
            first_home_buyer: false,
            foreign_resident: false,
        };
        let r = calculate_stamp_duty(&input).unwrap();
        assert_eq!(r.result.base_duty, dec!(21_970.00));
    }
}
