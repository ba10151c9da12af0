//! Progressive income-tax assessment: marginal brackets, low-income offset
//! and the income levy, each driven by its own versioned bracket table.
//!
//! Pure functions with no validation: callers (the serviceability evaluator
//! and the orchestrator boundary) pre-sanitise income before calling in.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{round_cents, Money, Rate};

/// One row of a progressive table: applies to income in (low, high], charging
/// `base + rate × (income − low)`.
struct TaxBracket {
    low: Decimal,
    high: Decimal,
    base: Decimal,
    rate: Rate,
}

const UNBOUNDED: Decimal = Decimal::MAX;

/// Resident marginal rates, FY2023-24 table.
const INCOME_TAX_BRACKETS: &[TaxBracket] = &[
    TaxBracket { low: dec!(0), high: dec!(18_200), base: dec!(0), rate: dec!(0) },
    TaxBracket { low: dec!(18_200), high: dec!(45_000), base: dec!(0), rate: dec!(0.19) },
    TaxBracket { low: dec!(45_000), high: dec!(120_000), base: dec!(5_092), rate: dec!(0.325) },
    TaxBracket { low: dec!(120_000), high: dec!(180_000), base: dec!(29_467), rate: dec!(0.37) },
    TaxBracket { low: dec!(180_000), high: UNBOUNDED, base: dec!(51_667), rate: dec!(0.45) },
];

/// Low-income offset: a negative-sloped walk, floored at zero after lookup.
const OFFSET_BRACKETS: &[TaxBracket] = &[
    TaxBracket { low: dec!(0), high: dec!(37_500), base: dec!(700), rate: dec!(0) },
    TaxBracket { low: dec!(37_500), high: dec!(45_000), base: dec!(700), rate: dec!(-0.05) },
    TaxBracket { low: dec!(45_000), high: dec!(66_667), base: dec!(325), rate: dec!(-0.015) },
    TaxBracket { low: dec!(66_667), high: UNBOUNDED, base: dec!(0), rate: dec!(0) },
];

/// Levy phases in at 10c per dollar over the threshold until it meets the
/// flat 2% line; thresholds chosen so the rows join continuously.
const LEVY_BRACKETS: &[TaxBracket] = &[
    TaxBracket { low: dec!(0), high: dec!(24_276), base: dec!(0), rate: dec!(0) },
    TaxBracket { low: dec!(24_276), high: dec!(30_345), base: dec!(0), rate: dec!(0.10) },
    TaxBracket { low: dec!(30_345), high: UNBOUNDED, base: dec!(606.90), rate: dec!(0.02) },
];

/// Full assessment for one taxable income.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxAssessment {
    pub income_tax: Money,
    pub offset: Money,
    pub levy: Money,
    pub total_tax: Money,
}

/// Walk a bracket table: find the row whose (low, high] contains the income
/// and apply its linear formula. Income exactly on a boundary belongs to the
/// lower row.
fn bracket_amount(brackets: &[TaxBracket], income: Decimal) -> Decimal {
    // Incomes at or below the first row's low bound (zero, or unvalidated
    // negatives) collapse onto the first row, whose rate is always zero.
    let row = brackets
        .iter()
        .find(|b| income > b.low && income <= b.high)
        .unwrap_or(&brackets[0]);
    row.base + row.rate * (income - row.low).max(Decimal::ZERO)
}

pub fn calculate_income_tax(taxable_income: Money) -> Money {
    round_cents(bracket_amount(INCOME_TAX_BRACKETS, taxable_income).max(Decimal::ZERO))
}

pub fn calculate_offset(taxable_income: Money) -> Money {
    round_cents(bracket_amount(OFFSET_BRACKETS, taxable_income).max(Decimal::ZERO))
}

pub fn calculate_levy(taxable_income: Money) -> Money {
    round_cents(bracket_amount(LEVY_BRACKETS, taxable_income).max(Decimal::ZERO))
}

/// `total = max(0, income_tax − offset + levy)`, everything rounded to cents
/// half-up.
pub fn calculate_total_tax(taxable_income: Money) -> TaxAssessment {
    let income_tax = calculate_income_tax(taxable_income);
    let offset = calculate_offset(taxable_income);
    let levy = calculate_levy(taxable_income);
    let total_tax = round_cents((income_tax - offset + levy).max(Decimal::ZERO));
    TaxAssessment {
        income_tax,
        offset,
        levy,
        total_tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_income_pays_nothing() {
        let a = calculate_total_tax(dec!(0));
        assert_eq!(a.income_tax, dec!(0));
        assert_eq!(a.levy, dec!(0));
        assert_eq!(a.total_tax, dec!(0));
    }

    #[test]
    fn test_tax_free_threshold() {
        let a = calculate_total_tax(dec!(18_200));
        assert_eq!(a.income_tax, dec!(0));
        assert_eq!(a.total_tax, dec!(0));
    }

    #[test]
    fn test_hand_walk_100k() {
        // 5,092 + 0.325 × (100,000 − 45,000) = 22,967.00
        // offset: 0 (above 66,667)
        // levy: 606.90 + 0.02 × (100,000 − 30,345) = 2,000.00
        let a = calculate_total_tax(dec!(100_000));
        assert_eq!(a.income_tax, dec!(22_967.00));
        assert_eq!(a.offset, dec!(0));
        assert_eq!(a.levy, dec!(2_000.00));
        assert_eq!(a.total_tax, dec!(24_967.00));
    }

    #[test]
    fn test_offset_floors_total_at_zero() {
        // Just over the threshold: tiny marginal tax fully covered by offset.
        let a = calculate_total_tax(dec!(19_000));
        assert_eq!(a.income_tax, dec!(152.00)); // 0.19 × 800
        assert_eq!(a.offset, dec!(700.00));
        assert_eq!(a.total_tax, dec!(0));
    }

    #[test]
    fn test_offset_taper() {
        // 40,000: 700 − 0.05 × 2,500 = 575
        assert_eq!(calculate_offset(dec!(40_000)), dec!(575.00));
        // 50,000: 325 − 0.015 × 5,000 = 250
        assert_eq!(calculate_offset(dec!(50_000)), dec!(250.00));
        assert_eq!(calculate_offset(dec!(80_000)), dec!(0));
    }

    #[test]
    fn test_levy_is_continuous_at_phase_in_end() {
        // Phase-in meets the flat 2% line at 30,345.
        let below = calculate_levy(dec!(30_345));
        let above = calculate_levy(dec!(30_346));
        assert_eq!(below, dec!(606.90));
        assert!((above - below).abs() < dec!(0.03));
    }

    #[test]
    fn test_bracket_boundary_belongs_to_lower_row() {
        // 45,000 sits in the (18,200, 45,000] row: 0.19 × 26,800 = 5,092.
        assert_eq!(calculate_income_tax(dec!(45_000)), dec!(5_092.00));
        // One dollar more moves to the 32.5% row with the same base.
        assert_eq!(calculate_income_tax(dec!(45_001)), dec!(5_092.33));
    }

    #[test]
    fn test_top_bracket() {
        // 250,000: 51,667 + 0.45 × 70,000 = 83,167
        assert_eq!(calculate_income_tax(dec!(250_000)), dec!(83_167.00));
    }
}
