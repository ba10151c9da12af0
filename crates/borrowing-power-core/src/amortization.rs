//! Annuity maths shared by the serviceability evaluator and the financial
//! constraint solver.
//!
//! Degenerate denominators (zero loan, zero periods, zero monthly rate) are
//! special-cased to safe values (zero repayment, linear division) rather
//! than surfacing as errors; these functions sit inside iterative searches
//! where a best-effort figure beats an abort.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Months of schedule the investment interest-deduction looks at.
const DEDUCTION_WINDOW_MONTHS: u32 = 60;

fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / MONTHS_PER_YEAR
}

/// Standard amortising monthly repayment:
/// `PMT = PV × r / (1 − (1+r)^−n)`.
pub fn monthly_payment(principal: Money, annual_rate: Rate, months: u32) -> Money {
    if principal <= Decimal::ZERO || months == 0 {
        return Decimal::ZERO;
    }
    let r = monthly_rate(annual_rate);
    if r.is_zero() {
        return principal / Decimal::from(months);
    }
    let factor = (Decimal::ONE + r).powd(Decimal::from(months));
    let annuity = (Decimal::ONE - Decimal::ONE / factor) / r;
    if annuity.is_zero() {
        return Decimal::ZERO;
    }
    principal / annuity
}

/// Invert the annuity formula: the principal a given monthly payment can
/// service over `months` at `annual_rate`.
/// `PV = PMT × (1 − (1+r)^−n) / r`.
pub fn loan_from_payment(payment: Money, annual_rate: Rate, months: u32) -> Money {
    if payment <= Decimal::ZERO || months == 0 {
        return Decimal::ZERO;
    }
    let r = monthly_rate(annual_rate);
    if r.is_zero() {
        return payment * Decimal::from(months);
    }
    let factor = (Decimal::ONE + r).powd(Decimal::from(months));
    payment * (Decimal::ONE - Decimal::ONE / factor) / r
}

/// Average annual interest over the first five years of a principal-and-
/// interest schedule. Used to size the deductible-interest figure for
/// investment lending when the loan is not interest-only.
pub fn average_annual_interest(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    if principal <= Decimal::ZERO || term_months == 0 || annual_rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let r = monthly_rate(annual_rate);
    let payment = monthly_payment(principal, annual_rate, term_months);
    let window = term_months.min(DEDUCTION_WINDOW_MONTHS);

    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    for _ in 0..window {
        let interest = balance * r;
        total_interest += interest;
        balance -= payment - interest;
        if balance <= Decimal::ZERO {
            break;
        }
    }

    let years = Decimal::from(window) / MONTHS_PER_YEAR;
    total_interest / years
}
