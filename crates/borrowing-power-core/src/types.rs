use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BorrowingError;
use crate::BorrowingResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.0599 = 5.99%). Never as percentages.
pub type Rate = Decimal;

/// Round a monetary amount to cents, half-up.
pub fn round_cents(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Household financials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Weekly,
    Fortnightly,
    Monthly,
    Annual,
}

impl Frequency {
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            Frequency::Weekly => dec!(52),
            Frequency::Fortnightly => dec!(26),
            Frequency::Monthly => dec!(12),
            Frequency::Annual => Decimal::ONE,
        }
    }
}

/// An amount declared at some payment frequency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeriodicAmount {
    pub amount: Money,
    pub frequency: Frequency,
}

impl PeriodicAmount {
    pub fn annual(amount: Money) -> Self {
        PeriodicAmount {
            amount,
            frequency: Frequency::Annual,
        }
    }

    pub fn monthly(amount: Money) -> Self {
        PeriodicAmount {
            amount,
            frequency: Frequency::Monthly,
        }
    }

    pub fn zero() -> Self {
        PeriodicAmount::annual(Decimal::ZERO)
    }

    pub fn annualised(&self) -> Money {
        self.amount * self.frequency.periods_per_year()
    }

    pub fn per_month(&self) -> Money {
        self.annualised() / dec!(12)
    }
}

/// One applicant's declared income streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantIncome {
    pub base: PeriodicAmount,
    pub supplementary: PeriodicAmount,
    pub other: PeriodicAmount,
    pub rental: PeriodicAmount,
}

impl ApplicantIncome {
    pub fn gross_annual(&self) -> Money {
        self.base.annualised()
            + self.supplementary.annualised()
            + self.other.annualised()
            + self.rental.annualised()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arrangement {
    Single,
    Joint,
}

/// Declared liabilities for the household.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liabilities {
    pub declared_expenses: PeriodicAmount,
    pub home_loan_repayments: PeriodicAmount,
    pub other_loan_repayments: PeriodicAmount,
    pub revolving_credit_limit: Money,
}

/// Immutable snapshot of the household's financial position. The engine never
/// mutates this; scenario perturbations clone it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialsInput {
    pub arrangement: Arrangement,
    pub applicants: Vec<ApplicantIncome>,
    pub dependents: u32,
    pub liabilities: Liabilities,
}

impl FinancialsInput {
    pub fn gross_annual_income(&self) -> Money {
        self.applicants.iter().map(|a| a.gross_annual()).sum()
    }
}

// ---------------------------------------------------------------------------
// Loan preferences and product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateType {
    Variable,
    Fixed { years: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentType {
    PrincipalAndInterest,
    InterestOnly { years: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    Redraw,
    Offset,
}

/// Fully-typed loan preferences, validated once at the orchestrator boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoanPreferences {
    pub rate_type: RateType,
    pub repayment_type: RepaymentType,
    pub term_years: u32,
    pub feature: FeatureType,
}

impl LoanPreferences {
    /// Months of principal-and-interest amortisation once any interest-only
    /// period has elapsed.
    pub fn effective_pi_months(&self) -> u32 {
        let io_years = match self.repayment_type {
            RepaymentType::PrincipalAndInterest => 0,
            RepaymentType::InterestOnly { years } => years,
        };
        self.term_years.saturating_sub(io_years) * 12
    }

    pub fn is_interest_only(&self) -> bool {
        matches!(self.repayment_type, RepaymentType::InterestOnly { .. })
    }

    pub fn validate(&self) -> BorrowingResult<()> {
        if self.term_years < 10 || self.term_years > 30 {
            return Err(BorrowingError::InvalidInput {
                field: "term_years".into(),
                reason: "Loan term must be between 10 and 30 years.".into(),
            });
        }
        if let RateType::Fixed { years } = self.rate_type {
            if years == 0 || years > 5 {
                return Err(BorrowingError::InvalidInput {
                    field: "rate_type.years".into(),
                    reason: "Fixed-rate term must be between 1 and 5 years.".into(),
                });
            }
        }
        if let RepaymentType::InterestOnly { years } = self.repayment_type {
            if years == 0 || years >= self.term_years {
                return Err(BorrowingError::InvalidInput {
                    field: "repayment_type.years".into(),
                    reason: "Interest-only term must be shorter than the loan term.".into(),
                });
            }
        }
        Ok(())
    }
}

impl Default for LoanPreferences {
    fn default() -> Self {
        LoanPreferences {
            rate_type: RateType::Variable,
            repayment_type: RepaymentType::PrincipalAndInterest,
            term_years: 30,
            feature: FeatureType::Redraw,
        }
    }
}

/// Which product scenario the externally-resolved rate belongs to. Drives the
/// orchestrator's deposit-band selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanScenario {
    Tailored,
    StandardVariable,
    StandardFixed,
    Combined,
}

/// A rate-card product resolved by the caller from an LVR-tier rate table.
/// The engine treats this as collaborator input, never something it computes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanProductDetails {
    pub name: String,
    pub annual_rate: Rate,
    pub scenario: LoanScenario,
}

// ---------------------------------------------------------------------------
// LVR bands
// ---------------------------------------------------------------------------

/// The five loan-to-value bands product rules are written against. Bands are
/// contiguous and exhaustive over [0, 0.85]; values above 0.85 clamp to the
/// top band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LvrBand {
    UpTo50,
    From50To60,
    From60To70,
    From70To80,
    From80To85,
}

impl LvrBand {
    pub const ALL: [LvrBand; 5] = [
        LvrBand::UpTo50,
        LvrBand::From50To60,
        LvrBand::From60To70,
        LvrBand::From70To80,
        LvrBand::From80To85,
    ];

    pub fn lower_bound(&self) -> Rate {
        match self {
            LvrBand::UpTo50 => Decimal::ZERO,
            LvrBand::From50To60 => dec!(0.50),
            LvrBand::From60To70 => dec!(0.60),
            LvrBand::From70To80 => dec!(0.70),
            LvrBand::From80To85 => dec!(0.80),
        }
    }

    pub fn upper_bound(&self) -> Rate {
        match self {
            LvrBand::UpTo50 => dec!(0.50),
            LvrBand::From50To60 => dec!(0.60),
            LvrBand::From60To70 => dec!(0.70),
            LvrBand::From70To80 => dec!(0.80),
            LvrBand::From80To85 => dec!(0.85),
        }
    }

    /// Exact partition of [0, ∞): each band covers [lower, upper), with
    /// everything at or above 0.80 clamping into the top band.
    pub fn from_lvr(lvr: Rate) -> LvrBand {
        if lvr < dec!(0.50) {
            LvrBand::UpTo50
        } else if lvr < dec!(0.60) {
            LvrBand::From50To60
        } else if lvr < dec!(0.70) {
            LvrBand::From60To70
        } else if lvr < dec!(0.80) {
            LvrBand::From70To80
        } else {
            LvrBand::From80To85
        }
    }

    /// Whether a solver-achieved LVR landed in this band. Solvers converge
    /// toward the upper bound, so this uses (lower, upper] with the solver
    /// LVR tolerance on the closed end.
    pub fn matches_achieved(&self, lvr: Rate, tolerance: Rate) -> bool {
        lvr > self.lower_bound() && lvr <= self.upper_bound() + tolerance
    }
}

// ---------------------------------------------------------------------------
// Improvement scenarios
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioCategory {
    Savings,
    Expenses,
    Credit,
    Income,
}

/// One "what would change my outcome" answer: a single perturbed input and
/// the borrowing power it unlocks. Scenarios are independent of each other
/// and never composed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementScenario {
    pub label: String,
    pub category: ScenarioCategory,
    /// The signed change applied to the input (extra savings, expense
    /// reduction, credit-limit reduction).
    pub applied_delta: Money,
    pub new_max_borrowing: Money,
    /// `new_max_borrowing − baseline`.
    pub impact: Money,
}

// ---------------------------------------------------------------------------
// Computation envelope
// ---------------------------------------------------------------------------

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_partition_is_exhaustive_and_exclusive() {
        // Sweep [0, 0.85] in 0.0001 steps: exactly one band each time.
        let step = dec!(0.0001);
        let mut lvr = Decimal::ZERO;
        while lvr <= dec!(0.85) {
            let band = LvrBand::from_lvr(lvr);
            assert!(lvr >= band.lower_bound(), "LVR {lvr} below {band:?}");
            assert!(
                lvr < band.upper_bound() || band == LvrBand::From80To85,
                "LVR {lvr} above {band:?}"
            );
            lvr += step;
        }
    }

    #[test]
    fn test_band_upper_bounds() {
        let uppers: Vec<Rate> = LvrBand::ALL.iter().map(|b| b.upper_bound()).collect();
        assert_eq!(
            uppers,
            vec![dec!(0.50), dec!(0.60), dec!(0.70), dec!(0.80), dec!(0.85)]
        );
    }

    #[test]
    fn test_lvr_above_85_clamps_to_top_band() {
        assert_eq!(LvrBand::from_lvr(dec!(0.92)), LvrBand::From80To85);
        assert_eq!(LvrBand::from_lvr(dec!(1.50)), LvrBand::From80To85);
    }

    #[test]
    fn test_matches_achieved_upper_bound_inclusive() {
        let band = LvrBand::From70To80;
        assert!(band.matches_achieved(dec!(0.80), dec!(0.0001)));
        assert!(band.matches_achieved(dec!(0.7999), dec!(0.0001)));
        assert!(!band.matches_achieved(dec!(0.70), dec!(0.0001)));
        assert!(!band.matches_achieved(dec!(0.8002), dec!(0.0001)));
    }

    #[test]
    fn test_periodic_amount_annualised() {
        let weekly = PeriodicAmount {
            amount: dec!(1000),
            frequency: Frequency::Weekly,
        };
        assert_eq!(weekly.annualised(), dec!(52_000));
        let monthly = PeriodicAmount::monthly(dec!(500));
        assert_eq!(monthly.annualised(), dec!(6_000));
    }

    #[test]
    fn test_effective_pi_months() {
        let pi = LoanPreferences::default();
        assert_eq!(pi.effective_pi_months(), 360);

        let io = LoanPreferences {
            repayment_type: RepaymentType::InterestOnly { years: 5 },
            ..LoanPreferences::default()
        };
        assert_eq!(io.effective_pi_months(), 300);
    }

    #[test]
    fn test_preferences_validation() {
        let mut prefs = LoanPreferences::default();
        assert!(prefs.validate().is_ok());

        prefs.term_years = 5;
        assert!(prefs.validate().is_err());

        prefs.term_years = 20;
        prefs.repayment_type = RepaymentType::InterestOnly { years: 20 };
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn test_round_cents_half_up() {
        assert_eq!(round_cents(dec!(10.005)), dec!(10.01));
        assert_eq!(round_cents(dec!(10.004)), dec!(10.00));
    }
}
