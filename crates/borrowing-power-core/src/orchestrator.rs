//! Borrowing orchestrator: runs both constraint solvers over all five LVR
//! bands, applies the portfolio ceiling and reconciles everything into one
//! maximum with the reason it binds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BorrowingError;
use crate::solver::deposit::{deposit_band_for_scenario, solve_deposit_band, DepositSolverInput};
use crate::solver::financial::{solve_financial_band, FinancialSolverInput};
use crate::solver::ConstraintResult;
use crate::stamp_duty::StateCode;
use crate::types::{
    with_metadata, ComputationOutput, FinancialsInput, ImprovementScenario, LoanPreferences,
    LoanProductDetails, LvrBand, Money, Rate,
};
use crate::BorrowingResult;

/// Portfolio ceiling applied when the request does not carry its own.
pub const GLOBAL_MAX_BORROWING: Decimal = dec!(3_000_000);

/// Band the financial side falls back to when no band's search lands
/// in-band. Policy carried over from the product rules, not an error path.
const FINANCIAL_FALLBACK_BAND: LvrBand = LvrBand::From70To80;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxBorrowingInput {
    pub financials: FinancialsInput,
    pub preferences: LoanPreferences,
    pub product: LoanProductDetails,
    /// LVR-tier rates from the external rate card, where they differ from
    /// the product's headline rate.
    #[serde(default)]
    pub band_rate_overrides: Vec<(LvrBand, Rate)>,
    pub savings: Money,
    pub state: StateCode,
    pub postcode: u32,
    pub first_home_buyer: bool,
    pub investment: bool,
    pub foreign_resident: bool,
    /// Overrides the configured portfolio ceiling when present.
    #[serde(default)]
    pub global_max: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingConstraint {
    Financials,
    Deposit,
    GlobalMax,
    Unserviceable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxBorrowResult {
    pub max_borrowing: Money,
    pub reason: BindingConstraint,
    pub financial_band: LvrBand,
    pub deposit_band: LvrBand,
    pub selected_financial_amount: Money,
    pub selected_deposit_amount: Money,
    pub global_max: Money,
    /// Full per-band tables, kept for audit and explanation.
    pub financial_results: Vec<ConstraintResult>,
    pub deposit_results: Vec<ConstraintResult>,
    pub scenarios: Vec<ImprovementScenario>,
}

// ---------------------------------------------------------------------------
// Validation (the one place inputs are sanitised; the evaluators trust it)
// ---------------------------------------------------------------------------

fn validate(input: &MaxBorrowingInput) -> BorrowingResult<()> {
    input.preferences.validate()?;

    if input.savings < Decimal::ZERO {
        return Err(BorrowingError::InvalidInput {
            field: "savings".into(),
            reason: "Savings cannot be negative.".into(),
        });
    }
    if input.product.annual_rate <= Decimal::ZERO {
        return Err(BorrowingError::InvalidInput {
            field: "product.annual_rate".into(),
            reason: "Product rate must be positive.".into(),
        });
    }
    if input.financials.applicants.is_empty() || input.financials.applicants.len() > 2 {
        return Err(BorrowingError::InvalidInput {
            field: "financials.applicants".into(),
            reason: "Expected one or two applicants.".into(),
        });
    }
    for (i, applicant) in input.financials.applicants.iter().enumerate() {
        for (name, stream) in [
            ("base", &applicant.base),
            ("supplementary", &applicant.supplementary),
            ("other", &applicant.other),
            ("rental", &applicant.rental),
        ] {
            if stream.amount < Decimal::ZERO {
                return Err(BorrowingError::InvalidInput {
                    field: format!("financials.applicants[{i}].{name}"),
                    reason: "Income amounts cannot be negative.".into(),
                });
            }
        }
    }
    let liabilities = &input.financials.liabilities;
    for (name, amount) in [
        ("declared_expenses", liabilities.declared_expenses.amount),
        ("home_loan_repayments", liabilities.home_loan_repayments.amount),
        ("other_loan_repayments", liabilities.other_loan_repayments.amount),
        ("revolving_credit_limit", liabilities.revolving_credit_limit),
    ] {
        if amount < Decimal::ZERO {
            return Err(BorrowingError::InvalidInput {
                field: format!("financials.liabilities.{name}"),
                reason: "Liability amounts cannot be negative.".into(),
            });
        }
    }
    if let Some(global) = input.global_max {
        if global <= Decimal::ZERO {
            return Err(BorrowingError::InvalidInput {
                field: "global_max".into(),
                reason: "Portfolio ceiling must be positive.".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Baseline
// ---------------------------------------------------------------------------

fn rate_for_band(input: &MaxBorrowingInput, band: LvrBand) -> Rate {
    input
        .band_rate_overrides
        .iter()
        .find(|(b, _)| *b == band)
        .map(|(_, rate)| *rate)
        .unwrap_or(input.product.annual_rate)
}

/// Scan bands from the highest LVR down and take the first whose search
/// landed in-band; fall back to 70–80 when none did.
fn select_financial(results: &[ConstraintResult]) -> &ConstraintResult {
    results
        .iter()
        .rev()
        .find(|r| r.band_match)
        .or_else(|| results.iter().find(|r| r.band == FINANCIAL_FALLBACK_BAND))
        .unwrap_or(&results[0])
}

/// The baseline calculation: both solver tables, selection, ceiling,
/// binding reason. Scenario generation is injected by the caller, never
/// reached for from here.
pub fn max_borrowing_baseline(input: &MaxBorrowingInput) -> BorrowingResult<MaxBorrowResult> {
    validate(input)?;

    let deposit_input = DepositSolverInput {
        savings: input.savings,
        state: input.state,
        first_home_buyer: input.first_home_buyer,
        investment: input.investment,
        foreign_resident: input.foreign_resident,
    };

    let mut financial_results = Vec::with_capacity(LvrBand::ALL.len());
    let mut deposit_results = Vec::with_capacity(LvrBand::ALL.len());
    for band in LvrBand::ALL {
        deposit_results.push(solve_deposit_band(&deposit_input, band)?);

        let financial_input = FinancialSolverInput {
            financials: input.financials.clone(),
            preferences: input.preferences,
            annual_rate: rate_for_band(input, band),
            investment: input.investment,
            savings: input.savings,
            state: input.state,
            first_home_buyer: input.first_home_buyer,
            foreign_resident: input.foreign_resident,
            postcode: input.postcode,
        };
        financial_results.push(solve_financial_band(&financial_input, band));
    }

    let financial = select_financial(&financial_results);
    let deposit_band = deposit_band_for_scenario(input.product.scenario);
    let deposit = deposit_results
        .iter()
        .find(|r| r.band == deposit_band)
        .ok_or_else(|| {
            BorrowingError::InsufficientData("No deposit result for the selected band.".into())
        })?;

    let global_max = input.global_max.unwrap_or(GLOBAL_MAX_BORROWING);

    let (max_borrowing, reason) = if financial.loan_amount <= Decimal::ZERO {
        (Decimal::ZERO, BindingConstraint::Unserviceable)
    } else {
        let max = financial
            .loan_amount
            .min(deposit.loan_amount)
            .min(global_max);
        // Tie-break order is policy: a doubly-binding constraint reports as
        // the highest-priority one.
        let reason = if max == global_max {
            BindingConstraint::GlobalMax
        } else if max == financial.loan_amount {
            BindingConstraint::Financials
        } else {
            BindingConstraint::Deposit
        };
        (max, reason)
    };

    Ok(MaxBorrowResult {
        max_borrowing,
        reason,
        financial_band: financial.band,
        deposit_band,
        selected_financial_amount: financial.loan_amount,
        selected_deposit_amount: deposit.loan_amount,
        global_max,
        financial_results,
        deposit_results,
        scenarios: Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Public surface
// ---------------------------------------------------------------------------

fn envelope(
    input: &MaxBorrowingInput,
    result: MaxBorrowResult,
    warnings: Vec<String>,
    start: Instant,
) -> ComputationOutput<MaxBorrowResult> {
    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "product": input.product.name,
        "scenario": input.product.scenario,
        "state": input.state,
        "global_max": result.global_max.to_string(),
        "investment": input.investment,
        "first_home_buyer": input.first_home_buyer,
    });
    with_metadata(
        "Maximum Borrowing (deposit × serviceability × portfolio ceiling)",
        &assumptions,
        warnings,
        elapsed,
        result,
    )
}

/// Baseline maximum borrowing with no improvement scenarios.
pub fn calculate_max_borrowing(
    input: &MaxBorrowingInput,
) -> BorrowingResult<ComputationOutput<MaxBorrowResult>> {
    let start = Instant::now();
    let result = max_borrowing_baseline(input)?;
    Ok(envelope(input, result, Vec::new(), start))
}

/// Baseline plus improvement scenarios from an injected generator. A failing
/// generator degrades to an empty scenario list with a warning; the baseline
/// result itself never fails because of scenarios.
pub fn calculate_max_borrowing_with<F>(
    input: &MaxBorrowingInput,
    generate_scenarios: F,
) -> BorrowingResult<ComputationOutput<MaxBorrowResult>>
where
    F: Fn(&MaxBorrowingInput, &MaxBorrowResult) -> BorrowingResult<Vec<ImprovementScenario>>,
{
    let start = Instant::now();
    let mut result = max_borrowing_baseline(input)?;
    let mut warnings = Vec::new();

    match generate_scenarios(input, &result) {
        Ok(scenarios) => result.scenarios = scenarios,
        Err(e) => warnings.push(format!("Scenario generation failed: {e}")),
    }

    Ok(envelope(input, result, warnings, start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ApplicantIncome, Arrangement, Frequency, Liabilities, LoanScenario, PeriodicAmount,
    };

    fn sample_input() -> MaxBorrowingInput {
        MaxBorrowingInput {
            financials: FinancialsInput {
                arrangement: Arrangement::Single,
                applicants: vec![ApplicantIncome {
                    base: PeriodicAmount::annual(dec!(120_000)),
                    supplementary: PeriodicAmount::zero(),
                    other: PeriodicAmount::zero(),
                    rental: PeriodicAmount::zero(),
                }],
                dependents: 0,
                liabilities: Liabilities {
                    declared_expenses: PeriodicAmount {
                        amount: dec!(650),
                        frequency: Frequency::Weekly,
                    },
                    home_loan_repayments: PeriodicAmount::zero(),
                    other_loan_repayments: PeriodicAmount::zero(),
                    revolving_credit_limit: dec!(0),
                },
            },
            preferences: LoanPreferences::default(),
            product: LoanProductDetails {
                name: "Standard Variable".into(),
                annual_rate: dec!(0.0599),
                scenario: LoanScenario::StandardVariable,
            },
            band_rate_overrides: Vec::new(),
            savings: dec!(200_000),
            state: StateCode::NSW,
            postcode: 2000,
            first_home_buyer: false,
            investment: false,
            foreign_resident: false,
            global_max: None,
        }
    }

    #[test]
    fn test_tables_cover_all_bands() {
        let r = max_borrowing_baseline(&sample_input()).unwrap();
        assert_eq!(r.financial_results.len(), 5);
        assert_eq!(r.deposit_results.len(), 5);
        for (result, band) in r.deposit_results.iter().zip(LvrBand::ALL) {
            assert_eq!(result.band, band);
        }
    }

    #[test]
    fn test_final_is_min_of_constraints() {
        let r = max_borrowing_baseline(&sample_input()).unwrap();
        assert_eq!(
            r.max_borrowing,
            r.selected_financial_amount
                .min(r.selected_deposit_amount)
                .min(r.global_max)
        );
    }

    #[test]
    fn test_deposit_band_follows_product_scenario() {
        let standard = max_borrowing_baseline(&sample_input()).unwrap();
        assert_eq!(standard.deposit_band, LvrBand::From70To80);

        let mut input = sample_input();
        input.product.scenario = LoanScenario::Tailored;
        let tailored = max_borrowing_baseline(&input).unwrap();
        assert_eq!(tailored.deposit_band, LvrBand::From80To85);
    }

    #[test]
    fn test_global_max_binds_and_wins_tiebreak() {
        let mut input = sample_input();
        input.global_max = Some(dec!(100_000));
        let r = max_borrowing_baseline(&input).unwrap();
        assert_eq!(r.max_borrowing, dec!(100_000));
        assert_eq!(r.reason, BindingConstraint::GlobalMax);
    }

    #[test]
    fn test_unserviceable_household() {
        let mut input = sample_input();
        input.financials.applicants[0].base = PeriodicAmount::annual(dec!(15_000));
        let r = max_borrowing_baseline(&input).unwrap();
        assert_eq!(r.max_borrowing, dec!(0));
        assert_eq!(r.reason, BindingConstraint::Unserviceable);
    }

    #[test]
    fn test_validation_rejects_bad_inputs() {
        let mut input = sample_input();
        input.savings = dec!(-10);
        assert!(max_borrowing_baseline(&input).is_err());

        let mut input = sample_input();
        input.product.annual_rate = dec!(0);
        assert!(max_borrowing_baseline(&input).is_err());

        let mut input = sample_input();
        input.financials.applicants.clear();
        assert!(max_borrowing_baseline(&input).is_err());
    }

    #[test]
    fn test_band_rate_override_changes_band_rate_only() {
        let base = max_borrowing_baseline(&sample_input()).unwrap();

        let mut input = sample_input();
        // A punitive rate on the 80–85 tier only.
        input.band_rate_overrides = vec![(LvrBand::From80To85, dec!(0.12))];
        let adjusted = max_borrowing_baseline(&input).unwrap();

        let base_top = &base.financial_results[4];
        let adjusted_top = &adjusted.financial_results[4];
        assert!(adjusted_top.loan_amount < base_top.loan_amount);
        // Lower tiers keep the headline rate.
        assert_eq!(
            adjusted.financial_results[0].loan_amount,
            base.financial_results[0].loan_amount
        );
    }

    #[test]
    fn test_scenario_injection_failure_degrades_gracefully() {
        let out = calculate_max_borrowing_with(&sample_input(), |_, _| {
            Err(BorrowingError::InsufficientData("boom".into()))
        })
        .unwrap();
        assert!(out.result.scenarios.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_envelope_metadata() {
        let out = calculate_max_borrowing(&sample_input()).unwrap();
        assert!(!out.methodology.is_empty());
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
