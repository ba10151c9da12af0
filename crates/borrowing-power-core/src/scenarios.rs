//! Improvement scenarios: re-run the whole pipeline with one input changed
//! and report how far the maximum moves.
//!
//! Scenarios are only generated where they could plausibly shift the binding
//! constraint; a ceiling-bound result is not improvable and gets none.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::expenses::{benchmark_expenses, ExpenseParams};
use crate::orchestrator::{max_borrowing_baseline, BindingConstraint, MaxBorrowResult, MaxBorrowingInput};
use crate::serviceability::marital_status_for;
use crate::types::{ImprovementScenario, Money, PeriodicAmount, ScenarioCategory};
use crate::BorrowingResult;

/// Fixed savings-increase steps offered to deposit-bound borrowers.
const SAVINGS_STEPS: [Decimal; 3] = [dec!(20_000), dec!(50_000), dec!(100_000)];

fn run_scenario(
    perturbed: &MaxBorrowingInput,
    baseline: &MaxBorrowResult,
    label: String,
    category: ScenarioCategory,
    applied_delta: Money,
) -> BorrowingResult<ImprovementScenario> {
    let new = max_borrowing_baseline(perturbed)?;
    Ok(ImprovementScenario {
        label,
        category,
        applied_delta,
        new_max_borrowing: new.max_borrowing,
        impact: new.max_borrowing - baseline.max_borrowing,
    })
}

fn savings_scenarios(
    input: &MaxBorrowingInput,
    baseline: &MaxBorrowResult,
) -> BorrowingResult<Vec<ImprovementScenario>> {
    let mut scenarios = Vec::with_capacity(SAVINGS_STEPS.len());
    for step in SAVINGS_STEPS {
        let mut perturbed = input.clone();
        perturbed.savings += step;
        scenarios.push(run_scenario(
            &perturbed,
            baseline,
            format!("Increase savings by ${step}"),
            ScenarioCategory::Savings,
            step,
        )?);
    }
    Ok(scenarios)
}

fn serviceability_scenarios(
    input: &MaxBorrowingInput,
    baseline: &MaxBorrowResult,
) -> BorrowingResult<Vec<ImprovementScenario>> {
    let mut scenarios = Vec::new();

    let declared = input.financials.liabilities.declared_expenses.annualised();
    let benchmark = benchmark_expenses(&ExpenseParams {
        postcode: input.postcode,
        gross_annual_income: input.financials.gross_annual_income(),
        marital_status: marital_status_for(input.financials.arrangement),
        dependents: input.financials.dependents,
    })
    .annual;

    if declared > benchmark {
        let mut perturbed = input.clone();
        perturbed.financials.liabilities.declared_expenses = PeriodicAmount::annual(benchmark);
        scenarios.push(run_scenario(
            &perturbed,
            baseline,
            "Reduce living expenses to the household benchmark".into(),
            ScenarioCategory::Expenses,
            benchmark - declared,
        )?);
    }

    let limit = input.financials.liabilities.revolving_credit_limit;
    if limit > Decimal::ZERO {
        let mut perturbed = input.clone();
        perturbed.financials.liabilities.revolving_credit_limit = Decimal::ZERO;
        scenarios.push(run_scenario(
            &perturbed,
            baseline,
            "Close revolving credit facilities".into(),
            ScenarioCategory::Credit,
            -limit,
        )?);
    }

    Ok(scenarios)
}

/// Generate the scenarios relevant to the baseline's binding constraint.
/// Matches the orchestrator's injection signature.
pub fn generate_scenarios(
    input: &MaxBorrowingInput,
    baseline: &MaxBorrowResult,
) -> BorrowingResult<Vec<ImprovementScenario>> {
    match baseline.reason {
        BindingConstraint::GlobalMax => Ok(Vec::new()),
        BindingConstraint::Deposit => savings_scenarios(input, baseline),
        BindingConstraint::Financials | BindingConstraint::Unserviceable => {
            serviceability_scenarios(input, baseline)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::calculate_max_borrowing_with;
    use crate::stamp_duty::StateCode;
    use crate::types::{
        ApplicantIncome, Arrangement, FinancialsInput, Frequency, Liabilities, LoanPreferences,
        LoanProductDetails, LoanScenario,
    };

    fn household(base_annual: Decimal) -> FinancialsInput {
        FinancialsInput {
            arrangement: Arrangement::Single,
            applicants: vec![ApplicantIncome {
                base: PeriodicAmount::annual(base_annual),
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
        }
    }

    fn input_with(financials: FinancialsInput, savings: Decimal) -> MaxBorrowingInput {
        MaxBorrowingInput {
            financials,
            preferences: LoanPreferences::default(),
            product: LoanProductDetails {
                name: "Standard Variable".into(),
                annual_rate: dec!(0.0599),
                scenario: LoanScenario::StandardVariable,
            },
            band_rate_overrides: Vec::new(),
            savings,
            state: StateCode::NSW,
            postcode: 2000,
            first_home_buyer: false,
            investment: false,
            foreign_resident: false,
            global_max: None,
        }
    }

    /// High income, thin savings: the deposit side binds.
    fn deposit_bound_input() -> MaxBorrowingInput {
        input_with(household(dec!(250_000)), dec!(100_000))
    }

    /// Modest income, deep savings: serviceability binds.
    fn financially_bound_input() -> MaxBorrowingInput {
        let mut financials = household(dec!(80_000));
        financials.liabilities.revolving_credit_limit = dec!(15_000);
        input_with(financials, dec!(400_000))
    }

    #[test]
    fn test_deposit_bound_gets_three_savings_scenarios() {
        let input = deposit_bound_input();
        let baseline = max_borrowing_baseline(&input).unwrap();
        assert_eq!(baseline.reason, BindingConstraint::Deposit);

        let scenarios = generate_scenarios(&input, &baseline).unwrap();
        assert_eq!(scenarios.len(), 3);
        for s in &scenarios {
            assert_eq!(s.category, ScenarioCategory::Savings);
            assert!(s.impact >= dec!(0), "{}: impact {}", s.label, s.impact);
            assert_eq!(s.new_max_borrowing, baseline.max_borrowing + s.impact);
        }
    }

    #[test]
    fn test_more_savings_means_more_impact() {
        let input = deposit_bound_input();
        let baseline = max_borrowing_baseline(&input).unwrap();
        let scenarios = generate_scenarios(&input, &baseline).unwrap();
        assert!(scenarios[0].impact <= scenarios[1].impact);
        assert!(scenarios[1].impact <= scenarios[2].impact);
    }

    #[test]
    fn test_serviceability_bound_scenarios() {
        let input = financially_bound_input();
        let baseline = max_borrowing_baseline(&input).unwrap();
        assert_eq!(baseline.reason, BindingConstraint::Financials);

        let scenarios = generate_scenarios(&input, &baseline).unwrap();
        // Declared expenses exceed the benchmark and a credit limit exists,
        // so both serviceability scenarios fire.
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].category, ScenarioCategory::Expenses);
        assert_eq!(scenarios[1].category, ScenarioCategory::Credit);
        for s in &scenarios {
            assert!(s.impact > dec!(0), "{}: impact {}", s.label, s.impact);
        }
    }

    #[test]
    fn test_no_credit_scenario_without_a_limit() {
        let mut input = financially_bound_input();
        input.financials.liabilities.revolving_credit_limit = dec!(0);
        let baseline = max_borrowing_baseline(&input).unwrap();
        let scenarios = generate_scenarios(&input, &baseline).unwrap();
        assert!(scenarios
            .iter()
            .all(|s| s.category != ScenarioCategory::Credit));
    }

    #[test]
    fn test_global_max_bound_gets_no_scenarios() {
        let mut input = deposit_bound_input();
        input.global_max = Some(dec!(50_000));
        let baseline = max_borrowing_baseline(&input).unwrap();
        assert_eq!(baseline.reason, BindingConstraint::GlobalMax);
        assert!(generate_scenarios(&input, &baseline).unwrap().is_empty());
    }

    #[test]
    fn test_scenarios_are_idempotent() {
        let input = deposit_bound_input();
        let first = calculate_max_borrowing_with(&input, generate_scenarios).unwrap();
        let second = calculate_max_borrowing_with(&input, generate_scenarios).unwrap();
        assert_eq!(
            serde_json::to_value(&first.result).unwrap(),
            serde_json::to_value(&second.result).unwrap()
        );
    }
}
