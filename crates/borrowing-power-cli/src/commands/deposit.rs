use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use borrowing_power_core::solver::deposit::{calculate_deposit_only, DepositSolverInput};

use crate::commands::{ScenarioArg, StateArg};
use crate::input;

/// Arguments for the deposit-side capacity calculation
#[derive(Args)]
pub struct DepositArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Available savings
    #[arg(long)]
    pub savings: Option<Decimal>,

    /// State for duty purposes
    #[arg(long, value_enum, default_value = "nsw")]
    pub state: StateArg,

    /// Loan product scenario (sets the target LVR band)
    #[arg(long, value_enum, default_value = "standard-variable")]
    pub scenario: ScenarioArg,

    /// Eligible first home buyer
    #[arg(long)]
    pub first_home_buyer: bool,

    /// Investment purchase
    #[arg(long)]
    pub investment: bool,

    /// Foreign resident (duty surcharge applies)
    #[arg(long)]
    pub foreign_resident: bool,
}

pub fn run_deposit(args: DepositArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let solver_input: DepositSolverInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DepositSolverInput {
            savings: args
                .savings
                .ok_or("--savings is required (or provide --input)")?,
            state: args.state.into(),
            first_home_buyer: args.first_home_buyer,
            investment: args.investment,
            foreign_resident: args.foreign_resident,
        }
    };

    let output = calculate_deposit_only(&solver_input, args.scenario.into())?;
    Ok(serde_json::to_value(output)?)
}
