use clap::Args;
use serde_json::Value;

use borrowing_power_core::orchestrator::{
    calculate_max_borrowing, calculate_max_borrowing_with, MaxBorrowingInput,
};
use borrowing_power_core::scenarios::generate_scenarios;

use crate::input;

/// Arguments for the full maximum-borrowing assessment
#[derive(Args)]
pub struct MaxBorrowingArgs {
    /// Path to a JSON or YAML request file (or pipe JSON on stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Also generate improvement scenarios for the binding constraint
    #[arg(long)]
    pub scenarios: bool,
}

pub fn run_max_borrowing(args: MaxBorrowingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: MaxBorrowingInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file is required for a max-borrowing assessment \
                    (the request is too structured for flags; see the README for the schema)"
            .into());
    };

    let output = if args.scenarios {
        calculate_max_borrowing_with(&request, generate_scenarios)?
    } else {
        calculate_max_borrowing(&request)?
    };
    Ok(serde_json::to_value(output)?)
}
