use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use borrowing_power_core::serviceability;
use borrowing_power_core::{FinancialsInput, LoanPreferences};

use crate::input;

/// Arguments for a standalone serviceability check
#[derive(Args)]
pub struct ServiceabilityArgs {
    /// Path to a JSON or YAML household financials file (or pipe on stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Proposed loan amount
    #[arg(long)]
    pub loan_amount: Decimal,

    /// Product annual rate as a decimal (e.g. 0.0599)
    #[arg(long, default_value = "0.0599")]
    pub rate: Decimal,

    /// Property postcode (drives the expense benchmark)
    #[arg(long, default_value = "2000")]
    pub postcode: u32,

    /// Investment purchase (interest becomes deductible)
    #[arg(long)]
    pub investment: bool,
}

pub fn run_serviceability(args: ServiceabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let financials: FinancialsInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file with household financials is required".into());
    };

    if args.loan_amount < dec!(0) {
        return Err("--loan-amount cannot be negative".into());
    }

    let preferences = LoanPreferences::default();
    let assessment = serviceability::evaluate(
        &financials,
        args.loan_amount,
        args.rate,
        &preferences,
        args.investment,
        args.postcode,
    );
    Ok(serde_json::to_value(assessment)?)
}
