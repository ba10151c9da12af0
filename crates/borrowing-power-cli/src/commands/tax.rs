use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use borrowing_power_core::tax::calculate_total_tax;

/// Arguments for a standalone tax assessment
#[derive(Args)]
pub struct TaxArgs {
    /// Taxable annual income
    #[arg(long)]
    pub income: Decimal,
}

pub fn run_tax(args: TaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.income < dec!(0) {
        return Err("--income cannot be negative".into());
    }
    let assessment = calculate_total_tax(args.income);
    Ok(serde_json::to_value(assessment)?)
}
