use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use borrowing_power_core::stamp_duty::{
    calculate_stamp_duty, PropertyPurpose, StampDutyInput,
};

use crate::commands::StateArg;
use crate::input;

/// Arguments for the transfer-duty calculation
#[derive(Args)]
pub struct StampDutyArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// State for duty purposes
    #[arg(long, value_enum, default_value = "nsw")]
    pub state: StateArg,

    /// Eligible first home buyer
    #[arg(long)]
    pub first_home_buyer: bool,

    /// Investment purchase (ineligible for owner-occupier concessions)
    #[arg(long)]
    pub investment: bool,

    /// Foreign resident (duty surcharge applies)
    #[arg(long)]
    pub foreign_resident: bool,
}

pub fn run_stamp_duty(args: StampDutyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let duty_input: StampDutyInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        StampDutyInput {
            state: args.state.into(),
            property_price: args
                .price
                .ok_or("--price is required (or provide --input)")?,
            purpose: if args.investment {
                PropertyPurpose::Investment
            } else {
                PropertyPurpose::OwnerOccupied
            },
            first_home_buyer: args.first_home_buyer,
            foreign_resident: args.foreign_resident,
        }
    };

    let output = calculate_stamp_duty(&duty_input)?;
    Ok(serde_json::to_value(output)?)
}
