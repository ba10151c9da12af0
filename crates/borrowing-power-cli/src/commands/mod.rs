pub mod borrowing;
pub mod deposit;
pub mod serviceability;
pub mod stamp_duty;
pub mod tax;

use borrowing_power_core::stamp_duty::StateCode;
use borrowing_power_core::LoanScenario;
use clap::ValueEnum;

/// Australian state for duty purposes (CLI spelling of [`StateCode`]).
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    Nsw,
    Vic,
    Qld,
    Wa,
    Sa,
    Tas,
    Act,
    Nt,
}

impl From<StateArg> for StateCode {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Nsw => StateCode::NSW,
            StateArg::Vic => StateCode::VIC,
            StateArg::Qld => StateCode::QLD,
            StateArg::Wa => StateCode::WA,
            StateArg::Sa => StateCode::SA,
            StateArg::Tas => StateCode::TAS,
            StateArg::Act => StateCode::ACT,
            StateArg::Nt => StateCode::NT,
        }
    }
}

/// Loan product scenario (CLI spelling of [`LoanScenario`]).
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScenarioArg {
    Tailored,
    StandardVariable,
    StandardFixed,
    Combined,
}

impl From<ScenarioArg> for LoanScenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Tailored => LoanScenario::Tailored,
            ScenarioArg::StandardVariable => LoanScenario::StandardVariable,
            ScenarioArg::StandardFixed => LoanScenario::StandardFixed,
            ScenarioArg::Combined => LoanScenario::Combined,
        }
    }
}
