use clap::Args;
use serde_json::Value;

use regcap_core::liquidity::{calculate_lcr, calculate_nsfr, LcrInput, NsfrInput};

use super::{load, InputArgs};

/// Arguments for LCR calculation
#[derive(Args)]
pub struct LcrArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

/// Arguments for NSFR calculation
#[derive(Args)]
pub struct NsfrArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

pub fn run_lcr(args: LcrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lcr_input: LcrInput = load(&args.source, "lcr")?;
    let result = calculate_lcr(&lcr_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_nsfr(args: NsfrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let nsfr_input: NsfrInput = load(&args.source, "nsfr")?;
    let result = calculate_nsfr(&nsfr_input)?;
    Ok(serde_json::to_value(result)?)
}
