use clap::Args;
use serde_json::Value;

use regcap_core::counterparty::{
    calculate_cva_capital, calculate_large_exposures, CvaInput, LargeExposuresInput,
};

use super::{load, InputArgs};

/// Arguments for CVA capital
#[derive(Args)]
pub struct CvaArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

/// Arguments for the large exposures check
#[derive(Args)]
pub struct LargeExposuresArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

pub fn run_cva(args: CvaArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cva_input: CvaInput = load(&args.source, "cva")?;
    let result = calculate_cva_capital(&cva_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_large_exposures(args: LargeExposuresArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let le_input: LargeExposuresInput = load(&args.source, "large-exposures")?;
    let result = calculate_large_exposures(&le_input)?;
    Ok(serde_json::to_value(result)?)
}
