use clap::Args;
use serde_json::Value;

use regcap_core::securitization::{
    calculate_securitization, compare_securitization_approaches, SecuritizationInput,
};

use super::{load, InputArgs};

/// Arguments for securitisation risk weight and approach comparison
#[derive(Args)]
pub struct SecuritizationArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

pub fn run_securitization(args: SecuritizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sec_input: SecuritizationInput = load(&args.source, "securitization")?;
    let result = calculate_securitization(&sec_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: SecuritizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sec_input: SecuritizationInput = load(&args.source, "securitization-compare")?;
    let result = compare_securitization_approaches(&sec_input)?;
    Ok(serde_json::to_value(result)?)
}
