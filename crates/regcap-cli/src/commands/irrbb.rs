use clap::Args;
use serde_json::Value;

use regcap_core::interest_rate_risk::{calculate_irrbb, IrrbbInput};

use super::{load, InputArgs};

/// Arguments for IRRBB analysis
#[derive(Args)]
pub struct IrrbbArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

pub fn run_irrbb(args: IrrbbArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irrbb_input: IrrbbInput = load(&args.source, "irrbb")?;
    let result = calculate_irrbb(&irrbb_input)?;
    Ok(serde_json::to_value(result)?)
}
