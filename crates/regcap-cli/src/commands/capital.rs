use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use regcap_core::capital::credit_risk::RwaInput;
use regcap_core::capital::leverage::LeverageInput;
use regcap_core::capital::loss_absorbency::MrelInput;
use regcap_core::capital::{calculate_leverage_ratio, calculate_mrel, calculate_rwa};

use super::{load, InputArgs};
use crate::input;

/// Arguments for the leverage ratio
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LeverageArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Tier 1 capital
    #[arg(long)]
    pub tier1_capital: Option<Decimal>,

    /// On-balance-sheet exposures
    #[arg(long)]
    pub on_balance_exposures: Option<Decimal>,

    /// Derivative exposures (SA-CCR)
    #[arg(long)]
    pub derivative_exposures: Option<Decimal>,

    /// Securities financing transaction exposures
    #[arg(long, alias = "sft")]
    pub sft_exposures: Option<Decimal>,

    /// Off-balance-sheet items before CCF
    #[arg(long)]
    pub off_balance_items: Option<Decimal>,

    /// Credit conversion factor for off-balance items
    #[arg(long, alias = "ccf")]
    pub ccf_off_balance: Option<Decimal>,
}

/// Arguments for credit RWA
#[derive(Args)]
pub struct RwaArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

/// Arguments for MREL
#[derive(Args)]
pub struct MrelArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

pub fn run_leverage(args: LeverageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lev_input: LeverageInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LeverageInput {
            tier1_capital: args
                .tier1_capital
                .ok_or("--tier1-capital is required (or provide --input)")?,
            on_balance_exposures: args
                .on_balance_exposures
                .ok_or("--on-balance-exposures is required (or provide --input)")?,
            derivative_exposures: args.derivative_exposures.unwrap_or_default(),
            sft_exposures: args.sft_exposures.unwrap_or_default(),
            off_balance_items: args.off_balance_items.unwrap_or_default(),
            ccf_off_balance: args.ccf_off_balance.unwrap_or(Decimal::ONE),
        }
    };

    let result = calculate_leverage_ratio(&lev_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rwa(args: RwaArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rwa_input: RwaInput = load(&args.source, "rwa")?;
    let result = calculate_rwa(&rwa_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_mrel(args: MrelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mrel_input: MrelInput = load(&args.source, "mrel")?;
    let result = calculate_mrel(&mrel_input)?;
    Ok(serde_json::to_value(result)?)
}
