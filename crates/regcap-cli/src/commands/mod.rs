pub mod capital;
pub mod counterparty;
pub mod irrbb;
pub mod liquidity;
pub mod securitization;

use clap::Args;
use serde::de::DeserializeOwned;

use crate::input;

/// `--input` shared by every file-driven command.
#[derive(Args)]
pub struct InputArgs {
    /// Path to a JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Load a typed input from `--input`, falling back to piped stdin.
pub fn load<T: DeserializeOwned>(
    args: &InputArgs,
    command: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file> or piped stdin required for {}", command).into())
    }
}
