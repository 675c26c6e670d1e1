mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::capital::{LeverageArgs, MrelArgs, RwaArgs};
use commands::counterparty::{CvaArgs, LargeExposuresArgs};
use commands::irrbb::IrrbbArgs;
use commands::liquidity::{LcrArgs, NsfrArgs};
use commands::securitization::SecuritizationArgs;

/// Prudential capital and liquidity calculations
#[derive(Parser)]
#[command(
    name = "regcap",
    version,
    about = "Prudential capital and liquidity calculations",
    long_about = "A CLI for bank prudential metrics with decimal precision. Supports \
                  securitisation risk weights (SEC-IRBA / SEC-SA), leverage, credit RWA, \
                  LCR, NSFR, MREL, CVA capital, large exposures and IRRBB."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Securitisation tranche risk weight (SEC-IRBA / SEC-SA)
    Securitization(SecuritizationArgs),
    /// Compare SEC-IRBA and SEC-SA for one tranche
    SecuritizationCompare(SecuritizationArgs),
    /// Basel III leverage ratio
    Leverage(LeverageArgs),
    /// Credit risk-weighted assets (SA or IRB)
    Rwa(RwaArgs),
    /// Liquidity Coverage Ratio
    Lcr(LcrArgs),
    /// Net Stable Funding Ratio
    Nsfr(NsfrArgs),
    /// MREL / TLAC loss-absorbing capacity
    Mrel(MrelArgs),
    /// CVA capital charge
    Cva(CvaArgs),
    /// Large exposures against Tier 1
    LargeExposures(LargeExposuresArgs),
    /// IRRBB economic value of equity under supervisory shocks
    Irrbb(IrrbbArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Securitization(args) => commands::securitization::run_securitization(args),
        Commands::SecuritizationCompare(args) => commands::securitization::run_compare(args),
        Commands::Leverage(args) => commands::capital::run_leverage(args),
        Commands::Rwa(args) => commands::capital::run_rwa(args),
        Commands::Lcr(args) => commands::liquidity::run_lcr(args),
        Commands::Nsfr(args) => commands::liquidity::run_nsfr(args),
        Commands::Mrel(args) => commands::capital::run_mrel(args),
        Commands::Cva(args) => commands::counterparty::run_cva(args),
        Commands::LargeExposures(args) => commands::counterparty::run_large_exposures(args),
        Commands::Irrbb(args) => commands::irrbb::run_irrbb(args),
        Commands::Version => {
            println!("regcap {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
