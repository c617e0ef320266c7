use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cidades_harvest::cli;

#[derive(Parser)]
#[command(
    name = "cidades",
    about = "Collect municipal demographic indicators from the IBGE Cidades portal",
    version,
    after_help = "Run 'cidades <command> --help' for details on each command."
)]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest indicators for every municipality of one state
    Harvest {
        /// State abbreviation (e.g. "RO"); omit for an interactive prompt
        #[arg(long)]
        state: Option<String>,
        /// Output CSV path
        #[arg(long, default_value = "informacoes_municipios.csv")]
        output: PathBuf,
        /// Per-step UI wait timeout in seconds
        #[arg(long, default_value = "10")]
        timeout: u64,
    },
    /// List the available states
    States,
    /// Check environment and diagnose issues
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "cidades_harvest=debug"
    } else {
        "cidades_harvest=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Harvest {
            state,
            output,
            timeout,
        } => cli::harvest_cmd::run(state.as_deref(), &output, timeout, cli.quiet).await,
        Commands::States => cli::states_cmd::run().await,
        Commands::Doctor => cli::doctor::run().await,
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    result
}
