use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "tgc")]
#[command(about = "FIFO trade gain calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate realized gain and total fees from a trade-history CSV (FIFO)
    Gain {
        /// Trades CSV (default: trades.csv, or input.path from config)
        #[arg(long)]
        filename: Option<String>,

        /// Log every trade with the open lots and cumulative gain
        #[arg(long, default_value_t = false)]
        debug: bool,

        /// Layered config paths in merge order (base -> overrides)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Decimal places for display rounding
        #[arg(long)]
        decimals: Option<u32>,

        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    // Load .env.local if present (dev convenience). Silent if missing.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Gain {
            filename,
            debug,
            config_paths,
            decimals,
            json,
        } => {
            let resolved = commands::resolve_settings(&config_paths, filename, debug, decimals)?;
            init_tracing(resolved.settings.debug);
            resolved.log_config();
            commands::gain::run(&resolved.settings, json)
        }
    }
}

/// Logs go to stderr so stdout stays clean for results.
fn init_tracing(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}
