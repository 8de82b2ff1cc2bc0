mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cotiza",
    version,
    about = "Extract and reconcile line items from quotation PDFs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: extract, price and reconcile a quotation PDF
    Process {
        /// Path to the quotation PDF
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the line-item and summary tables to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// TOML config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Show per-row details and reconciliation checks
        #[arg(short, long)]
        verbose: bool,
    },
    /// Extract the table and printed totals without pricing
    Parse {
        /// Path to the quotation PDF
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// TOML config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Debug logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the default configuration as TOML
    Config,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            input_file,
            output,
            out,
            config,
            verbose,
        } => {
            setup_logging(verbose);
            commands::process::run(input_file, &output, out, config, verbose)
        }
        Commands::Parse {
            input_file,
            output,
            config,
            verbose,
        } => {
            setup_logging(verbose);
            commands::parse::run(input_file, &output, config)
        }
        Commands::Config => commands::config::print_default(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
