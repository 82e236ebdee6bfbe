mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Engine lifecycle ledger.
#[derive(Parser)]
#[command(name = "enginelife", version, about = "Engine lifecycle ledger")]
struct Cli {
    /// Path to a TOML configuration file (default: ./enginelife.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// World state file (overrides `state_path` from the configuration)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a transaction and commit its writes to the world state
    Submit {
        /// Operation name (e.g. Create, CreateEngine, TransferOwner)
        function: String,
        /// Positional arguments for the operation
        args: Vec<String>,
    },

    /// Evaluate a transaction without committing anything
    Evaluate {
        /// Operation name (e.g. Read, ReadEngine, ListAll)
        function: String,
        /// Positional arguments for the operation
        args: Vec<String>,
    },

    /// Run the world state conformance suite against the shipped backends
    Conformance,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {e}"), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    if let Some(state) = cli.state {
        config.state_path = state;
    }

    logging::init(&config.log_level, cli.verbose, cli.quiet);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(
                &format!("error: failed to start async runtime: {e}"),
                cli.output,
                cli.quiet,
            );
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Submit { function, args } => rt.block_on(commands::cmd_submit(
            &config,
            commands::Call { function, args },
            cli.output,
            cli.quiet,
        )),
        Commands::Evaluate { function, args } => rt.block_on(commands::cmd_evaluate(
            &config,
            commands::Call { function, args },
            cli.output,
        )),
        Commands::Conformance => rt.block_on(commands::cmd_conformance(cli.output, cli.quiet)),
    };

    if let Err(msg) = result {
        report_error(&format!("error: {msg}"), cli.output, cli.quiet);
        process::exit(1);
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
