// dxaudit CLI - headless diagnosis code reconciliation

mod audit;
mod exit_codes;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "dxaudit")]
#[command(about = "Audit extracted ICD-10-CM diagnosis codes against coded ground truth")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every account described by a TOML config file
    #[command(after_help = "\
Examples:
  dxaudit run audit.toml
  dxaudit run audit.toml --json
  dxaudit run audit.toml --output result.json
  dxaudit run audit.toml --min-accuracy 80")]
    Run {
        /// Path to the audit .toml config file
        config: std::path::PathBuf,

        /// Also write JSON to stdout (the human summary stays on stderr)
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<std::path::PathBuf>,

        /// Fail (exit 62) when the mean account accuracy is below this percentage
        #[arg(long, value_name = "PCT", env = "DXAUDIT_MIN_ACCURACY")]
        min_accuracy: Option<f64>,
    },

    /// Validate an audit config without running
    #[command(after_help = "\
Examples:
  dxaudit validate audit.toml")]
    Validate {
        /// Path to the audit .toml config file
        config: std::path::PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: dxaudit <command> [options]");
            eprintln!("       dxaudit --help for more information");
            Err(CliError::new(EXIT_USAGE, ""))
        }
        Some(Commands::Run { config, json, output, min_accuracy }) => {
            audit::cmd_run(config, json, output, min_accuracy)
        }
        Some(Commands::Validate { config }) => audit::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
