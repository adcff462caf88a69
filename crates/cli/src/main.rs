mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use formrule_core::{FormDefinition, FormValues};

use crate::config::CliConfig;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Dynamic form rule engine.
#[derive(Parser)]
#[command(name = "formrule", version, about = "Dynamic form rule engine")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one evaluation pass over a form and its values
    Eval {
        /// Path to the form definition JSON file
        form: PathBuf,
        /// Path to the values JSON file (field name -> value)
        #[arg(long)]
        values: Option<PathBuf>,
        /// Id of the field that just changed
        #[arg(long)]
        changed: Option<String>,
    },

    /// Report authoring inconsistencies in a form definition
    Check {
        /// Path to the form definition JSON file
        form: PathBuf,
    },

    /// Validate submitted values against a form's field constraints
    Validate {
        /// Path to the form definition JSON file
        form: PathBuf,
        /// Path to the values JSON file (field name -> value)
        #[arg(long)]
        values: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Eval {
            form,
            values,
            changed,
        } => {
            let config = load_config(cli.config.as_deref(), cli.output, cli.quiet);
            commands::eval::cmd_eval(
                &form,
                values.as_deref(),
                changed.as_deref(),
                &config,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Check { form } => {
            commands::check::cmd_check(&form, cli.output, cli.quiet);
        }
        Commands::Validate { form, values } => {
            commands::validate::cmd_validate(&form, &values, cli.output, cli.quiet);
        }
    }
}

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&Path>, output: OutputFormat, quiet: bool) -> CliConfig {
    let Some(path) = path else {
        return CliConfig::default();
    };
    match config::read_config(path) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn read_form(path: &Path, output: OutputFormat, quiet: bool) -> FormDefinition {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => {
            let msg = format!("error: form file not found: {}", path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match FormDefinition::from_json(&source) {
        Ok(form) => form,
        Err(e) => {
            let msg = format!("error: {} in {}", e, path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn read_values(path: &Path, output: OutputFormat, quiet: bool) -> FormValues {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => {
            let msg = format!("error: values file not found: {}", path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match FormValues::from_json(&source) {
        Ok(values) => values,
        Err(e) => {
            let msg = format!("error: {} in {}", e, path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
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
