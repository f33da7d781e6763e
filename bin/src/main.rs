//! CLI for the fire revision-error regression library.
//!
//! This binary lists the registered survey variables, shows the effective
//! run configuration and lays out the regression windows for a sample
//! range.

use clap::{Parser, Subcommand};
use fire::{
    FireConfig, Period, ValueKind, Variable, VariableRegistry, regression::WindowSpan,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fire")]
#[command(about = "FIRE regressions of survey forecast errors on revisions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all registered variables
    List,
    /// Show information about a specific variable
    Info {
        /// Variable name or abbreviation
        variable: String,
    },
    /// Print the effective configuration as JSON
    Config {
        /// JSON configuration file; defaults apply to missing fields
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Print the regression windows over a sample range
    Windows {
        /// First quarter of the sample, e.g. 1990Q1
        #[arg(long)]
        start: Period,
        /// Last quarter of the sample
        #[arg(long)]
        end: Period,
        /// Quarters per window
        #[arg(long, default_value_t = fire::config::DEFAULT_WINDOW_SIZE)]
        window_size: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = VariableRegistry::with_defaults();

    match cli.command {
        Commands::List => list_variables(&registry),
        Commands::Info { variable } => show_variable_info(&registry, &variable),
        Commands::Config { path } => show_config(path),
        Commands::Windows {
            start,
            end,
            window_size,
        } => show_windows(start, end, window_size),
    }
}

/// List all variables grouped by value kind.
fn list_variables(registry: &VariableRegistry) {
    println!("Available Variables ({} total)\n", registry.len());

    for kind in [ValueKind::Level, ValueKind::Rate] {
        println!("{}:", kind);
        let mut variables = registry.by_kind(kind);
        variables.sort_by(|a, b| a.abbreviation.cmp(&b.abbreviation));

        for variable in variables {
            println!("  {} - {}", variable.abbreviation, variable.name);
        }
        println!();
    }
}

fn lookup<'a>(registry: &'a VariableRegistry, key: &str) -> &'a Variable {
    registry.get(key).unwrap_or_else(|| {
        eprintln!("Error: Variable '{}' not found", key);
        eprintln!("\nAvailable variables:");
        for variable in registry.iter() {
            eprintln!("  {} ({})", variable.abbreviation, variable.name);
        }
        std::process::exit(1);
    })
}

/// Show detailed information about a specific variable.
fn show_variable_info(registry: &VariableRegistry, key: &str) {
    let variable = lookup(registry, key);

    println!("Variable: {}", variable.name);
    println!("Abbreviation: {}", variable.abbreviation);
    println!("Frequency: {} ({})", variable.frequency, variable.frequency.tag());
    println!("Kind: {}", variable.kind);
    println!("Framing: {}", framing_description(variable.kind));
}

/// How forecasts of a variable are compared with outcomes.
const fn framing_description(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Level => "growth over the last released level",
        ValueKind::Rate => "level of the target quarter",
    }
}

/// `from_path` validates; the defaults are valid by construction.
fn load_config(path: Option<PathBuf>) -> fire::Result<FireConfig> {
    match path {
        Some(path) => FireConfig::from_path(path),
        None => Ok(FireConfig::default()),
    }
}

/// Print the effective configuration.
fn show_config(path: Option<PathBuf>) {
    let config = load_config(path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    info!(seed = config.seed, "loaded configuration");

    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print every window span over `start..=end`.
fn show_windows(start: Period, end: Period, window_size: usize) {
    let (start, end) = (start.to_quarter(), end.to_quarter());
    if window_size == 0 || end < start {
        eprintln!("Error: need start <= end and a positive window size");
        std::process::exit(1);
    }

    let spans = WindowSpan::all(start, end, window_size);
    info!(%start, %end, window_size, windows = spans.len(), "laid out windows");

    println!("Windows over {}..={} ({} quarters each): {}\n", start, end, window_size, spans.len());
    for (k, span) in spans.iter().enumerate() {
        println!("  {:>3}  {}", k + 1, span);
    }
}
