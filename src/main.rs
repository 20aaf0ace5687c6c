use clap::{Parser, Subcommand};
use serde::Serialize;

use firecalc::api::{ApiError, from_query, run_http_server, validate_gross_income, validate_input};
use firecalc::core::{
    FamilyPattern, SimulationDefaults, calc_take_home, run_simulation, take_home_table,
};
use firecalc::logging::init_logging;

#[derive(Debug, Parser)]
#[command(name = "firecalc", version, about = "FIRE target and take-home calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run a simulation from a share-link query string and print the result.
    Simulate {
        /// e.g. "pref=osaka&assets=1200&return=6"
        query: Option<String>,
    },
    /// Take-home pay for one gross salary in yen.
    TakeHome {
        #[arg(long)]
        income: u64,
        #[arg(long, default_value = "single")]
        family: String,
    },
    /// Take-home pay for every supported salary level.
    TakeHomeTable {
        #[arg(long, default_value = "single")]
        family: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum ReportError {
    #[error(transparent)]
    Input(#[from] ApiError),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let defaults = SimulationDefaults::standard();
    let report = match cli.command {
        Command::Serve { port } => {
            if let Err(e) = run_http_server(port, defaults).await {
                tracing::error!(error = %e, "server stopped");
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
            return;
        }
        Command::Simulate { query } => simulate_report(query.as_deref(), &defaults),
        Command::TakeHome { income, family } => take_home_report(income, &family),
        Command::TakeHomeTable { family } => take_home_table_report(&family),
    };

    match report {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn simulate_report(
    query: Option<&str>,
    defaults: &SimulationDefaults,
) -> Result<String, ReportError> {
    let input = from_query(query.unwrap_or_default(), defaults);
    validate_input(&input)?;
    to_json(&run_simulation(&input))
}

fn take_home_report(income: u64, family: &str) -> Result<String, ReportError> {
    let gross = validate_gross_income(income)?;
    to_json(&calc_take_home(gross, FamilyPattern::from_key(family)))
}

fn take_home_table_report(family: &str) -> Result<String, ReportError> {
    to_json(&take_home_table(FamilyPattern::from_key(family)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(value)?)
}
