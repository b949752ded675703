//! nutritrack - food search and barcode lookup against Open Food Facts

use clap::{Parser, Subcommand};
use nutritrack_api_client::ApiError;
use nutritrack_cli::output::Status;
use nutritrack_core::config::Config;
use nutritrack_core::error::exit_codes;
use nutritrack_core::observe::{default_observer, SharedObserver};
use nutritrack_telemetry::MetricsObserver;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod commands;

use commands::{barcode, config as config_cmd, search};

/// Search and look up foods in Open Food Facts
#[derive(Parser)]
#[command(name = "nutritrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (default: nutritrack.toml in standard locations)
    #[arg(short, long, global = true, env = "NUTRITRACK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the food database base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log filter, e.g. "debug" or "nutritrack_api_client=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Print collected metrics as JSON to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search foods by name and rank them by relevance
    Search {
        /// Search text
        query: String,

        /// Maximum number of results
        #[arg(short, long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        limit: Option<usize>,

        /// Minimum relevance score (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        min_score: Option<u8>,

        /// Disable fuzzy matching
        #[arg(long)]
        no_fuzzy: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up a product by barcode
    Barcode {
        /// EAN/UPC barcode, 8 to 14 digits
        code: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            return exit(e.code.exit_code());
        }
    };

    let _log_guard = match nutritrack_telemetry::init_with_config(&config.schema.telemetry) {
        Ok(guard) => Some(guard),
        Err(e) => {
            Status::warning(&format!("Logging disabled: {e}"));
            None
        }
    };

    let observer: SharedObserver = if cli.metrics {
        Arc::new(MetricsObserver::new())
    } else {
        default_observer()
    };

    let result = match cli.command {
        Commands::Search { query, limit, min_score, no_fuzzy, json } => {
            let options = search::Options { limit, min_score, fuzzy: !no_fuzzy, json };
            search::run(&config, observer, &query, options).await
        }
        Commands::Barcode { code, json } => barcode::run(&config, observer, &code, json).await,
        Commands::Config => config_cmd::run(&config),
    };

    if cli.metrics {
        match serde_json::to_string_pretty(&nutritrack_telemetry::metrics().export_json()) {
            Ok(report) => eprintln!("{report}"),
            Err(e) => Status::warning(&format!("Could not render metrics: {e}")),
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Status::error(&format!("{e:#}"));
            exit(exit_code_for(&e))
        }
    }
}

/// Load the configuration file, then apply command line overrides.
fn load_config(cli: &Cli) -> nutritrack_core::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(url) = &cli.base_url {
        config.schema.client.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(level) = &cli.log_level {
        config.schema.telemetry.log_level.clone_from(level);
    }
    if cli.log_json {
        config.schema.telemetry.json = true;
    }

    config.schema.validate()?;
    Ok(config)
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<nutritrack_core::Error>() {
        return e.code.exit_code();
    }
    if let Some(e) = err.downcast_ref::<ApiError>() {
        return match e {
            ApiError::InvalidIdentifier(_) => exit_codes::VALIDATION_ERROR,
            ApiError::Config(_) => exit_codes::CONFIG_ERROR,
            ApiError::Timeout(_) => exit_codes::TIMEOUT,
            _ => exit_codes::FAILURE,
        };
    }
    exit_codes::FAILURE
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
