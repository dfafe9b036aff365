//! User-CF Service - Main entry point
//!
//! # Modes
//! - `run` (default): generate a rating matrix, complete it and save it
//! - `help`: print usage and exit

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_cf_service::{run_prediction_batch_job, Config};

const USAGE: &str = "\
Usage: user-cf-service [run] [--cache-dir <path>]
       user-cf-service help

Environment:
  CACHE_DIR, NUM_USERS, NUM_ITEMS, K_NEIGHBORS, RANDOM_SEED,
  MIN_RATING, MAX_RATING, INCLUDE_SELF, UNPREDICTABLE_POLICY";

/// Service run mode
#[derive(Debug, Clone, PartialEq)]
enum RunMode {
    /// Default: one-shot prediction job
    Run { cache_dir: Option<String> },
    /// Print usage
    Help,
}

impl RunMode {
    fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().skip(1).collect();
        let mut cache_dir = None;
        let mut help = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "run" => {}
                "help" | "--help" | "-h" => help = true,
                "--cache-dir" if i + 1 < args.len() => {
                    cache_dir = Some(args[i + 1].clone());
                    i += 1;
                }
                other => {
                    if let Some(value) = other.strip_prefix("--cache-dir=") {
                        cache_dir = Some(value.to_string());
                    } else {
                        warn!("Ignoring unknown argument '{}'", other);
                    }
                }
            }
            i += 1;
        }

        if help {
            RunMode::Help
        } else {
            RunMode::Run { cache_dir }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_cf_service=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mode = RunMode::from_args(std::env::args());

    let cache_dir = match mode {
        RunMode::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        RunMode::Run { cache_dir } => cache_dir,
    };

    // Load configuration
    dotenvy::dotenv().ok();
    let mut config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    if let Some(dir) = cache_dir {
        config.cache_dir = dir;
    }

    info!(
        "Configuration loaded: users={}, items={}, k={}, cache_dir={}",
        config.num_users, config.num_items, config.k_neighbors, config.cache_dir
    );

    let stats = run_prediction_batch_job(config).await.map_err(|e| {
        error!("Prediction job failed: {:#}", e);
        e
    })?;

    if let Some(path) = &stats.output_path {
        info!("Rankings written to {}", path.display());
    }

    Ok(())
}
