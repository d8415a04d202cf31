//! Runs the dashboard's read operations against the data layer and prints
//! the results as JSON.
//!
//! ```text
//! backoffice-demo --mode mock --log-format json
//! backoffice-demo --mode live --backend-url https://api.example.com --api-key ...
//! ```

use std::path::PathBuf;

use anyhow::Context;
use backoffice_core::Mode;
use backoffice_service::observability::{init_tracing, LogFormat};
use backoffice_service::{DataConfig, DataError, DataLayer};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "backoffice-demo", version, about = "Exercise the backoffice data layer")]
struct Args {
    /// Pin the data mode for this run. Without it the mode comes from the
    /// environment probe or a previously persisted override.
    #[arg(long, env = "BACKOFFICE_MODE")]
    mode: Option<Mode>,

    /// Save `--mode` in `--state-dir` so later runs start from it.
    #[arg(long, requires = "mode")]
    persist_mode: bool,

    /// Directory for durable state (settings, mode override). In-memory if unset.
    #[arg(long, env = "BACKOFFICE_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Base URL of the live backend.
    #[arg(long, env = "BACKOFFICE_BACKEND_URL")]
    backend_url: Option<String>,

    #[arg(long, env = "BACKOFFICE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Seed for the simulated collections.
    #[arg(long, env = "BACKOFFICE_SEED")]
    seed: Option<u64>,

    #[arg(long, default_value_t = 5)]
    low_stock_threshold: u32,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "BACKOFFICE_LOG_FORMAT")]
    log_format: LogFormat,
}

impl Args {
    fn data_config(&self) -> DataConfig {
        let mut config = DataConfig {
            state_dir: self.state_dir.clone(),
            ..DataConfig::default()
        };
        config.backend.base_url.clone_from(&self.backend_url);
        config.backend.api_key.clone_from(&self.api_key);
        if let Some(seed) = self.seed {
            config.mock.seed = seed;
        }
        // A one-off --mode must neither replace nor be replaced by a saved override.
        if self.mode.is_some() && !self.persist_mode {
            config.persist_mode_override = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format)?;

    let layer = DataLayer::from_config(args.data_config()).context("building data layer")?;
    layer.init().await?;
    if let Some(mode) = args.mode {
        layer.set_mode(mode);
    }
    info!(mock = layer.is_mock_mode().await, "running demo operations");

    report("products", layer.products().list().await)?;
    report("inventory summary", layer.products().inventory_summary().await)?;
    report(
        "low stock",
        layer.products().low_stock(args.low_stock_threshold).await,
    )?;
    report("sales summary", layer.sales().summary().await)?;
    report("sales by category", layer.sales().sales_by_category().await)?;
    report("sales by hour", layer.sales().sales_by_hour().await)?;
    report("archived", layer.archive().list().await)?;
    report("settings", layer.settings().get().await)?;

    layer.shutdown(false).await
}

/// Prints a successful result; logs a failed one and carries on.
fn report<T: Serialize>(label: &str, result: Result<T, DataError>) -> anyhow::Result<()> {
    match result {
        Ok(value) => {
            println!("== {label}");
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Err(e) => error!(
            kind = e.kind().as_str(),
            retryable = e.is_retryable(),
            error = %e,
            "{label} failed"
        ),
    }
    Ok(())
}
