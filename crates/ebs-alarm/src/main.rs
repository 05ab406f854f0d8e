//! EBS Alarm Reconciler - Main Entry Point
//!
//! Periodic batch job: an external scheduler triggers one run, the run
//! mode comes from the `RUN_MODE` environment variable.

use anyhow::Context;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use alarm_config::{AlarmSettings, DEFAULT_CONFIG_PATH};
use cloudwatch_gateway::CloudWatchGateway;
use reconciler::Reconciler;

const RUN_MODE_VAR: &str = "RUN_MODE";
const CONFIG_PATH_VAR: &str = "ALARM_CONFIG_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    /// Create missing alarms, update drifted ones, delete orphans
    Create,
    /// Disable actions on every enabled alarm
    Disable,
    /// Delete every managed alarm
    Delete,
}

impl RunMode {
    fn parse(value: &str) -> Option<RunMode> {
        match value {
            "CREATE" => Some(RunMode::Create),
            "DISABLE" => Some(RunMode::Disable),
            "DELETE" => Some(RunMode::Delete),
            _ => None,
        }
    }
}

/// Initialize logging
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    info!("=== EBS Alarm Reconciler v{} ===", env!("CARGO_PKG_VERSION"));

    let config_path =
        std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let settings =
        AlarmSettings::load(&config_path).with_context(|| format!("loading {config_path}"))?;

    let gateway = CloudWatchGateway::new(&settings.aws_region).await;
    let reconciler = Reconciler::new(gateway, settings);

    let mode = std::env::var(RUN_MODE_VAR).unwrap_or_else(|_| "CREATE".to_string());
    match RunMode::parse(&mode) {
        Some(RunMode::Create) => {
            info!("running in create mode");
            reconciler.create().await?;
        }
        Some(RunMode::Disable) => {
            info!("running in disable mode");
            reconciler.disable().await?;
        }
        Some(RunMode::Delete) => {
            info!("running in delete mode");
            reconciler.delete().await?;
        }
        // Logged but not fatal; the scheduler treats the run as complete.
        None => error!("invalid run mode {mode}"),
    }
    Ok(())
}
