use anyhow::{bail, Result};
use shared::{Config, LogFormat};
use tracing::{info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod repositories;
mod state;

use state::AppState;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    info!(
        "Starting candle syncer v{} ({} on {}, built at {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("GIT_BRANCH"),
        env!("BUILD_TIME")
    );

    let app_state = AppState::new(config).await?;
    info!("AppState initialized");

    if app_state.config.run_migrations {
        app_state.migrate().await?;
    }

    let run_id = Uuid::new_v4();
    let started = chrono::Utc::now();
    let summary = app_state
        .engine
        .run(&app_state.symbols)
        .instrument(info_span!("run", %run_id))
        .await?;
    let elapsed = chrono::Utc::now() - started;

    info!(
        "Run {} finished in {}s: {} series synced, {} failed, {} points written",
        run_id,
        elapsed.num_seconds(),
        summary.synced.len(),
        summary.failed.len(),
        summary.total_points()
    );

    if !summary.is_success() {
        for failure in &summary.failed {
            warn!("{} was not synced: {}", failure.key, failure.error);
        }
        bail!("{} of {} series failed", summary.failed.len(), summary.failed.len() + summary.synced.len());
    }

    Ok(())
}
