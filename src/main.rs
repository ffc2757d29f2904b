//! MoodMeter sentiment service — binary entrypoint.
//! Boots the Axum HTTP server with the aggregator, score history and metrics.

use moodmeter::{api, metrics::Metrics, AppState};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moodmeter=info,warn"));

    // A second init (e.g. runtime already installed one) is not fatal.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let state = AppState::from_env()?;
    let metrics = Metrics::init()?;

    let router = api::router(state).merge(metrics.router());
    tracing::info!("moodmeter service ready");

    Ok(router.into())
}
