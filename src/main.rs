use std::sync::Arc;

use anyhow::Context;
use co2_predictor::{
    config::ServerConfig,
    server::{self, AppState},
    ArtifactBundle, InferenceEngine,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = ServerConfig::from_env();
    tracing::info!(
        "loading artifacts: regressor={} scaler={} thresholds={}",
        cfg.artifacts.regressor.display(),
        cfg.artifacts.scaler.display(),
        cfg.artifacts.thresholds.display()
    );

    // All three artifacts or nothing; never serve with a partial bundle.
    let bundle = ArtifactBundle::load(&cfg.artifacts).context("failed to load model artifacts")?;
    let engine = InferenceEngine::new(Arc::new(bundle));

    let y0 = engine.warmup().context("warmup prediction failed")?;
    tracing::info!("warmup forward ok (prediction at scaler center = {:.2})", y0);

    let state = AppState {
        engine: Arc::new(engine),
        log_predictions: cfg.log_predictions,
    };
    let app = server::router(state, &cfg.cors_origins);

    let addr = cfg.socket_addr()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
