//! Load the configured artifact bundle and, optionally, predict a batch of
//! sample rows to sanity-check a freshly trained model.
//!
//! Usage: `verify_artifacts [SAMPLES_JSON]` where the samples file holds a JSON
//! array of feature objects. Artifact paths come from the same environment
//! variables as the server.

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context};
use co2_predictor::{config::ServerConfig, ArtifactBundle, Category, InferenceEngine};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cfg = ServerConfig::from_env();

    println!("1. Loading artifacts...");
    let bundle = ArtifactBundle::load(&cfg.artifacts).context("failed to load model artifacts")?;
    println!(
        "   regressor:  {} ({})",
        bundle.regressor.kind(),
        cfg.artifacts.regressor.display()
    );
    println!(
        "   scaler:     {} features ({})",
        bundle.scaler.width(),
        cfg.artifacts.scaler.display()
    );
    println!(
        "   thresholds: low={:.2} high={:.2}",
        bundle.thresholds.low, bundle.thresholds.high
    );

    let engine = InferenceEngine::new(Arc::new(bundle));
    let y0 = engine.warmup().context("warmup prediction failed")?;
    println!("   warmup prediction at scaler center: {:.2}", y0);

    let Some(samples_path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        println!("\nNo samples file given; artifact check passed.");
        return Ok(());
    };

    println!("\n2. Predicting samples from {}...", samples_path.display());
    let txt = fs::read_to_string(&samples_path)
        .with_context(|| format!("failed to read {}", samples_path.display()))?;
    let rows: Vec<Value> = serde_json::from_str(&txt)
        .with_context(|| format!("{} is not a JSON array", samples_path.display()))?;
    if rows.is_empty() {
        bail!("{} contains no samples", samples_path.display());
    }

    let mut preds: Vec<(usize, f64, Category)> = Vec::with_capacity(rows.len());
    let mut failed = 0usize;
    for (i, row) in rows.iter().enumerate() {
        let result = match row {
            Value::Object(map) => engine.predict(map).map_err(|e| e.to_string()),
            _ => Err("row is not a JSON object".to_string()),
        };
        match result {
            Ok(p) => preds.push((i, p.co2_emission, p.category)),
            Err(e) => {
                failed += 1;
                println!("   row {}: {}", i, e);
            }
        }
    }

    println!("   predicted {} of {} rows ({} failed)", preds.len(), rows.len(), failed);
    if !preds.is_empty() {
        let values: Vec<f64> = preds.iter().map(|(_, v, _)| *v).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        println!("   min CO2:  {:.2} kt", min);
        println!("   max CO2:  {:.2} kt", max);
        println!("   mean CO2: {:.2} kt", mean);

        println!("\n3. Sample predictions:");
        for (i, v, cat) in preds.iter().take(5) {
            println!("   row {}: {:.2} kt CO2 -> {} emissions", i, v, cat);
        }
    }

    if failed > 0 {
        bail!("{} sample rows failed", failed);
    }
    println!("\nVerification successful.");
    Ok(())
}
