use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    engine::{InferenceEngine, Prediction},
    error::PredictError,
    features::{advisory_ranges, order_features, FeatureRange, FEATURE_NAMES},
};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub log_predictions: bool,
}

// ---------- Response types ----------

#[derive(Debug, Serialize)]
pub struct FeaturesOut {
    pub features: Vec<&'static str>,
    pub feature_ranges: Map<String, Value>,
}

// ---------- Router ----------

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/features", get(features))
        .route("/api/predict", post(predict))
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed = parse_origins(origins);
        if allowed.is_empty() {
            tracing::warn!("no valid CORS origins configured; cross-origin requests are refused");
        }
        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    };
    cors.allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect()
}

// ---------- Handlers ----------

pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "CO2 emission predictor API",
        "status": "running",
        "endpoints": {
            "/api/predict": "POST - Predict CO2 emissions",
            "/api/features": "GET - Get feature list and ranges"
        }
    }))
}

pub async fn features() -> Json<FeaturesOut> {
    let feature_ranges = advisory_ranges()
        .map(|(name, FeatureRange { min, max })| {
            (name.to_string(), json!({ "min": min, "max": max }))
        })
        .collect();
    Json(FeaturesOut {
        features: FEATURE_NAMES.to_vec(),
        feature_ranges,
    })
}

/// The body is parsed here rather than by an extractor so that every failure,
/// malformed JSON included, gets the same `{success: false}` shape.
pub async fn predict(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    match run_predict(&state, &body) {
        Ok(p) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "co2_emission": p.co2_emission,
                "category": p.category,
                "thresholds": {
                    "low": p.thresholds.low,
                    "high": p.thresholds.high
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("predict failed: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RequestError {
    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request body must be a JSON object of feature values")]
    NotAnObject,
    #[error(transparent)]
    Predict(#[from] PredictError),
}

fn run_predict(state: &AppState, body: &[u8]) -> Result<Prediction, RequestError> {
    let raw = match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => map,
        _ => return Err(RequestError::NotAnObject),
    };

    if state.log_predictions {
        log_input_summary(&raw);
    }

    let p = state.engine.predict(&raw)?;
    tracing::debug!(
        co2_emission = p.co2_emission,
        category = p.category.as_str(),
        "prediction"
    );
    Ok(p)
}

// Summary of the ordered vector so a stuck client sending zeros is visible.
fn log_input_summary(raw: &Map<String, Value>) {
    let Ok(vec) = order_features(raw) else {
        return;
    };
    let n = vec.len() as f64;
    let nz = vec.iter().filter(|x| **x != 0.0).count();
    let mean = vec.iter().sum::<f64>() / n;
    let std = (vec.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n).sqrt();
    let sample: Vec<String> = FEATURE_NAMES
        .iter()
        .zip(&vec)
        .take(6)
        .map(|(name, x)| format!("{}={:.3}", name, x))
        .collect();
    tracing::info!(
        "recv in_dim={} nonzero={} mean={:.3} std={:.3} sample=[{}]",
        vec.len(),
        nz,
        mean,
        std,
        sample.join(", ")
    );
}
