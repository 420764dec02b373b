use std::{fmt, sync::Arc};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    artifacts::ArtifactBundle,
    error::PredictError,
    features::{order_features, FEATURE_COUNT},
    thresholds::{round2, Thresholds},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Low,
    Medium,
    High,
}

impl Category {
    /// Ties resolve downward: a value equal to a cut point takes the lower band.
    pub fn from_value(value: f64, t: &Thresholds) -> Self {
        if value <= t.low {
            Category::Low
        } else if value <= t.high {
            Category::Medium
        } else {
            Category::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Low => "Low",
            Category::Medium => "Medium",
            Category::High => "High",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub co2_emission: f64,
    pub category: Category,
    pub thresholds: Thresholds,
}

/// Stateless predictor over a loaded artifact bundle.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    artifacts: Arc<ArtifactBundle>,
}

impl InferenceEngine {
    pub fn new(artifacts: Arc<ArtifactBundle>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &ArtifactBundle {
        &self.artifacts
    }

    /// Validate, order, scale, regress and categorize one raw input.
    pub fn predict(&self, raw: &Map<String, Value>) -> Result<Prediction, PredictError> {
        let ordered = order_features(raw)?;
        let value = self.predict_value(&ordered)?;
        let t = &self.artifacts.thresholds;
        Ok(Prediction {
            co2_emission: round2(value),
            category: Category::from_value(value, t),
            thresholds: t.rounded(),
        })
    }

    /// Unrounded regressor output for a vector already in canonical order.
    pub fn predict_value(&self, ordered: &[f64]) -> Result<f64, PredictError> {
        let scaled = self.artifacts.scaler.transform(ordered)?;
        self.artifacts.regressor.predict(&scaled)
    }

    /// One forward pass on the scaler's center. Fails when the triple does not
    /// fit together.
    pub fn warmup(&self) -> Result<f64, PredictError> {
        let width = self.artifacts.scaler.width();
        if width != FEATURE_COUNT {
            return Err(PredictError::internal(format!(
                "scaler expects {} features, schema has {}",
                width, FEATURE_COUNT
            )));
        }
        let center = self.artifacts.scaler.center();
        self.predict_value(&center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        features::FEATURE_NAMES,
        regressor::RegressorModel,
        scaler::{IdentityScaler, StandardScaler},
    };
    use serde_json::json;

    fn thresholds() -> Thresholds {
        Thresholds { low: 100.0, high: 200.0 }
    }

    fn identity_engine() -> InferenceEngine {
        InferenceEngine::new(Arc::new(ArtifactBundle::from_parts(
            Arc::new(RegressorModel::Identity),
            Arc::new(IdentityScaler { width: FEATURE_COUNT }),
            thresholds(),
        )))
    }

    fn input(values: &[f64]) -> Map<String, Value> {
        FEATURE_NAMES
            .iter()
            .zip(values)
            .map(|(n, v)| (n.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn boundary_values_resolve_downward() {
        let t = thresholds();
        assert_eq!(Category::from_value(100.0, &t), Category::Low);
        assert_eq!(Category::from_value(100.01, &t), Category::Medium);
        assert_eq!(Category::from_value(200.0, &t), Category::Medium);
        assert_eq!(Category::from_value(200.01, &t), Category::High);
        assert_eq!(Category::from_value(-5.0, &t), Category::Low);
    }

    #[test]
    fn identity_pipeline_sums_raw_inputs() {
        let values: Vec<f64> = (1..=FEATURE_COUNT).map(|i| i as f64 * 1.5).collect();
        let p = identity_engine().predict(&input(&values)).unwrap();
        let sum: f64 = values.iter().sum();
        assert!((p.co2_emission - sum).abs() <= 0.01);
        assert_eq!(p.category, Category::High);
        assert_eq!(p.thresholds, thresholds());
    }

    #[test]
    fn category_uses_unrounded_value() {
        let mut values = vec![0.0; FEATURE_COUNT];
        values[0] = 100.004;
        let p = identity_engine().predict(&input(&values)).unwrap();
        assert_eq!(p.co2_emission, 100.0);
        assert_eq!(p.category, Category::Medium);
    }

    #[test]
    fn scaling_is_applied_in_canonical_order() {
        let mut mean = vec![0.0; FEATURE_COUNT];
        let mut scale = vec![1.0; FEATURE_COUNT];
        mean[16] = 10.0;
        scale[17] = 4.0;
        let engine = InferenceEngine::new(Arc::new(ArtifactBundle::from_parts(
            Arc::new(RegressorModel::Identity),
            Arc::new(StandardScaler::new(mean, scale).unwrap()),
            thresholds(),
        )));
        let mut values = vec![0.0; FEATURE_COUNT];
        values[16] = 30.0; // Latitude -> (30 - 10) / 1 = 20
        values[17] = 8.0; // Longitude -> 8 / 4 = 2
        let p = engine.predict(&input(&values)).unwrap();
        assert_eq!(p.co2_emission, 22.0);
        assert_eq!(p.category, Category::Low);
    }

    #[test]
    fn stale_scaler_width_is_internal_error() {
        let engine = InferenceEngine::new(Arc::new(ArtifactBundle::from_parts(
            Arc::new(RegressorModel::Identity),
            Arc::new(IdentityScaler { width: 17 }),
            thresholds(),
        )));
        let err = engine.predict(&input(&[1.0; FEATURE_COUNT])).unwrap_err();
        assert!(matches!(err, PredictError::Internal(_)));
        assert!(matches!(engine.warmup(), Err(PredictError::Internal(_))));
    }

    #[test]
    fn warmup_runs_on_center() {
        assert_eq!(identity_engine().warmup().unwrap(), 0.0);
    }

    #[test]
    fn category_serializes_as_label() {
        assert_eq!(serde_json::to_value(Category::Medium).unwrap(), json!("Medium"));
        assert_eq!(Category::High.to_string(), "High");
    }
}
