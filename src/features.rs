//! Canonical feature schema.
//!
//! The scaler and regressor were fit on columns in exactly this order; every
//! vector handed to them must follow it position for position.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::PredictError;

pub const FEATURE_COUNT: usize = 18;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Access to electricity (% of population)",
    "Access to clean fuels for cooking",
    "Renewable-electricity-generating-capacity-per-capita",
    "Financial flows to developing countries (US $)",
    "Renewable energy share in the total final energy consumption (%)",
    "Electricity from fossil fuels (TWh)",
    "Electricity from nuclear (TWh)",
    "Electricity from renewables (TWh)",
    "Low-carbon electricity (% electricity)",
    "Primary energy consumption per capita (kWh/person)",
    "Energy intensity level of primary energy (MJ/$2017 PPP GDP)",
    "Renewables (% equivalent primary energy)",
    "gdp_growth",
    "gdp_per_capita",
    "Density_(P/Km2)",
    "Land Area(Km2)",
    "Latitude",
    "Longitude",
];

/// Advisory input range shown to callers. Not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

const ADVISORY_RANGES: [(f64, f64); FEATURE_COUNT] = [
    (0.0, 100.0),
    (0.0, 100.0),
    (0.0, 10.0),
    (0.0, 10_000_000.0),
    (0.0, 100.0),
    (0.0, 1000.0),
    (0.0, 500.0),
    (0.0, 1000.0),
    (0.0, 100.0),
    (100.0, 10_000.0),
    (1.0, 30.0),
    (0.0, 100.0),
    (-10.0, 15.0),
    (100.0, 150_000.0),
    (1.0, 2000.0),
    (100.0, 10_000_000.0),
    (-90.0, 90.0),
    (-180.0, 180.0),
];

pub fn advisory_range(name: &str) -> Option<FeatureRange> {
    FEATURE_NAMES
        .iter()
        .position(|n| *n == name)
        .map(|i| FeatureRange {
            min: ADVISORY_RANGES[i].0,
            max: ADVISORY_RANGES[i].1,
        })
}

/// (name, range) pairs in canonical order.
pub fn advisory_ranges() -> impl Iterator<Item = (&'static str, FeatureRange)> {
    FEATURE_NAMES
        .iter()
        .zip(ADVISORY_RANGES.iter())
        .map(|(name, (min, max))| (*name, FeatureRange { min: *min, max: *max }))
}

/// Project a raw name -> value mapping onto the canonical order.
///
/// Unknown keys are ignored. The first canonical name that is absent, or whose
/// value is not a JSON number, fails the whole call; nothing is defaulted.
pub fn order_features(raw: &Map<String, Value>) -> Result<Vec<f64>, PredictError> {
    let mut v = Vec::with_capacity(FEATURE_COUNT);
    for name in FEATURE_NAMES {
        let value = raw
            .get(name)
            .ok_or_else(|| PredictError::MissingFeature(name.to_string()))?;
        let x = value.as_f64().ok_or_else(|| PredictError::InvalidValue {
            name: name.to_string(),
            value: value.clone(),
        })?;
        v.push(x);
    }
    Ok(v)
}
