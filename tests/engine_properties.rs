use std::sync::Arc;

use co2_predictor::{
    features::{order_features, FEATURE_COUNT, FEATURE_NAMES},
    regressor::RegressorModel,
    scaler::{FeatureTransform, StandardScaler},
    thresholds::Thresholds,
    ArtifactBundle, Category, InferenceEngine, PredictError,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn engine(mean: Vec<f64>, scale: Vec<f64>, t: Thresholds) -> InferenceEngine {
    let scaler = StandardScaler::new(mean, scale).unwrap();
    InferenceEngine::new(Arc::new(ArtifactBundle::from_parts(
        Arc::new(RegressorModel::Identity),
        Arc::new(scaler),
        t,
    )))
}

fn to_map(values: &[f64]) -> Map<String, Value> {
    FEATURE_NAMES
        .iter()
        .zip(values)
        .map(|(n, v)| (n.to_string(), json!(v)))
        .collect()
}

fn features() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e6f64..1e6, FEATURE_COUNT)
}

fn scales() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![0.01f64..1e4, -1e4f64..-0.01], FEATURE_COUNT)
}

fn thresholds() -> impl Strategy<Value = Thresholds> {
    (-1e6f64..1e6, 0f64..1e6).prop_map(|(low, width)| Thresholds {
        low,
        high: low + width,
    })
}

proptest! {
    #[test]
    fn predict_is_deterministic(
        x in features(),
        mean in features(),
        scale in scales(),
        t in thresholds()
    ) {
        let e = engine(mean, scale, t);
        let input = to_map(&x);
        let first = e.predict(&input).unwrap();
        for _ in 0..3 {
            prop_assert_eq!(&e.predict(&input).unwrap(), &first);
        }
    }

    #[test]
    fn insertion_order_is_irrelevant(
        x in features(),
        perm in Just((0..FEATURE_COUNT).collect::<Vec<_>>()).prop_shuffle()
    ) {
        // Pairs arrive in arbitrary order, padded with keys outside the schema.
        let mut pairs: Vec<(String, Value)> = perm
            .iter()
            .map(|&i| (FEATURE_NAMES[i].to_string(), json!(x[i])))
            .collect();
        pairs.insert(perm[0], ("Country".to_string(), json!("Norway")));
        let shuffled: Map<String, Value> = pairs.into_iter().collect();

        let by_name: Vec<f64> = FEATURE_NAMES
            .iter()
            .map(|n| shuffled[*n].as_f64().unwrap())
            .collect();
        let ordered = order_features(&shuffled).unwrap();
        prop_assert_eq!(&ordered, &by_name);
        prop_assert_eq!(&ordered, &x);

        let e = engine(
            vec![0.0; FEATURE_COUNT],
            vec![1.0; FEATURE_COUNT],
            Thresholds { low: 100.0, high: 200.0 },
        );
        prop_assert_eq!(e.predict(&shuffled).unwrap(), e.predict(&to_map(&x)).unwrap());
    }

    #[test]
    fn category_follows_thresholds(x in features(), t in thresholds()) {
        let e = engine(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT], t);
        let raw: f64 = x.iter().sum();
        let p = e.predict(&to_map(&x)).unwrap();
        let expected = if raw <= t.low {
            Category::Low
        } else if raw <= t.high {
            Category::Medium
        } else {
            Category::High
        };
        prop_assert_eq!(p.category, expected);
        prop_assert_eq!(Category::from_value(raw, &t), expected);
    }

    #[test]
    fn any_missing_key_is_named(x in features(), drop in 0..FEATURE_COUNT) {
        let e = engine(
            vec![0.0; FEATURE_COUNT],
            vec![1.0; FEATURE_COUNT],
            Thresholds { low: 0.0, high: 1.0 },
        );
        let mut input = to_map(&x);
        input.remove(FEATURE_NAMES[drop]);
        prop_assert_eq!(
            e.predict(&input),
            Err(PredictError::MissingFeature(FEATURE_NAMES[drop].to_string()))
        );
    }

    #[test]
    fn scaling_round_trips(x in features(), mean in features(), scale in scales()) {
        let s = StandardScaler::new(mean.clone(), scale).unwrap();
        let back = s.inverse_transform(&s.transform(&x).unwrap()).unwrap();
        for ((a, b), m) in x.iter().zip(&back).zip(&mean) {
            let tol = 1e-9 * (1.0 + a.abs().max(m.abs()));
            prop_assert!((a - b).abs() <= tol, "{} != {}", a, b);
        }
    }
}
