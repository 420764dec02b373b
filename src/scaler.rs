use serde::Deserialize;

use crate::error::PredictError;

/// Fitted feature transform applied before regression.
pub trait FeatureTransform: Send + Sync {
    /// Number of features the transform was fit on.
    fn width(&self) -> usize;

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, PredictError>;

    fn inverse_transform(&self, z: &[f64]) -> Result<Vec<f64>, PredictError>;

    /// Raw vector that maps to all zeros, used for warmup.
    fn center(&self) -> Vec<f64>;
}

/// Per-feature standardization: `(x - mean) / scale`.
///
/// No clipping: values outside the training range extrapolate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    /// Column names recorded at fit time, if the trainer exported them.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        let s = Self {
            mean,
            scale,
            feature_names: None,
        };
        s.validate()?;
        Ok(s)
    }

    /// Structural checks run once at load.
    pub fn validate(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            return Err(format!("mean[{}] is not finite", i));
        }
        if let Some(i) = self.scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(format!("scale[{}] must be finite and non-zero", i));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                return Err(format!(
                    "feature_names has {} entries but mean has {}",
                    names.len(),
                    self.mean.len()
                ));
            }
        }
        Ok(())
    }

    fn check_width(&self, got: usize) -> Result<(), PredictError> {
        if got != self.mean.len() {
            return Err(PredictError::internal(format!(
                "scaler expects {} features, got {}",
                self.mean.len(),
                got
            )));
        }
        Ok(())
    }
}

impl FeatureTransform for StandardScaler {
    fn width(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, PredictError> {
        self.check_width(x.len())?;
        Ok(x.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }

    fn inverse_transform(&self, z: &[f64]) -> Result<Vec<f64>, PredictError> {
        self.check_width(z.len())?;
        Ok(z.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| v * s + m)
            .collect())
    }

    fn center(&self) -> Vec<f64> {
        self.mean.clone()
    }
}

/// Pass-through transform of a fixed width.
#[derive(Debug, Clone, Copy)]
pub struct IdentityScaler {
    pub width: usize,
}

impl FeatureTransform for IdentityScaler {
    fn width(&self) -> usize {
        self.width
    }

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, PredictError> {
        if x.len() != self.width {
            return Err(PredictError::internal(format!(
                "scaler expects {} features, got {}",
                self.width,
                x.len()
            )));
        }
        Ok(x.to_vec())
    }

    fn inverse_transform(&self, z: &[f64]) -> Result<Vec<f64>, PredictError> {
        self.transform(z)
    }

    fn center(&self) -> Vec<f64> {
        vec![0.0; self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_elementwise() {
        let s = StandardScaler::new(vec![1.0, -2.0, 10.0], vec![2.0, 0.5, 4.0]).unwrap();
        let z = s.transform(&[3.0, -2.0, 2.0]).unwrap();
        assert_eq!(z, vec![1.0, 0.0, -2.0]);
    }

    #[test]
    fn extrapolates_without_clipping() {
        let s = StandardScaler::new(vec![0.0], vec![1.0]).unwrap();
        assert_eq!(s.transform(&[1e12]).unwrap(), vec![1e12]);
    }

    #[test]
    fn inverse_reconstructs_input() {
        let s = StandardScaler::new(vec![3.5, 1e6, -40.0], vec![0.25, 3e5, 12.0]).unwrap();
        let x = [7.125, 2.5e6, 81.0];
        let back = s.inverse_transform(&s.transform(&x).unwrap()).unwrap();
        for (a, b) in x.iter().zip(&back) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn center_maps_to_zero() {
        let s = StandardScaler::new(vec![5.0, 6.0], vec![2.0, 3.0]).unwrap();
        assert_eq!(s.transform(&s.center()).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn width_mismatch_is_internal_error() {
        let s = StandardScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        assert!(matches!(s.transform(&[1.0]), Err(PredictError::Internal(_))));

        let id = IdentityScaler { width: 3 };
        assert!(matches!(id.transform(&[1.0]), Err(PredictError::Internal(_))));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(StandardScaler::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(StandardScaler::new(vec![0.0], vec![0.0]).is_err());
        assert!(StandardScaler::new(vec![f64::NAN], vec![1.0]).is_err());
        assert!(StandardScaler::new(vec![0.0], vec![f64::INFINITY]).is_err());
    }
}
