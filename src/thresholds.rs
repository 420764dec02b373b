use serde::{Deserialize, Serialize};

/// Percentiles of the training targets that split Low / Medium / High.
pub const LOW_PERCENTILE: f64 = 33.0;
pub const HIGH_PERCENTILE: f64 = 66.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Thresholds {
    pub fn new(low: f64, high: f64) -> Result<Self, String> {
        let t = Self { low, high };
        t.validate()?;
        Ok(t)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err("thresholds must be finite".into());
        }
        if self.low > self.high {
            return Err(format!(
                "low threshold {} is above high threshold {}",
                self.low, self.high
            ));
        }
        Ok(())
    }

    /// Derive the pair from training targets the way the trainer does:
    /// 33rd and 66th percentiles, linearly interpolated between ranks.
    pub fn from_targets(targets: &[f64]) -> Result<Self, String> {
        if targets.is_empty() {
            return Err("no training targets".into());
        }
        if targets.iter().any(|t| !t.is_finite()) {
            return Err("training targets must be finite".into());
        }
        let mut sorted = targets.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::new(
            percentile(&sorted, LOW_PERCENTILE),
            percentile(&sorted, HIGH_PERCENTILE),
        )
    }

    /// Both cut points rounded for display.
    pub fn rounded(&self) -> Self {
        Self {
            low: round2(self.low),
            high: round2(self.high),
        }
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Round half away from zero to two decimals.
///
/// Magnitudes too large to scale by 100 have no fractional digits left and
/// are returned unchanged.
pub fn round2(v: f64) -> f64 {
    let scaled = v * 100.0;
    if !scaled.is_finite() {
        return v;
    }
    scaled.round() / 100.0
}
