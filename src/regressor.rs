use serde::Deserialize;

use crate::error::PredictError;

/// A fitted model mapping one scaled feature vector to a scalar.
///
/// Implementations are pure: the same input always yields the same output.
pub trait Regressor: Send + Sync {
    /// Expected input width, or `None` when any width is accepted.
    fn width(&self) -> Option<usize>;

    fn predict(&self, x: &[f64]) -> Result<f64, PredictError>;

    fn kind(&self) -> &'static str;
}

// ---------- Serialized model families ----------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorModel {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
    /// Sums its inputs. Stand-in for tests and smoke runs.
    Identity,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Gradient-boosted regression trees: `init + learning_rate * sum(tree(x))`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub init: f64,
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
}

/// One regression tree in parallel-array form. Node 0 is the root; a node is
/// a leaf when `children_left[i] == -1`. Samples go left when
/// `x[feature[i]] <= threshold[i]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

const LEAF: i64 = -1;

impl RegressorModel {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            RegressorModel::Linear(m) => m.validate(),
            RegressorModel::TreeEnsemble(e) => e.validate(),
            RegressorModel::Identity => Ok(()),
        }
    }
}

impl LinearModel {
    fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("linear model has no coefficients".into());
        }
        if let Some(i) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(format!("coefficients[{}] is not finite", i));
        }
        if !self.intercept.is_finite() {
            return Err("intercept is not finite".into());
        }
        Ok(())
    }
}

impl TreeEnsemble {
    fn validate(&self) -> Result<(), String> {
        if !self.init.is_finite() || !self.learning_rate.is_finite() {
            return Err("init and learning_rate must be finite".into());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| format!("tree {}: {}", t, e))?;
        }
        Ok(())
    }
}

impl Tree {
    /// Children must point strictly forward, so every walk terminates.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err("node arrays differ in length".into());
        }
        for i in 0..n {
            let (l, r) = (self.children_left[i], self.children_right[i]);
            if l == LEAF {
                if r != LEAF {
                    return Err(format!("node {} has only a right child", i));
                }
                if !self.value[i].is_finite() {
                    return Err(format!("leaf {} value is not finite", i));
                }
                continue;
            }
            for child in [l, r] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {} has invalid child {}", i, child));
                }
            }
            let f = self.feature[i];
            if f < 0 || f as usize >= n_features {
                return Err(format!("node {} splits on feature {} of {}", i, f, n_features));
            }
            if !self.threshold[i].is_finite() {
                return Err(format!("node {} threshold is not finite", i));
            }
        }
        Ok(())
    }

    /// `None` when the walk leaves the node arrays, which only an
    /// unvalidated tree can do.
    fn eval(&self, x: &[f64]) -> Option<f64> {
        let mut node = 0usize;
        for _ in 0..self.children_left.len() {
            let left = *self.children_left.get(node)?;
            if left == LEAF {
                return self.value.get(node).copied();
            }
            let f = usize::try_from(*self.feature.get(node)?).ok()?;
            let next = if *x.get(f)? <= *self.threshold.get(node)? {
                left
            } else {
                *self.children_right.get(node)?
            };
            node = usize::try_from(next).ok()?;
        }
        None
    }
}

// ---------- Inference ----------

impl Regressor for RegressorModel {
    fn width(&self) -> Option<usize> {
        match self {
            RegressorModel::Linear(m) => Some(m.coefficients.len()),
            RegressorModel::TreeEnsemble(e) => Some(e.n_features),
            RegressorModel::Identity => None,
        }
    }

    fn predict(&self, x: &[f64]) -> Result<f64, PredictError> {
        if let Some(w) = self.width() {
            if x.len() != w {
                return Err(PredictError::internal(format!(
                    "regressor expects {} features, got {}",
                    w,
                    x.len()
                )));
            }
        }
        let y = match self {
            RegressorModel::Linear(m) => {
                m.intercept
                    + m.coefficients
                        .iter()
                        .zip(x)
                        .map(|(c, v)| c * v)
                        .sum::<f64>()
            }
            RegressorModel::TreeEnsemble(e) => {
                let mut total = 0.0;
                for (i, tree) in e.trees.iter().enumerate() {
                    total += tree.eval(x).ok_or_else(|| {
                        PredictError::internal(format!("tree {} is malformed", i))
                    })?;
                }
                e.init + e.learning_rate * total
            }
            RegressorModel::Identity => x.iter().sum(),
        };
        if !y.is_finite() {
            return Err(PredictError::internal("regressor produced a non-finite value"));
        }
        Ok(y)
    }

    fn kind(&self) -> &'static str {
        match self {
            RegressorModel::Linear(_) => "linear",
            RegressorModel::TreeEnsemble(_) => "tree_ensemble",
            RegressorModel::Identity => "identity",
        }
    }
}
