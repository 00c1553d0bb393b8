//! Specialty classifier access.
//!
//! The predictor talks to the classifier through [`SpecialtyModelRepository`]:
//! load once, then rank feature vectors into per-class probabilities aligned to
//! a fixed label order. The shipped implementation reads a logistic-regression
//! export (JSON) and reproduces scikit-learn's `predict_proba`.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "classes": ["Cardiologia", "Neurologia", "Pneumologia"],
//!   "coef": [[0.1, 2.3], [1.7, -0.2], [-0.4, 0.9]],
//!   "intercept": [0.0, -0.5, 0.2],
//!   "multi_class": "multinomial",
//!   "feature_names": ["febre", "tosse"]
//! }
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use triagem_common::{Result, TriagemError};

/// Classifier output for one feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRanking {
    /// `probabilities[i]` belongs to `classes[i]`.
    pub probabilities: Vec<f64>,
    /// The classifier's native label order.
    pub classes: Vec<String>,
}

/// Static facts about a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub classes: Vec<String>,
    /// Feature order the model was trained on, when the artifact records it.
    pub feature_names: Option<Vec<String>>,
}

/// Trait for loading and querying the specialty classifier.
///
/// Implementations must be safe to query concurrently once loaded.
pub trait SpecialtyModelRepository: Send + Sync {
    /// Load the model. Calling it again after a successful load is a no-op.
    fn load_model(&self) -> Result<()>;

    /// Score a feature vector. `top_n` is advisory; all class probabilities
    /// are returned and selection happens in the caller.
    fn rank_classes(&self, features: &[f64], top_n: usize) -> Result<ClassRanking>;

    fn model_info(&self) -> Result<ModelInfo>;
}

// ── Logistic regression ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// Softmax over the class scores.
    #[default]
    Multinomial,
    /// Independent sigmoids, renormalised to sum to one.
    Ovr,
}

/// A fitted logistic-regression classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    classes: Vec<String>,
    /// One row per class, or a single row for a two-class model.
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    #[serde(default)]
    multi_class: MultiClass,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

impl LogisticModel {
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| TriagemError::ModelLoad(format!("invalid model artifact: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    /// Check shapes and values so that `predict_proba` can never index out of bounds.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(TriagemError::ModelLoad(msg));

        if self.classes.len() < 2 {
            return invalid(format!("expected at least 2 classes, found {}", self.classes.len()));
        }
        let expected_rows = if self.classes.len() == 2 { 1 } else { self.classes.len() };
        if self.coef.len() != expected_rows {
            return invalid(format!(
                "coef has {} rows, expected {} for {} classes",
                self.coef.len(), expected_rows, self.classes.len()
            ));
        }
        if self.intercept.len() != expected_rows {
            return invalid(format!(
                "intercept has {} entries, expected {}",
                self.intercept.len(), expected_rows
            ));
        }
        let width = self.coef[0].len();
        if width == 0 || self.coef.iter().any(|row| row.len() != width) {
            return invalid("coef rows must be non-empty and of equal length".to_string());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != width {
                return invalid(format!(
                    "feature_names has {} entries but coef rows have {}",
                    names.len(), width
                ));
            }
        }
        let all_finite = self.coef.iter().flatten().chain(&self.intercept).all(|v| v.is_finite());
        if !all_finite {
            return invalid("coef and intercept must be finite".to_string());
        }
        Ok(())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn multi_class(&self) -> MultiClass {
        self.multi_class
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn n_features(&self) -> usize {
        self.coef.first().map_or(0, Vec::len)
    }

    /// Per-class probabilities in `classes` order (scikit-learn semantics).
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        if self.coef.is_empty() {
            return Err(TriagemError::Ranking("model has no coefficients".into()));
        }
        if features.len() != self.n_features() {
            return Err(TriagemError::Ranking(format!(
                "feature vector has {} entries, model expects {}",
                features.len(),
                self.n_features()
            )));
        }

        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();

        let probabilities = if self.classes.len() == 2 {
            // Single decision function; multinomial treats it as [-z, z].
            let z = match self.multi_class {
                MultiClass::Ovr => scores[0],
                MultiClass::Multinomial => 2.0 * scores[0],
            };
            let p = sigmoid(z);
            vec![1.0 - p, p]
        } else {
            match self.multi_class {
                MultiClass::Multinomial => softmax(&scores),
                MultiClass::Ovr => {
                    let raw: Vec<f64> = scores.iter().map(|z| sigmoid(*z)).collect();
                    let total: f64 = raw.iter().sum();
                    raw.iter().map(|p| p / total).collect()
                }
            }
        };

        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(TriagemError::Ranking("classifier produced non-finite probabilities".into()));
        }
        Ok(probabilities)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}

// ── File-backed repository ──────────────────────────────────────────────────

/// Loads a [`LogisticModel`] from a JSON artifact, once.
pub struct JsonModelRepository {
    model_path: PathBuf,
    model: OnceCell<LogisticModel>,
}

impl std::fmt::Debug for JsonModelRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonModelRepository")
            .field("model_path", &self.model_path)
            .field("loaded", &self.model.get().is_some())
            .finish()
    }
}

impl JsonModelRepository {
    /// The artifact must exist; it is not read until [`load_model`](SpecialtyModelRepository::load_model).
    pub fn new(model_path: impl Into<PathBuf>) -> Result<Self> {
        let model_path = model_path.into();
        if !model_path.exists() {
            error!("Model file not found at: {:?}", model_path);
            return Err(TriagemError::DataFileMissing(model_path));
        }
        Ok(Self { model_path, model: OnceCell::new() })
    }

    fn loaded(&self) -> Result<&LogisticModel> {
        self.model.get().ok_or(TriagemError::ModelNotLoaded)
    }
}

impl SpecialtyModelRepository for JsonModelRepository {
    fn load_model(&self) -> Result<()> {
        self.model.get_or_try_init(|| {
            let json = std::fs::read_to_string(&self.model_path)
                .map_err(|e| TriagemError::ModelLoad(format!("{}: {}", self.model_path.display(), e)))?;
            let model = LogisticModel::from_json(&json)?;
            info!(
                "Loaded prediction model from {:?}: {} classes, {} features",
                self.model_path,
                model.classes().len(),
                model.n_features()
            );
            Ok::<_, TriagemError>(model)
        })?;
        Ok(())
    }

    fn rank_classes(&self, features: &[f64], top_n: usize) -> Result<ClassRanking> {
        let model = self.loaded()?;
        debug!("Ranking {} features (top_n = {})", features.len(), top_n);
        Ok(ClassRanking {
            probabilities: model.predict_proba(features)?,
            classes: model.classes().to_vec(),
        })
    }

    fn model_info(&self) -> Result<ModelInfo> {
        let model = self.loaded()?;
        Ok(ModelInfo {
            classes: model.classes().to_vec(),
            feature_names: model.feature_names().map(<[String]>::to_vec),
        })
    }
}

// ── Static implementation for testing ───────────────────────────────────────

/// Returns fixed probabilities and counts how often it was asked to rank.
#[derive(Debug)]
pub struct StaticModelRepository {
    classes: Vec<String>,
    probabilities: Vec<f64>,
    feature_names: Option<Vec<String>>,
    failure: Option<String>,
    rank_calls: AtomicUsize,
}

impl StaticModelRepository {
    pub fn new(classes: &[&str], probabilities: &[f64]) -> Self {
        Self {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            probabilities: probabilities.to_vec(),
            feature_names: None,
            failure: None,
            rank_calls: AtomicUsize::new(0),
        }
    }

    /// Make every `rank_classes` call fail with this message.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn with_feature_names(mut self, names: &[&str]) -> Self {
        self.feature_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn rank_calls(&self) -> usize {
        self.rank_calls.load(Ordering::SeqCst)
    }
}

impl SpecialtyModelRepository for StaticModelRepository {
    fn load_model(&self) -> Result<()> {
        Ok(())
    }

    fn rank_classes(&self, _features: &[f64], _top_n: usize) -> Result<ClassRanking> {
        self.rank_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(TriagemError::Ranking(message.clone()));
        }
        Ok(ClassRanking {
            probabilities: self.probabilities.clone(),
            classes: self.classes.clone(),
        })
    }

    fn model_info(&self) -> Result<ModelInfo> {
        Ok(ModelInfo {
            classes: self.classes.clone(),
            feature_names: self.feature_names.clone(),
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
