//! Symptom set → dense weighted feature vector.
//!
//! The universe and weight table are read from the repository on first use and
//! cached for the lifetime of the builder. Two builds over the same symptom set
//! always produce bit-identical vectors.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info};
use triagem_common::{Result, Symptom, SymptomRepository, SymptomWeightMap};

use crate::universe::SymptomUniverse;

/// Weight used for a recognized symptom missing from the weight table.
pub const DEFAULT_SYMPTOM_WEIGHT: f64 = 1.0;

/// Classifier input: one slot per symptom of the universe, in universe order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when at least one slot is set.
    pub fn has_signal(&self) -> bool {
        self.values.iter().any(|v| *v != 0.0)
    }
}

struct ReferenceData {
    universe: SymptomUniverse,
    weights: SymptomWeightMap,
}

/// Builds feature vectors against the frozen symptom universe.
pub struct FeatureVectorBuilder {
    repository: Arc<dyn SymptomRepository>,
    reference: OnceCell<ReferenceData>,
}

impl std::fmt::Debug for FeatureVectorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureVectorBuilder")
            .field("universe_size", &self.reference.get().map(|r| r.universe.len()))
            .finish()
    }
}

impl FeatureVectorBuilder {
    pub fn new(repository: Arc<dyn SymptomRepository>) -> Self {
        Self {
            repository,
            reference: OnceCell::new(),
        }
    }

    /// The frozen universe, loading it on first call.
    pub fn universe(&self) -> Result<&SymptomUniverse> {
        Ok(&self.reference()?.universe)
    }

    /// Set each recognized symptom's slot to its weight; everything else stays 0.0.
    ///
    /// Names are trimmed before lookup. Symptoms outside the universe cannot be
    /// represented in the model's input space and are skipped.
    pub fn build_vector<'a, I>(&self, symptoms: I) -> Result<FeatureVector>
    where
        I: IntoIterator<Item = &'a Symptom>,
    {
        let reference = self.reference()?;
        let mut values = vec![0.0; reference.universe.len()];

        for symptom in symptoms {
            let name = symptom.name().trim();
            match reference.universe.index_of(name) {
                Some(index) => {
                    values[index] = reference
                        .weights
                        .get(name)
                        .copied()
                        .unwrap_or(DEFAULT_SYMPTOM_WEIGHT);
                }
                None => debug!("Symptom {:?} is not in the feature universe, ignoring", name),
            }
        }

        Ok(FeatureVector { values })
    }

    fn reference(&self) -> Result<&ReferenceData> {
        self.reference.get_or_try_init(|| {
            let weights = self.repository.load_symptom_weights()?;
            let universe = SymptomUniverse::new(self.repository.list_all_symptom_names()?);
            info!(
                "Feature universe frozen: {} symptoms, {} weights",
                universe.len(),
                weights.len()
            );
            Ok(ReferenceData { universe, weights })
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
