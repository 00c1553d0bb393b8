//! Symptom set → top-N medical specialties.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};
use triagem_common::{MedicalSpecialty, Result, Symptom, TriagemError};

use crate::feature_vector::FeatureVectorBuilder;
use crate::model::SpecialtyModelRepository;

/// Specialties returned per prediction unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 3;

/// Combines the feature builder with the classifier.
pub struct SpecialtyPredictor {
    features: Arc<FeatureVectorBuilder>,
    model: Arc<dyn SpecialtyModelRepository>,
    top_n: usize,
}

impl std::fmt::Debug for SpecialtyPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecialtyPredictor")
            .field("features", &self.features)
            .field("top_n", &self.top_n)
            .finish()
    }
}

impl SpecialtyPredictor {
    /// Loads the model eagerly; a missing or corrupt artifact fails here.
    pub fn new(
        features: Arc<FeatureVectorBuilder>,
        model: Arc<dyn SpecialtyModelRepository>,
        top_n: usize,
    ) -> Result<Self> {
        model.load_model()?;
        Ok(Self { features, model, top_n })
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn features(&self) -> &FeatureVectorBuilder {
        &self.features
    }

    pub fn model(&self) -> &dyn SpecialtyModelRepository {
        self.model.as_ref()
    }

    /// Most probable specialties first, at most `top_n` of them.
    ///
    /// No symptoms, or a vector with no set slot, yields an empty list without
    /// consulting the classifier. Classifier failures propagate unchanged.
    pub fn predict_specialties(&self, symptoms: &BTreeSet<Symptom>) -> Result<Vec<MedicalSpecialty>> {
        if symptoms.is_empty() {
            return Ok(Vec::new());
        }

        let vector = self.features.build_vector(symptoms)?;
        if vector.is_empty() || !vector.has_signal() {
            debug!(
                "No recognized symptom maps into the feature universe ({} symptoms); skipping prediction",
                symptoms.len()
            );
            return Ok(Vec::new());
        }

        let ranking = self.model.rank_classes(vector.as_slice(), self.top_n)?;
        if ranking.probabilities.len() != ranking.classes.len() {
            return Err(TriagemError::Ranking(format!(
                "classifier returned {} probabilities for {} classes",
                ranking.probabilities.len(),
                ranking.classes.len()
            )));
        }

        let specialties: Vec<MedicalSpecialty> = select_top_n(&ranking.probabilities, self.top_n)
            .into_iter()
            .map(|i| MedicalSpecialty::new(ranking.classes[i].clone()))
            .collect();

        info!(
            "Predicted specialties: {:?}",
            specialties.iter().map(MedicalSpecialty::name).collect::<Vec<_>>()
        );
        Ok(specialties)
    }

    /// Fail when the model records a feature order different from the universe.
    ///
    /// Artifacts without `feature_names` cannot be checked and pass as long as
    /// the universe is not empty.
    pub fn verify_feature_alignment(&self) -> Result<()> {
        let universe = self.features.universe()?;
        let info = self.model.model_info()?;

        match info.feature_names {
            Some(names) if names.as_slice() != universe.names() => {
                let first_mismatch = names
                    .iter()
                    .zip(universe.names())
                    .position(|(a, b)| a != b)
                    .unwrap_or_else(|| names.len().min(universe.len()));
                Err(TriagemError::Config(format!(
                    "model feature order does not match the symptom universe \
                     (model: {} features, universe: {} symptoms, first difference at index {})",
                    names.len(),
                    universe.len(),
                    first_mismatch
                )))
            }
            _ if universe.is_empty() => {
                Err(TriagemError::Config("symptom universe is empty".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Indices of the `top_n` highest probabilities, highest first.
///
/// Equal probabilities keep their label order (lower index first). NaN
/// sorts below every real value.
pub fn select_top_n(probabilities: &[f64], top_n: usize) -> Vec<usize> {
    let key = |i: usize| {
        let p = probabilities[i];
        if p.is_nan() { f64::NEG_INFINITY } else { p }
    };
    let mut indices: Vec<usize> = (0..probabilities.len()).collect();
    // Stable sort: ties keep ascending index order.
    indices.sort_by(|&a, &b| key(b).total_cmp(&key(a)));
    indices.truncate(top_n);
    indices
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StaticModelRepository;
    use pretty_assertions::assert_eq;
    use triagem_common::InMemorySymptomRepository;

    fn features() -> Arc<FeatureVectorBuilder> {
        Arc::new(FeatureVectorBuilder::new(Arc::new(
            InMemorySymptomRepository::new()
                .with_weight("febre", 2.0)
                .with_weight("tosse", 1.0),
        )))
    }

    fn set(names: &[&str]) -> BTreeSet<Symptom> {
        names.iter().map(|n| Symptom::new(*n)).collect()
    }

    fn names(specialties: &[MedicalSpecialty]) -> Vec<&str> {
        specialties.iter().map(MedicalSpecialty::name).collect()
    }

    #[test]
    fn test_select_top_n_descending() {
        assert_eq!(select_top_n(&[0.1, 0.5, 0.4], 2), vec![1, 2]);
        assert_eq!(select_top_n(&[0.1, 0.5, 0.4], 10), vec![1, 2, 0]);
        assert!(select_top_n(&[0.1, 0.5], 0).is_empty());
        assert!(select_top_n(&[], 3).is_empty());
    }

    #[test]
    fn test_select_top_n_ties_keep_label_order() {
        assert_eq!(select_top_n(&[0.25, 0.25, 0.25, 0.25], 3), vec![0, 1, 2]);
        assert_eq!(select_top_n(&[0.2, 0.4, 0.4], 2), vec![1, 2]);
    }

    #[test]
    fn test_select_top_n_nan_last() {
        assert_eq!(select_top_n(&[f64::NAN, 0.1, 0.9], 3), vec![2, 1, 0]);
    }

    #[test]
    fn test_predicts_in_descending_probability() {
        let model = Arc::new(StaticModelRepository::new(&["Cardio", "Neuro", "Derma"], &[0.1, 0.5, 0.4]));
        let predictor = SpecialtyPredictor::new(features(), model.clone(), 2).unwrap();

        let result = predictor.predict_specialties(&set(&["febre"])).unwrap();
        assert_eq!(names(&result), vec!["Neuro", "Derma"]);
        assert_eq!(model.rank_calls(), 1);
    }

    #[test]
    fn test_empty_symptoms_skip_ranking() {
        let model = Arc::new(StaticModelRepository::new(&["Cardio"], &[1.0]));
        let predictor = SpecialtyPredictor::new(features(), model.clone(), DEFAULT_TOP_N).unwrap();

        assert!(predictor.predict_specialties(&BTreeSet::new()).unwrap().is_empty());
        assert_eq!(model.rank_calls(), 0);
    }

    #[test]
    fn test_out_of_universe_symptoms_skip_ranking() {
        let model = Arc::new(StaticModelRepository::new(&["Cardio"], &[1.0]));
        let predictor = SpecialtyPredictor::new(features(), model.clone(), DEFAULT_TOP_N).unwrap();

        assert!(predictor.predict_specialties(&set(&["coriza"])).unwrap().is_empty());
        assert_eq!(model.rank_calls(), 0);
    }

    #[test]
    fn test_ranking_failure_propagates() {
        let model = Arc::new(StaticModelRepository::new(&["Cardio"], &[1.0]).failing("model crashed"));
        let predictor = SpecialtyPredictor::new(features(), model, DEFAULT_TOP_N).unwrap();

        let err = predictor.predict_specialties(&set(&["tosse"])).unwrap_err();
        assert!(matches!(err, TriagemError::Ranking(_)));
    }

    #[test]
    fn test_misaligned_ranking_is_error() {
        let model = Arc::new(StaticModelRepository::new(&["Cardio", "Neuro"], &[1.0]));
        let predictor = SpecialtyPredictor::new(features(), model, DEFAULT_TOP_N).unwrap();
        assert!(predictor.predict_specialties(&set(&["tosse"])).is_err());
    }

    #[test]
    fn test_feature_alignment() {
        let aligned = StaticModelRepository::new(&["A"], &[1.0]).with_feature_names(&["febre", "tosse"]);
        let predictor = SpecialtyPredictor::new(features(), Arc::new(aligned), 1).unwrap();
        assert!(predictor.verify_feature_alignment().is_ok());

        let swapped = StaticModelRepository::new(&["A"], &[1.0]).with_feature_names(&["tosse", "febre"]);
        let predictor = SpecialtyPredictor::new(features(), Arc::new(swapped), 1).unwrap();
        let err = predictor.verify_feature_alignment().unwrap_err();
        assert!(err.to_string().contains("first difference at index 0"));

        let unnamed = StaticModelRepository::new(&["A"], &[1.0]);
        let predictor = SpecialtyPredictor::new(features(), Arc::new(unnamed), 1).unwrap();
        assert!(predictor.verify_feature_alignment().is_ok());
    }
}
