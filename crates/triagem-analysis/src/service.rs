//! Analysis pipeline orchestrator.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use triagem_common::{MedicalSpecialty, Result, Symptom};
use triagem_llm::SymptomExtractor;
use triagem_matcher::SymptomMatcher;
use triagem_ranker::SpecialtyPredictor;
use uuid::Uuid;

use crate::dto::AnalysisResponse;

/// Characters of the incoming message echoed into the request log.
const LOG_PREVIEW_CHARS: usize = 50;

pub struct AnalysisService {
    matcher: Arc<SymptomMatcher>,
    predictor: Arc<SpecialtyPredictor>,
    extractor: Arc<dyn SymptomExtractor>,
    none_sentinel: String,
}

impl AnalysisService {
    pub fn new(
        matcher: Arc<SymptomMatcher>,
        predictor: Arc<SpecialtyPredictor>,
        extractor: Arc<dyn SymptomExtractor>,
        none_sentinel: impl Into<String>,
    ) -> Self {
        Self {
            matcher,
            predictor,
            extractor,
            none_sentinel: none_sentinel.into(),
        }
    }

    pub fn matcher(&self) -> &SymptomMatcher {
        &self.matcher
    }

    pub fn predictor(&self) -> &SpecialtyPredictor {
        &self.predictor
    }

    /// Run one message through the pipeline.
    ///
    /// When nothing is recognized the symptom list is the single sentinel entry
    /// and the classifier is not consulted. Any stage failure aborts the request.
    pub async fn analyze(&self, message: &str) -> Result<AnalysisResponse> {
        let span = info_span!("analysis", request_id = %Uuid::new_v4());
        self.run(message).instrument(span).await
    }

    async fn run(&self, message: &str) -> Result<AnalysisResponse> {
        let preview: String = message.chars().take(LOG_PREVIEW_CHARS).collect();
        info!("Received request for symptom analysis: {}...", preview);

        let extracted = self.extractor.extract_symptom_text(message).await?;
        let symptoms = self.matcher.find_matching_symptoms(&extracted)?;

        let specialties = if symptoms.is_empty() {
            Vec::new()
        } else {
            self.predictor.predict_specialties(&symptoms)?
        };

        let response = AnalysisResponse {
            extracted_symptoms: if symptoms.is_empty() {
                vec![self.none_sentinel.clone()]
            } else {
                symptoms.iter().map(Symptom::name).map(str::to_string).collect()
            },
            suggested_specialties: specialties
                .iter()
                .map(MedicalSpecialty::name)
                .map(str::to_string)
                .collect(),
        };

        info!(
            "Analysis complete. Symptoms: {:?}, Specialties: {:?}",
            response.extracted_symptoms, response.suggested_specialties
        );
        Ok(response)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use triagem_common::{InMemorySymptomRepository, TriagemError};
    use triagem_llm::{FailingExtractor, StaticExtractor};
    use triagem_ranker::{FeatureVectorBuilder, StaticModelRepository};

    fn service(extractor: Arc<dyn SymptomExtractor>, model: Arc<StaticModelRepository>) -> AnalysisService {
        let repo = Arc::new(
            InMemorySymptomRepository::new()
                .with_variations("febre", &["febril"])
                .with_weight("febre", 2.0),
        );
        let predictor = SpecialtyPredictor::new(Arc::new(FeatureVectorBuilder::new(repo.clone())), model, 3).unwrap();
        AnalysisService::new(Arc::new(SymptomMatcher::new(repo)), Arc::new(predictor), extractor, "Nenhum")
    }

    #[tokio::test]
    async fn test_no_symptoms_yields_sentinel_and_skips_ranking() {
        let model = Arc::new(StaticModelRepository::new(&["Clinica Geral"], &[1.0]));
        let svc = service(Arc::new(StaticExtractor::new("nada relevante")), model.clone());

        let resp = svc.analyze("oi").await.unwrap();
        assert_eq!(resp.extracted_symptoms, vec!["Nenhum"]);
        assert!(resp.suggested_specialties.is_empty());
        assert_eq!(model.rank_calls(), 0);
    }

    #[tokio::test]
    async fn test_long_multibyte_message_is_accepted() {
        let model = Arc::new(StaticModelRepository::new(&["Clinica Geral"], &[1.0]));
        let svc = service(Arc::new(StaticExtractor::new("febril")), model);

        let message = "ç".repeat(200);
        let resp = svc.analyze(&message).await.unwrap();
        assert_eq!(resp.extracted_symptoms, vec!["febre"]);
        assert_eq!(resp.suggested_specialties, vec!["Clinica Geral"]);
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts() {
        let model = Arc::new(StaticModelRepository::new(&["Clinica Geral"], &[1.0]));
        let svc = service(Arc::new(FailingExtractor::new("timeout")), model.clone());

        let err = svc.analyze("febre").await.unwrap_err();
        assert!(matches!(err, TriagemError::Extraction(_)));
        assert_eq!(model.rank_calls(), 0);
    }
}
