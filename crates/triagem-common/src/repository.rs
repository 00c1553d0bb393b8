//! Trait for symptom reference-data access.
//!
//! Decouples the matcher and the feature builder from where the variation and
//! weight tables come from (CSV files, a database, fixtures in tests). Loaders
//! return plain mappings; caching is the consumer's job.

use crate::entities::{SymptomVariationMap, SymptomWeightMap};
use crate::error::Result;

/// Read-only source of the symptom dictionaries.
///
/// Implementations:
/// - `triagem_data::CsvSymptomRepository` (files on disk)
/// - [`InMemorySymptomRepository`] (tests, embedded demos)
pub trait SymptomRepository: Send + Sync {
    /// Canonical symptom name → variations.
    fn load_symptom_variations(&self) -> Result<SymptomVariationMap>;

    /// Symptom name → weight. Unparsable entries are dropped by the implementation.
    fn load_symptom_weights(&self) -> Result<SymptomWeightMap>;

    /// All known canonical names, sorted. Derived from the weight table's keys.
    fn list_all_symptom_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.load_symptom_weights()?.into_keys().collect();
        names.sort();
        Ok(names)
    }
}

// ── In-memory implementation ────────────────────────────────────────────────

/// Repository backed by maps built in code.
#[derive(Debug, Clone, Default)]
pub struct InMemorySymptomRepository {
    variations: SymptomVariationMap,
    weights: SymptomWeightMap,
}

impl InMemorySymptomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canonical symptom with its variations.
    pub fn with_variations(mut self, canonical: &str, variations: &[&str]) -> Self {
        self.variations.insert(
            canonical.to_string(),
            variations.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Add a symptom weight.
    pub fn with_weight(mut self, symptom: &str, weight: f64) -> Self {
        self.weights.insert(symptom.to_string(), weight);
        self
    }
}

impl SymptomRepository for InMemorySymptomRepository {
    fn load_symptom_variations(&self) -> Result<SymptomVariationMap> {
        Ok(self.variations.clone())
    }

    fn load_symptom_weights(&self) -> Result<SymptomWeightMap> {
        Ok(self.weights.clone())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
