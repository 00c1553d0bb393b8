//! Whole-word symptom matching against the variation dictionary.
//!
//! Each canonical symptom gets one compiled pattern: the escaped alternation of
//! its normalized name and variations, anchored on Unicode word boundaries
//! (`\b(?:febre|febril)\b`). A variation that is only a substring of a longer
//! token ("dor" inside "doravante") therefore never matches.
//!
//! The dictionary is loaded and compiled on first use, exactly once per matcher.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::{debug, info};
use triagem_common::{Result, Symptom, SymptomRepository, SymptomVariationMap, TriagemError};

use crate::normalize::normalize_text;

/// Recognizes canonical symptoms in free text.
pub struct SymptomMatcher {
    repository: Arc<dyn SymptomRepository>,
    dictionary: OnceCell<Dictionary>,
}

/// Compiled, read-only form of the variation map.
struct Dictionary {
    entries: Vec<CompiledSymptom>,
    stats: MatcherStats,
}

struct CompiledSymptom {
    canonical: String,
    pattern: Regex,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatcherStats {
    /// Canonical symptoms with at least one usable pattern.
    pub symptom_count: usize,
    /// Distinct normalized patterns across all symptoms.
    pub pattern_count: usize,
}

impl std::fmt::Debug for SymptomMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymptomMatcher")
            .field("loaded", &self.dictionary.get().is_some())
            .finish()
    }
}

impl SymptomMatcher {
    pub fn new(repository: Arc<dyn SymptomRepository>) -> Self {
        Self {
            repository,
            dictionary: OnceCell::new(),
        }
    }

    /// Return every canonical symptom mentioned in `text`.
    ///
    /// Matching is case- and diacritic-insensitive. The result is ordered by
    /// canonical name so repeated calls produce identical output.
    pub fn find_matching_symptoms(&self, text: &str) -> Result<BTreeSet<Symptom>> {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Ok(BTreeSet::new());
        }

        let dictionary = self.dictionary()?;
        let found: BTreeSet<Symptom> = dictionary
            .entries
            .iter()
            .filter(|entry| entry.pattern.is_match(&normalized))
            .map(|entry| Symptom::new(entry.canonical.clone()))
            .collect();

        debug!("Matched {} symptoms in {} chars of text", found.len(), normalized.len());
        Ok(found)
    }

    /// Load and compile the dictionary now instead of on the first request.
    pub fn warm_up(&self) -> Result<MatcherStats> {
        self.stats()
    }

    pub fn stats(&self) -> Result<MatcherStats> {
        Ok(self.dictionary()?.stats)
    }

    fn dictionary(&self) -> Result<&Dictionary> {
        self.dictionary.get_or_try_init(|| {
            let variations = self.repository.load_symptom_variations()?;
            let dictionary = Dictionary::compile(&variations)?;
            info!(
                "Symptom matcher ready: {} symptoms, {} patterns",
                dictionary.stats.symptom_count, dictionary.stats.pattern_count
            );
            Ok(dictionary)
        })
    }
}

impl Dictionary {
    fn compile(variations: &SymptomVariationMap) -> Result<Self> {
        let mut entries = Vec::with_capacity(variations.len());
        let mut pattern_count = 0;

        for (canonical, forms) in variations {
            let patterns: BTreeSet<String> = std::iter::once(canonical.as_str())
                .chain(forms.iter().map(String::as_str).filter(|v| !v.is_empty()))
                .map(normalize_text)
                .filter(|p| !p.is_empty())
                .collect();

            if patterns.is_empty() {
                debug!("Symptom {:?} has no usable patterns, skipping", canonical);
                continue;
            }

            let alternation = patterns
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = Regex::new(&format!(r"\b(?:{})\b", alternation)).map_err(|e| {
                TriagemError::Config(format!("Cannot compile patterns for {:?}: {}", canonical, e))
            })?;

            pattern_count += patterns.len();
            entries.push(CompiledSymptom {
                canonical: canonical.clone(),
                pattern,
            });
        }

        let stats = MatcherStats {
            symptom_count: entries.len(),
            pattern_count,
        };
        Ok(Self { entries, stats })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use triagem_common::{InMemorySymptomRepository, SymptomWeightMap};

    fn matcher(repo: InMemorySymptomRepository) -> SymptomMatcher {
        SymptomMatcher::new(Arc::new(repo))
    }

    fn names(found: &BTreeSet<Symptom>) -> Vec<&str> {
        found.iter().map(|s| s.name()).collect()
    }

    fn sample() -> SymptomMatcher {
        matcher(
            InMemorySymptomRepository::new()
                .with_variations("febre", &["febril"])
                .with_variations("tosse", &["cough"])
                .with_variations("dor de cabeça", &["cefaleia", "enxaqueca"])
                .with_variations("dor", &[]),
        )
    }

    /// Counts dictionary loads; optionally fails them.
    struct CountingRepository {
        loads: AtomicUsize,
        fail: bool,
    }

    impl SymptomRepository for CountingRepository {
        fn load_symptom_variations(&self) -> Result<SymptomVariationMap> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TriagemError::Config("variations unavailable".into()));
            }
            let mut map = SymptomVariationMap::new();
            map.insert("febre".into(), vec!["febril".into()]);
            Ok(map)
        }

        fn load_symptom_weights(&self) -> Result<SymptomWeightMap> {
            Ok(SymptomWeightMap::new())
        }
    }

    #[test]
    fn test_matches_name_and_variation() {
        let found = sample().find_matching_symptoms("Paciente com febril e tosse").unwrap();
        assert_eq!(names(&found), vec!["febre", "tosse"]);
    }

    #[test]
    fn test_empty_text_matches_nothing() {
        assert!(sample().find_matching_symptoms("").unwrap().is_empty());
    }

    #[test]
    fn test_empty_text_does_not_load_dictionary() {
        let repo = Arc::new(CountingRepository { loads: AtomicUsize::new(0), fail: true });
        let matcher = SymptomMatcher::new(repo.clone());
        assert!(matcher.find_matching_symptoms("").unwrap().is_empty());
        assert_eq!(repo.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_text_matches_nothing() {
        assert!(sample().find_matching_symptoms("estou bem hoje").unwrap().is_empty());
    }

    #[test]
    fn test_case_and_diacritic_insensitive() {
        let m = sample();
        let a = m.find_matching_symptoms("DOR DE CABEÇA forte").unwrap();
        let b = m.find_matching_symptoms("dor de cabeca forte").unwrap();
        let c = m.find_matching_symptoms("Dór de Cabêça forte").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(names(&a), vec!["dor", "dor de cabeça"]);
    }

    #[test]
    fn test_word_boundary_prevents_substring_match() {
        let found = sample().find_matching_symptoms("doravante estarei atento").unwrap();
        assert!(found.is_empty());

        let found = sample().find_matching_symptoms("tossindo muito").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_overlapping_spans_match_independently() {
        let found = sample().find_matching_symptoms("tenho dor de cabeça").unwrap();
        assert_eq!(names(&found), vec!["dor", "dor de cabeça"]);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let m = matcher(
            InMemorySymptomRepository::new()
                .with_variations("pressao alta", &["p.a", "has|hipertensao"]),
        );
        assert_eq!(names(&m.find_matching_symptoms("medi p.a ontem").unwrap()), vec!["pressao alta"]);
        // '.' must not act as a wildcard
        assert!(m.find_matching_symptoms("medi pxa ontem").unwrap().is_empty());
        // '|' must not split the variation into alternatives
        assert!(m.find_matching_symptoms("tenho hipertensao").unwrap().is_empty());
        assert_eq!(names(&m.find_matching_symptoms("tenho has|hipertensao").unwrap()), vec!["pressao alta"]);
    }

    #[test]
    fn test_empty_variations_are_ignored() {
        let m = matcher(InMemorySymptomRepository::new().with_variations("tosse", &["", "cough"]));
        assert!(m.find_matching_symptoms("   ").unwrap().is_empty());
        assert_eq!(m.stats().unwrap(), MatcherStats { symptom_count: 1, pattern_count: 2 });
    }

    #[test]
    fn test_dictionary_loads_once() {
        let repo = Arc::new(CountingRepository { loads: AtomicUsize::new(0), fail: false });
        let matcher = SymptomMatcher::new(repo.clone());
        for _ in 0..3 {
            matcher.find_matching_symptoms("estou febril").unwrap();
        }
        assert_eq!(repo.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_use_loads_once() {
        let repo = Arc::new(CountingRepository { loads: AtomicUsize::new(0), fail: false });
        let matcher = Arc::new(SymptomMatcher::new(repo.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let matcher = Arc::clone(&matcher);
                std::thread::spawn(move || matcher.find_matching_symptoms("febre alta").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 1);
        }
        assert_eq!(repo.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unavailable_data_is_surfaced() {
        let repo = Arc::new(CountingRepository { loads: AtomicUsize::new(0), fail: true });
        let matcher = SymptomMatcher::new(repo);
        let err = matcher.find_matching_symptoms("febre").unwrap_err();
        assert!(matches!(err, TriagemError::Config(_)));
    }
}
