//! The frozen symptom universe: feature index assignment for the classifier.

use std::collections::HashMap;

/// Sorted, deduplicated list of every known canonical symptom.
///
/// Position `i` is the feature index of `names()[i]`. Ordering is plain byte
/// order over the stored strings (case-sensitive), which is exactly the order
/// the classifier was trained against; the universe is never re-sorted after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomUniverse {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl SymptomUniverse {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names.dedup();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
