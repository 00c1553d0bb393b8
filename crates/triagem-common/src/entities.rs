//! Domain value types shared by the matcher, ranker and analysis crates.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical symptom name → surface-form variations (synonyms, colloquialisms, typos).
pub type SymptomVariationMap = BTreeMap<String, Vec<String>>;

/// Symptom name → feature weight. Absent symptoms weigh 1.0 wherever consumed.
pub type SymptomWeightMap = HashMap<String, f64>;

// ---------------------------------------------------------------------------
// Symptom
// ---------------------------------------------------------------------------

/// A recognized symptom, identified solely by its canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symptom {
    name: String,
}

impl Symptom {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Medical specialty
// ---------------------------------------------------------------------------

/// A predicted medical specialty (classifier label).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicalSpecialty {
    name: String,
}

impl MedicalSpecialty {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MedicalSpecialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
