//! Dictionary-based symptom recognition.
//!
//! Maps free text onto the canonical symptom vocabulary: text and dictionary
//! entries are folded to a diacritic-free lowercase form, then every canonical
//! symptom whose name or any variation appears as a whole word is reported.

pub mod normalize;
pub mod matcher;

pub use normalize::normalize_text;
pub use matcher::{MatcherStats, SymptomMatcher};
