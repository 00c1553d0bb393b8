//! Text folding applied to both the input and the dictionary before comparison.

use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

/// Decompose (NFD), drop combining marks, lowercase.
///
/// `"Dor de Cabeça"` → `"dor de cabeca"`. Empty input yields an empty string.
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped: String = text
        .nfd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .collect();
    stripped.to_lowercase()
}
