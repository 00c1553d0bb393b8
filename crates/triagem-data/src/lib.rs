//! CSV-backed symptom reference data.
//!
//! Two tables feed the pipeline:
//!
//! | File | Columns | Meaning |
//! |------|---------|---------|
//! | `sintomas_variacoes.csv` | `referencia`, then any number of variation columns | canonical name → surface forms |
//! | `Sintomas_pesos.csv` | `Sintoma`, `Peso` | symptom → feature weight |
//!
//! Missing files are configuration errors. A file without its required header
//! columns degrades to an empty table (logged), and individual bad rows are
//! skipped with a warning rather than failing the whole load.
//!
//! # Example
//!
//! ```rust,no_run
//! use triagem_common::SymptomRepository;
//! use triagem_data::CsvSymptomRepository;
//!
//! let repo = CsvSymptomRepository::new(
//!     "assets/datasets/sintomas_variacoes.csv",
//!     "assets/datasets/Sintomas_pesos.csv",
//! )?;
//! let names = repo.list_all_symptom_names()?;
//! println!("{} known symptoms", names.len());
//! # Ok::<(), triagem_common::TriagemError>(())
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use triagem_common::{
    Result, SymptomRepository, SymptomVariationMap, SymptomWeightMap, TriagemError,
};

/// Canonical-name column of the variations file.
pub const CANONICAL_COLUMN: &str = "referencia";

/// Symptom-name column of the weights file.
pub const SYMPTOM_COLUMN: &str = "Sintoma";

/// Weight column of the weights file.
pub const WEIGHT_COLUMN: &str = "Peso";

/// Symptom repository reading the variation and weight tables from CSV files.
#[derive(Debug, Clone)]
pub struct CsvSymptomRepository {
    variations_path: PathBuf,
    weights_path: PathBuf,
}

impl CsvSymptomRepository {
    /// Create a repository over the two files. Both must exist.
    pub fn new(variations_path: impl Into<PathBuf>, weights_path: impl Into<PathBuf>) -> Result<Self> {
        let variations_path = variations_path.into();
        let weights_path = weights_path.into();

        for path in [&variations_path, &weights_path] {
            if !path.exists() {
                error!("Reference data file not found at: {:?}", path);
                return Err(TriagemError::DataFileMissing(path.clone()));
            }
        }

        Ok(Self { variations_path, weights_path })
    }

    fn open(path: &Path) -> Result<csv::Reader<std::fs::File>> {
        if !path.exists() {
            return Err(TriagemError::DataFileMissing(path.to_path_buf()));
        }
        csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| TriagemError::Config(format!("Cannot read {}: {}", path.display(), e)))
    }

    /// Header names with a leading UTF-8 BOM removed.
    fn header_names(reader: &mut csv::Reader<std::fs::File>, path: &Path) -> Result<Vec<String>> {
        let headers = reader
            .headers()
            .map_err(|e| TriagemError::Config(format!("Cannot read header of {}: {}", path.display(), e)))?;
        Ok(headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect())
    }
}

impl SymptomRepository for CsvSymptomRepository {
    fn load_symptom_variations(&self) -> Result<SymptomVariationMap> {
        let path = &self.variations_path;
        debug!("Loading symptom variations from {:?}", path);

        let mut reader = Self::open(path)?;
        let headers = Self::header_names(&mut reader, path)?;

        let Some(canonical_idx) = headers.iter().position(|h| h == CANONICAL_COLUMN) else {
            error!("'{}' column not found in {:?}", CANONICAL_COLUMN, path);
            return Ok(SymptomVariationMap::new());
        };

        let mut variations = SymptomVariationMap::new();
        let mut skipped = 0usize;

        for (row, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping malformed row {} in {:?}: {}", row + 2, path, e);
                    skipped += 1;
                    continue;
                }
            };

            let canonical = record.get(canonical_idx).unwrap_or("");
            if canonical.trim().is_empty() {
                skipped += 1;
                continue;
            }

            let forms: Vec<String> = record
                .iter()
                .enumerate()
                .filter(|(i, value)| *i != canonical_idx && !value.is_empty())
                .map(|(_, value)| value.to_string())
                .collect();

            variations.insert(canonical.to_string(), forms);
        }

        info!(
            "Loaded variations for {} symptoms from {:?} ({} rows skipped)",
            variations.len(), path, skipped
        );
        Ok(variations)
    }

    fn load_symptom_weights(&self) -> Result<SymptomWeightMap> {
        let path = &self.weights_path;
        debug!("Loading symptom weights from {:?}", path);

        let mut reader = Self::open(path)?;
        let headers = Self::header_names(&mut reader, path)?;

        let symptom_idx = headers.iter().position(|h| h == SYMPTOM_COLUMN);
        let weight_idx = headers.iter().position(|h| h == WEIGHT_COLUMN);
        let (Some(symptom_idx), Some(weight_idx)) = (symptom_idx, weight_idx) else {
            error!(
                "Required columns (\"{}\", \"{}\") not found in {:?}",
                SYMPTOM_COLUMN, WEIGHT_COLUMN, path
            );
            return Ok(SymptomWeightMap::new());
        };

        let mut weights = SymptomWeightMap::new();
        let mut skipped = 0usize;

        for (row, result) in reader.records().enumerate() {
            let line = row + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping malformed row {} in {:?}: {}", line, path, e);
                    skipped += 1;
                    continue;
                }
            };

            let name = record.get(symptom_idx).unwrap_or("").trim();
            if name.is_empty() {
                skipped += 1;
                continue;
            }

            let raw = record.get(weight_idx).unwrap_or("").trim();
            match raw.parse::<f64>() {
                Ok(weight) if weight.is_finite() && weight > 0.0 => {
                    weights.insert(name.to_string(), weight);
                }
                _ => {
                    warn!("Dropping weight for '{}' at row {}: unusable value {:?}", name, line, raw);
                    skipped += 1;
                }
            }
        }

        info!(
            "Loaded {} symptom weights from {:?} ({} rows skipped)",
            weights.len(), path, skipped
        );
        Ok(weights)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(variations: &str, weights: &str) -> (TempDir, CsvSymptomRepository) {
        let dir = tempfile::tempdir().unwrap();
        let v = dir.path().join("sintomas_variacoes.csv");
        let w = dir.path().join("Sintomas_pesos.csv");
        fs::write(&v, variations).unwrap();
        fs::write(&w, weights).unwrap();
        let repo = CsvSymptomRepository::new(&v, &w).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let w = dir.path().join("Sintomas_pesos.csv");
        fs::write(&w, "Sintoma,Peso\n").unwrap();

        let err = CsvSymptomRepository::new(dir.path().join("missing.csv"), &w).unwrap_err();
        assert!(matches!(err, TriagemError::DataFileMissing(_)));
    }

    #[test]
    fn test_load_variations() {
        let (_dir, repo) = fixture(
            "referencia,var1,var2,var3\n\
             febre,febril,temperatura alta,\n\
             tosse,cough,,\n\
             ,orfa,,\n\
             dor de cabeça,,,\n",
            "Sintoma,Peso\n",
        );

        let variations = repo.load_symptom_variations().unwrap();
        assert_eq!(variations.len(), 3);
        assert_eq!(variations["febre"], vec!["febril", "temperatura alta"]);
        assert_eq!(variations["tosse"], vec!["cough"]);
        assert!(variations["dor de cabeça"].is_empty());
    }

    #[test]
    fn test_variations_canonical_column_need_not_be_first() {
        let (_dir, repo) = fixture("v1,referencia\nfebril,febre\n", "Sintoma,Peso\n");
        let variations = repo.load_symptom_variations().unwrap();
        assert_eq!(variations["febre"], vec!["febril"]);
    }

    #[test]
    fn test_variations_without_canonical_column_degrade_to_empty() {
        let (_dir, repo) = fixture("nome,var1\nfebre,febril\n", "Sintoma,Peso\n");
        assert!(repo.load_symptom_variations().unwrap().is_empty());
    }

    #[test]
    fn test_load_weights_drops_bad_rows() {
        let (_dir, repo) = fixture(
            "referencia\n",
            "Sintoma,Peso\n\
             febre,2.0\n\
             \x20tosse\x20,1\n\
             nausea,abc\n\
             tontura,\n\
             ,3.0\n\
             coriza,-1\n",
        );

        let weights = repo.load_symptom_weights().unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights["febre"], 2.0);
        assert_eq!(weights["tosse"], 1.0);
    }

    #[test]
    fn test_weights_without_required_columns_degrade_to_empty() {
        let (_dir, repo) = fixture("referencia\n", "Sintoma,Valor\nfebre,2.0\n");
        assert!(repo.load_symptom_weights().unwrap().is_empty());
    }

    #[test]
    fn test_header_bom_is_ignored() {
        let (_dir, repo) = fixture("referencia\n", "\u{feff}Sintoma,Peso\nfebre,2.5\n");
        assert_eq!(repo.load_symptom_weights().unwrap()["febre"], 2.5);
    }

    #[test]
    fn test_symptom_names_sorted_from_weights() {
        let (_dir, repo) = fixture("referencia\n", "Sintoma,Peso\ntosse,1\nfebre,2\ncoriza,1\n");
        assert_eq!(repo.list_all_symptom_names().unwrap(), vec!["coriza", "febre", "tosse"]);
    }
}
