//! triagem-ranker: Symptom set → ranked medical specialties.
//!
//! Recognized symptoms are projected onto a frozen, sorted symptom universe as a
//! weighted feature vector, scored by a logistic-regression classifier, and the
//! top-N classes are returned most probable first.

pub mod universe;
pub mod feature_vector;
pub mod model;
pub mod predictor;

pub use universe::SymptomUniverse;
pub use feature_vector::{FeatureVector, FeatureVectorBuilder, DEFAULT_SYMPTOM_WEIGHT};
pub use model::{
    ClassRanking, JsonModelRepository, LogisticModel, ModelInfo, MultiClass,
    SpecialtyModelRepository, StaticModelRepository,
};
pub use predictor::{select_top_n, SpecialtyPredictor, DEFAULT_TOP_N};
