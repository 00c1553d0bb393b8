//! Triagem API server
//!
//! Run with: cargo run -p triagem-web --bin triagem

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use triagem_analysis::AnalysisService;
use triagem_common::TriagemConfig;
use triagem_data::CsvSymptomRepository;
use triagem_llm::{build_backend, LlmSymptomExtractor};
use triagem_matcher::SymptomMatcher;
use triagem_ranker::{FeatureVectorBuilder, JsonModelRepository, SpecialtyPredictor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Triagem API server...");

    let config = TriagemConfig::load().context("loading configuration")?;

    // Reference data and model: any failure here is fatal.
    let repository = Arc::new(
        CsvSymptomRepository::new(
            config.data.variations_path.clone(),
            config.data.weights_path.clone(),
        )
        .context("opening symptom data")?,
    );
    let model = Arc::new(
        JsonModelRepository::new(config.data.model_path.clone()).context("opening prediction model")?,
    );

    let features = Arc::new(FeatureVectorBuilder::new(repository.clone()));
    let predictor = Arc::new(
        SpecialtyPredictor::new(features, model, config.prediction.top_n)
            .context("loading prediction model")?,
    );
    predictor
        .verify_feature_alignment()
        .context("checking model feature order")?;

    let matcher = Arc::new(SymptomMatcher::new(repository));
    let stats = matcher.warm_up().context("compiling symptom dictionary")?;
    info!(
        "Reference data ready: {} symptoms, {} patterns, {} features",
        stats.symptom_count,
        stats.pattern_count,
        predictor.features().universe()?.len()
    );

    let backend = build_backend(&config.llm).context("building LLM backend")?;
    info!(
        "Symptom extraction via {} ({})",
        backend.model_id(),
        if backend.is_local() { "local" } else { "remote" }
    );
    let extractor = Arc::new(LlmSymptomExtractor::from_config(Arc::from(backend), &config.llm));

    let analysis = Arc::new(AnalysisService::new(
        matcher,
        predictor,
        extractor,
        config.analysis.none_sentinel.clone(),
    ));

    let app = triagem_web::router::build_router(triagem_web::state::AppState::new(analysis));

    let addr = config.server.bind_addr();
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
