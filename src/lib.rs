pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::DrillConfig;
use crate::services::drill::DrillService;
use crate::services::grading::{GradingOracle, LlmGradingOracle};
use crate::services::llm_provider::LLMProvider;
use crate::services::vocabulary::{LlmVocabularySource, VocabularySource};
use crate::services::word_store::WordStore;
use crate::state::AppState;

/// Wires the store to the LLM-backed source and grader.
pub fn build_drill_service(config: &DrillConfig, llm: LLMProvider) -> DrillService {
    let store = Arc::new(WordStore::new(config));
    let source: Arc<dyn VocabularySource> =
        Arc::new(LlmVocabularySource::new(llm.clone(), config.word_batch_size));
    let oracle: Arc<dyn GradingOracle> =
        Arc::new(LlmGradingOracle::new(llm, config.schemes_dir.clone()));
    DrillService::new(store, Some(source), oracle, config)
}

pub fn create_app(drill: Arc<DrillService>) -> axum::Router {
    routes::router(AppState::new(drill))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
