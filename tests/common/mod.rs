use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use naas_backend::config::DrillConfig;
use naas_backend::create_app;
use naas_backend::services::drill::DrillService;
use naas_backend::services::grading::{CheckResponse, GradingError, GradingOracle, ScratchItem};
use naas_backend::services::vocabulary::{SourceError, VocabularySource};
use naas_backend::services::word_store::{WordRecord, WordStore};

/// Generates `batch` distinct words per call, numbered across calls.
pub struct SequenceSource {
    pub batch: usize,
    pub calls: AtomicUsize,
}

#[async_trait]
impl VocabularySource for SequenceSource {
    async fn fetch(
        &self,
        language: &str,
        _known_words: &[String],
    ) -> Result<Vec<WordRecord>, SourceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.batch)
            .map(|i| WordRecord::new(format!("w{}", call * self.batch + i), language))
            .collect())
    }
}

/// Accepts an attempt when it equals the original word lower-cased.
pub struct EchoOracle;

#[async_trait]
impl GradingOracle for EchoOracle {
    async fn grade(
        &self,
        _language: &str,
        original: &str,
        attempt: &str,
    ) -> Result<CheckResponse, GradingError> {
        let expected = original.to_lowercase();
        Ok(CheckResponse {
            right: attempt == expected,
            message: "graded".to_string(),
            correct_transliteration: expected,
            scratch: original
                .chars()
                .map(|c| ScratchItem {
                    letter: c.to_string(),
                    mapped: c.to_lowercase().to_string(),
                })
                .collect(),
            message_transliteration: None,
            message_translation: None,
        })
    }
}

pub fn test_config() -> DrillConfig {
    DrillConfig {
        min_active_unlearned: 4,
        mastery_threshold: 2,
        empty_fetch_retries: 0,
        source_timeout: Duration::from_secs(2),
        grading_timeout: Duration::from_secs(2),
        ..DrillConfig::default()
    }
}

pub fn create_test_app(source: Option<Arc<dyn VocabularySource>>) -> (Router, Arc<DrillService>) {
    let config = test_config();
    let store = Arc::new(WordStore::new(&config));
    let drill = Arc::new(DrillService::new(store, source, Arc::new(EchoOracle), &config));
    (create_app(Arc::clone(&drill)), drill)
}

pub fn sequence_source(batch: usize) -> Arc<SequenceSource> {
    Arc::new(SequenceSource {
        batch,
        calls: AtomicUsize::new(0),
    })
}
