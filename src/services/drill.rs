use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::DrillConfig;
use crate::services::grading::{CheckResponse, GradingError, GradingOracle};
use crate::services::vocabulary::VocabularySource;
use crate::services::word_store::{PoolError, PoolStats, WordRecord, WordStore};

#[derive(Debug, Error)]
pub enum DrillError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("grading failed: {0}")]
    Grading(#[from] GradingError),
    #[error("grading timed out after {0:?}")]
    GradingTimeout(Duration),
}

/// Composes the word store with its vocabulary source and grader.
pub struct DrillService {
    store: Arc<WordStore>,
    source: Option<Arc<dyn VocabularySource>>,
    oracle: Arc<dyn GradingOracle>,
    grading_timeout: Duration,
}

impl DrillService {
    pub fn new(
        store: Arc<WordStore>,
        source: Option<Arc<dyn VocabularySource>>,
        oracle: Arc<dyn GradingOracle>,
        config: &DrillConfig,
    ) -> Self {
        Self {
            store,
            source,
            oracle,
            grading_timeout: config.grading_timeout,
        }
    }

    pub async fn get_word(&self, language: &str) -> Result<WordRecord, DrillError> {
        let word = self.store.get_word(language, self.source.as_deref()).await?;
        info!(language, text = %word.text, tries = word.num_correct_tries, "serving word");
        Ok(word)
    }

    /// Grades an attempt and records the verdict. Scoring is best-effort:
    /// the grade is returned whatever happens to the store.
    pub async fn check_attempt(
        &self,
        language: &str,
        original: &str,
        attempt: &str,
    ) -> Result<CheckResponse, DrillError> {
        let checked = tokio::time::timeout(
            self.grading_timeout,
            self.oracle.grade(language, original, attempt),
        )
        .await
        .map_err(|_| DrillError::GradingTimeout(self.grading_timeout))??;

        let scored = self.store.score(original, checked.score_update());
        if scored == 0 {
            warn!(language, original, "graded word is not tracked, score not recorded");
        }
        info!(language, original, right = checked.right, scored, "attempt checked");
        Ok(checked)
    }

    pub fn dump_word_entries(&self, language: &str) -> String {
        self.store.dump_word_entries(language)
    }

    pub fn stats(&self, language: &str) -> PoolStats {
        self.store.stats(language)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::services::vocabulary::SourceError;

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VocabularySource for CountingSource {
        async fn fetch(
            &self,
            language: &str,
            known_words: &[String],
        ) -> Result<Vec<WordRecord>, SourceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..4)
                .map(|i| WordRecord::new(format!("{call}-{i}-{}", known_words.len()), language))
                .collect())
        }
    }

    struct FixedOracle {
        right: bool,
    }

    #[async_trait]
    impl GradingOracle for FixedOracle {
        async fn grade(
            &self,
            _language: &str,
            original: &str,
            attempt: &str,
        ) -> Result<CheckResponse, GradingError> {
            Ok(CheckResponse {
                right: self.right,
                message: format!("{attempt} for {original}"),
                correct_transliteration: attempt.to_string(),
                scratch: Vec::new(),
                message_transliteration: None,
                message_translation: None,
            })
        }
    }

    struct SlowOracle;

    #[async_trait]
    impl GradingOracle for SlowOracle {
        async fn grade(
            &self,
            _language: &str,
            _original: &str,
            _attempt: &str,
        ) -> Result<CheckResponse, GradingError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(GradingError::Malformed("unreachable".to_string()))
        }
    }

    fn config() -> DrillConfig {
        DrillConfig {
            min_active_unlearned: 3,
            grading_timeout: Duration::from_millis(100),
            ..DrillConfig::default()
        }
    }

    fn service(oracle: Arc<dyn GradingOracle>) -> (DrillService, Arc<CountingSource>) {
        let config = config();
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(WordStore::new(&config));
        let service = DrillService::new(
            store,
            Some(source.clone() as Arc<dyn VocabularySource>),
            oracle,
            &config,
        );
        (service, source)
    }

    #[tokio::test]
    async fn test_get_word_pulls_from_source() {
        let (service, source) = service(Arc::new(FixedOracle { right: true }));

        let word = service.get_word("Greek").await.unwrap();
        assert!(word.active);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.stats("greek").unlearned_active, 3);
        assert_eq!(service.stats("greek").inactive, 1);
    }

    #[tokio::test]
    async fn test_check_attempt_scores_word() {
        let (service, _) = service(Arc::new(FixedOracle { right: true }));
        let word = service.get_word("greek").await.unwrap();

        let checked = service.check_attempt("greek", &word.text, "logos").await.unwrap();
        assert!(checked.right);
        assert!(service
            .dump_word_entries("greek")
            .contains(&format!("{} | active=true | tries=1", word.text)));
    }

    #[tokio::test]
    async fn test_check_attempt_on_untracked_word_still_returns_grade() {
        let (service, _) = service(Arc::new(FixedOracle { right: false }));

        let checked = service.check_attempt("greek", "missing", "x").await.unwrap();
        assert!(!checked.right);
        assert_eq!(checked.message, "x for missing");
    }

    #[tokio::test]
    async fn test_grading_timeout() {
        let (service, _) = service(Arc::new(SlowOracle));

        let err = service.check_attempt("greek", "λόγος", "logos").await.unwrap_err();
        assert!(matches!(err, DrillError::GradingTimeout(_)));
    }
}
