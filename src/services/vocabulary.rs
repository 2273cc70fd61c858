use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::services::llm_provider::{parse_json_content, LLMError, LLMProvider};
use crate::services::prompts;
use crate::services::word_store::{normalize_language, WordRecord};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Llm(#[from] LLMError),
    #[error("malformed vocabulary batch: {0}")]
    Malformed(String),
}

/// Supplies fresh candidate words for a language.
///
/// Implementations should avoid `known_words`, but the store deduplicates
/// whatever comes back. An empty batch means the source has nothing more.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    async fn fetch(
        &self,
        language: &str,
        known_words: &[String],
    ) -> Result<Vec<WordRecord>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct WordBatch {
    #[serde(default)]
    words: Vec<GeneratedWord>,
}

#[derive(Debug, Deserialize)]
struct GeneratedWord {
    #[serde(default)]
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    etymology: Option<String>,
    #[serde(default)]
    cognates: Option<Vec<String>>,
}

impl GeneratedWord {
    fn into_record(self, requested_language: &str) -> Option<WordRecord> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(reported) = self.language.as_deref() {
            if normalize_language(reported) != normalize_language(requested_language) {
                debug!(
                    reported,
                    requested = requested_language,
                    text,
                    "overriding reported language"
                );
            }
        }
        Some(WordRecord {
            text: text.to_string(),
            language: requested_language.to_string(),
            definition: self.definition,
            etymology: self.etymology,
            cognates: self.cognates,
            num_correct_tries: 0,
            active: false,
        })
    }
}

pub struct LlmVocabularySource {
    llm: LLMProvider,
    batch_size: usize,
}

impl LlmVocabularySource {
    pub fn new(llm: LLMProvider, batch_size: usize) -> Self {
        Self { llm, batch_size }
    }
}

#[async_trait]
impl VocabularySource for LlmVocabularySource {
    async fn fetch(
        &self,
        language: &str,
        known_words: &[String],
    ) -> Result<Vec<WordRecord>, SourceError> {
        let messages = prompts::word_batch(language, known_words, self.batch_size);
        let raw = self
            .llm
            .chat_json(&messages, prompts::WORD_BATCH_TEMPERATURE)
            .await?;
        let words = parse_word_batch(&raw, language)?;
        debug!(
            language,
            words = ?words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>(),
            "LLM returned words"
        );
        Ok(words)
    }
}

fn parse_word_batch(raw: &str, language: &str) -> Result<Vec<WordRecord>, SourceError> {
    let batch: WordBatch = parse_json_content(raw)
        .map_err(|e| SourceError::Malformed(format!("{e}; output was: {raw}")))?;
    Ok(batch
        .words
        .into_iter()
        .filter_map(|w| w.into_record(language))
        .collect())
}
