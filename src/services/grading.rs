use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::services::llm_provider::{parse_json_content, LLMError, LLMProvider};
use crate::services::prompts;
use crate::services::word_store::ScoreUpdate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScratchItem {
    pub letter: String,
    pub mapped: String,
}

/// Grading result returned to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub right: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub correct_transliteration: String,
    #[serde(default)]
    pub scratch: Vec<ScratchItem>,
    #[serde(default)]
    pub message_transliteration: Option<String>,
    #[serde(default)]
    pub message_translation: Option<String>,
}

impl CheckResponse {
    pub fn score_update(&self) -> ScoreUpdate {
        ScoreUpdate { right: self.right }
    }
}

#[derive(Debug, Error)]
pub enum GradingError {
    #[error(transparent)]
    Llm(#[from] LLMError),
    #[error("malformed grading output: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait GradingOracle: Send + Sync {
    async fn grade(
        &self,
        language: &str,
        original: &str,
        attempt: &str,
    ) -> Result<CheckResponse, GradingError>;
}

#[derive(Debug, Default, Deserialize)]
struct Feedback {
    message: Option<String>,
    transliteration: Option<String>,
    gloss: Option<String>,
}

pub struct LlmGradingOracle {
    llm: LLMProvider,
    schemes_dir: PathBuf,
}

impl LlmGradingOracle {
    pub fn new(llm: LLMProvider, schemes_dir: impl Into<PathBuf>) -> Self {
        Self {
            llm,
            schemes_dir: schemes_dir.into(),
        }
    }

    async fn feedback(
        &self,
        language: &str,
        original: &str,
        attempt: &str,
        checked: &CheckResponse,
    ) -> Result<Feedback, LLMError> {
        let messages = prompts::friendly_feedback(
            language,
            original,
            attempt,
            checked.right,
            &checked.correct_transliteration,
        );
        let raw = self
            .llm
            .chat_json(&messages, prompts::FEEDBACK_TEMPERATURE)
            .await?;
        parse_json_content(&raw)
    }
}

#[async_trait]
impl GradingOracle for LlmGradingOracle {
    async fn grade(
        &self,
        language: &str,
        original: &str,
        attempt: &str,
    ) -> Result<CheckResponse, GradingError> {
        let scheme = prompts::load_scheme(&self.schemes_dir, language).await;
        let messages = prompts::check_transliteration(language, original, attempt, &scheme);
        let raw = self.llm.chat_json(&messages, prompts::CHECK_TEMPERATURE).await?;
        let checked: CheckResponse = parse_json_content(&raw)
            .map_err(|e| GradingError::Malformed(format!("{e}; output was: {raw}")))?;

        match self.feedback(language, original, attempt, &checked).await {
            Ok(feedback) => {
                debug!(?feedback, "friendly feedback generated");
                Ok(merge_feedback(checked, feedback))
            }
            Err(err) => {
                warn!(error = %err, language, original, "feedback step failed, keeping check message");
                Ok(checked)
            }
        }
    }
}

fn merge_feedback(mut checked: CheckResponse, feedback: Feedback) -> CheckResponse {
    if let Some(message) = feedback.message.filter(|m| !m.trim().is_empty()) {
        checked.message = message;
    }
    checked.message_transliteration = feedback.transliteration;
    checked.message_translation = feedback.gloss;
    checked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_response_wire_shape() {
        let raw = r#"{"right":false,"message":"close","correct_transliteration":"logos",
            "scratch":[{"letter":"λ","mapped":"l"}]}"#;
        let checked: CheckResponse = parse_json_content(raw).unwrap();

        assert!(!checked.score_update().right);
        assert_eq!(checked.scratch[0].mapped, "l");
        assert!(checked.message_translation.is_none());
    }

    #[test]
    fn test_merge_feedback_keeps_message_when_blank() {
        let checked = CheckResponse {
            right: true,
            message: "correct".to_string(),
            correct_transliteration: "logos".to_string(),
            scratch: Vec::new(),
            message_transliteration: None,
            message_translation: None,
        };
        let merged = merge_feedback(
            checked,
            Feedback {
                message: Some(" ".to_string()),
                transliteration: Some("bravo".to_string()),
                gloss: Some("well done".to_string()),
            },
        );

        assert_eq!(merged.message, "correct");
        assert_eq!(merged.message_translation.as_deref(), Some("well done"));
    }
}
