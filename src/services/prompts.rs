use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::services::llm_provider::ChatMessage;
use crate::services::word_store::normalize_language;

pub const WORD_BATCH_TEMPERATURE: f32 = 0.9;
pub const CHECK_TEMPERATURE: f32 = 0.0;
pub const FEEDBACK_TEMPERATURE: f32 = 0.7;

const FALLBACK_SCHEME: &str =
    "No explicit scheme is configured. Accept the most widely used romanization for this language.";

pub fn word_batch(language: &str, known_words: &[String], number: usize) -> Vec<ChatMessage> {
    let system = format!(
        "You are a vocabulary generator for learners practicing transliteration of {language}. \
         Respond with a JSON object of the form \
         {{\"words\":[{{\"text\":\"word in native script\",\"language\":\"{language}\",\
         \"definition\":\"short English gloss\",\"etymology\":\"one sentence\",\
         \"cognates\":[\"related words in other languages\"]}}]}}."
    );

    let avoid = if known_words.is_empty() {
        "There are no words to avoid.".to_string()
    } else {
        format!("Do not repeat any of these words: {}.", known_words.join(", "))
    };

    let user = format!(
        "Give me {number} common {language} words written in their native script, \
         ordered from easiest to hardest. {avoid}"
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn check_transliteration(
    language: &str,
    original: &str,
    transliteration: &str,
    scheme: &str,
) -> Vec<ChatMessage> {
    let system = format!(
        "You grade transliterations of {language} words into Latin script. \
         Use this transliteration scheme:\n{scheme}\n\
         Respond with a JSON object: {{\"right\": true|false, \"message\": \"short explanation\", \
         \"correct_transliteration\": \"...\", \
         \"scratch\": [{{\"letter\": \"source character\", \"mapped\": \"its transliteration\"}}]}}. \
         The scratch list covers every character of the original word in order."
    );

    let user = format!("Word: {original}\nAttempt: {transliteration}");

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn friendly_feedback(
    language: &str,
    word: &str,
    attempt: &str,
    right: bool,
    correct_transliteration: &str,
) -> Vec<ChatMessage> {
    let system = format!(
        "You are a warm, encouraging grandmother who speaks {language} and is helping a \
         grandchild learn to read. Reply with a JSON object: \
         {{\"message\": \"one or two sentences in {language}\", \
         \"transliteration\": \"the message transliterated into Latin script\", \
         \"gloss\": \"an English translation of the message\"}}."
    );

    let verdict = if right { "correct" } else { "incorrect" };
    let user = format!(
        "The word was {word}. The learner wrote \"{attempt}\", which is {verdict}. \
         The correct transliteration is \"{correct_transliteration}\"."
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Loads `{dir}/{language}.txt`, falling back to a generic instruction.
pub async fn load_scheme(dir: &Path, language: &str) -> String {
    let path = scheme_path(dir, language);
    match tokio::fs::read_to_string(&path).await {
        Ok(scheme) if !scheme.trim().is_empty() => {
            debug!(path = %path.display(), "loaded transliteration scheme");
            scheme
        }
        Ok(_) => {
            warn!(path = %path.display(), "transliteration scheme is empty");
            FALLBACK_SCHEME.to_string()
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "transliteration scheme not found");
            FALLBACK_SCHEME.to_string()
        }
    }
}

fn scheme_path(dir: &Path, language: &str) -> PathBuf {
    let file: String = normalize_language(language)
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    dir.join(format!("{file}.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_batch_lists_known_words() {
        let known = vec!["λόγος".to_string(), "θεός".to_string()];
        let messages = word_batch("greek", &known, 10);
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("λόγος, θεός"));
        assert!(messages[1].content.contains("10 common greek words"));
    }

    #[test]
    fn test_scheme_path_strips_separators() {
        let path = scheme_path(Path::new("/schemes"), "../Greek");
        assert_eq!(path, PathBuf::from("/schemes/greek.txt"));
    }

    #[tokio::test]
    async fn test_load_scheme_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("greek.txt"), "λ -> l\nο -> o").unwrap();

        let scheme = load_scheme(dir.path(), "Greek").await;
        assert!(scheme.contains("λ -> l"));
    }

    #[tokio::test]
    async fn test_load_scheme_missing_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let scheme = load_scheme(dir.path(), "hindi").await;
        assert_eq!(scheme, FALLBACK_SCHEME);
    }
}
