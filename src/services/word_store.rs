use std::collections::HashSet;
use std::time::Duration;

use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DrillConfig;
use crate::services::vocabulary::{SourceError, VocabularySource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub text: String,
    pub language: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub etymology: Option<String>,
    #[serde(default)]
    pub cognates: Option<Vec<String>>,
    #[serde(default)]
    pub num_correct_tries: u32,
    #[serde(default)]
    pub active: bool,
}

impl WordRecord {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            definition: None,
            etymology: None,
            cognates: None,
            num_correct_tries: 0,
            active: false,
        }
    }

    fn key(&self) -> (String, String) {
        (normalize_language(&self.language), self.text.clone())
    }

    fn is_language(&self, normalized: &str) -> bool {
        normalize_language(&self.language) == normalized
    }

    pub fn is_unlearned(&self, mastery_threshold: u32) -> bool {
        self.active && self.num_correct_tries < mastery_threshold
    }
}

/// Verdict of one grading attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub right: bool,
}

impl ScoreUpdate {
    pub fn apply(&self, record: &mut WordRecord) {
        if self.right {
            record.num_correct_tries = record.num_correct_tries.saturating_add(1);
        } else {
            record.num_correct_tries = 0;
        }
    }
}

pub fn normalize_language(language: &str) -> String {
    language.to_lowercase()
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("not enough words for {language} and no vocabulary source configured")]
    PoolExhausted { language: String },
    #[error("vocabulary source returned no new words for {language}")]
    SourceEmpty { language: String },
    #[error("no active unlearned words available for {language}")]
    NoEligibleWords { language: String },
    #[error("vocabulary source timed out after {timeout:?} for {language}")]
    SourceTimeout { language: String, timeout: Duration },
    #[error("gave up refilling {language} after {rounds} source calls")]
    FetchBudgetExhausted { language: String, rounds: usize },
    #[error("vocabulary source failed: {0}")]
    Source(#[from] SourceError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub total: usize,
    pub active: usize,
    pub unlearned_active: usize,
    pub inactive: usize,
    pub mastered: usize,
}

/// Volatile, process-wide word inventory.
///
/// Records sit behind a single lock that is never held across an await.
/// Fetches from the vocabulary source are serialized by `refill_gate`, and
/// the pool is re-checked after every external call because other callers
/// may have changed it in the meantime.
pub struct WordStore {
    words: Mutex<Vec<WordRecord>>,
    refill_gate: tokio::sync::Mutex<()>,
    min_active_unlearned: usize,
    mastery_threshold: u32,
    max_fetch_rounds: usize,
    empty_fetch_retries: usize,
    source_timeout: Duration,
}

impl WordStore {
    pub fn new(config: &DrillConfig) -> Self {
        Self {
            words: Mutex::new(Vec::new()),
            refill_gate: tokio::sync::Mutex::new(()),
            min_active_unlearned: config.min_active_unlearned,
            mastery_threshold: config.mastery_threshold,
            max_fetch_rounds: config.max_fetch_rounds,
            empty_fetch_retries: config.empty_fetch_retries,
            source_timeout: config.source_timeout,
        }
    }

    /// Restores records as given (activation and tries included),
    /// dropping later duplicates of a key.
    pub fn from_records(config: &DrillConfig, records: Vec<WordRecord>) -> Self {
        let store = Self::new(config);
        {
            let mut words = store.words.lock();
            let mut seen = HashSet::new();
            for record in records {
                if seen.insert(record.key()) {
                    words.push(record);
                }
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.words.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.lock().is_empty()
    }

    /// Appends unseen candidates as inactive. Returns how many were added.
    pub fn add_words(&self, candidates: Vec<WordRecord>) -> usize {
        self.insert_candidates(candidates, None)
    }

    /// Same as `add_words`, but only counts insertions under `lang`.
    fn insert_candidates(&self, candidates: Vec<WordRecord>, lang: Option<&str>) -> usize {
        let mut words = self.words.lock();
        let mut existing: HashSet<(String, String)> = words.iter().map(WordRecord::key).collect();
        let mut added = 0;
        let mut counted = 0;
        for mut candidate in candidates {
            candidate.active = false;
            if !existing.insert(candidate.key()) {
                continue;
            }
            if lang.map_or(true, |l| candidate.is_language(l)) {
                counted += 1;
            }
            words.push(candidate);
            added += 1;
        }
        debug!(added, total = words.len(), "added new words");
        counted
    }

    pub fn known_words(&self, language: &str) -> Vec<String> {
        let lang = normalize_language(language);
        known_words_in(&self.words.lock(), &lang)
    }

    pub fn unlearned_active_words(&self, language: &str) -> Vec<WordRecord> {
        let lang = normalize_language(language);
        self.words
            .lock()
            .iter()
            .filter(|w| w.is_language(&lang) && w.is_unlearned(self.mastery_threshold))
            .cloned()
            .collect()
    }

    pub fn inactive_words(&self, language: &str) -> Vec<WordRecord> {
        let lang = normalize_language(language);
        self.words
            .lock()
            .iter()
            .filter(|w| w.is_language(&lang) && !w.active)
            .cloned()
            .collect()
    }

    pub fn stats(&self, language: &str) -> PoolStats {
        let lang = normalize_language(language);
        let words = self.words.lock();
        let mut stats = PoolStats::default();
        for word in words.iter().filter(|w| w.is_language(&lang)) {
            stats.total += 1;
            if !word.active {
                stats.inactive += 1;
                continue;
            }
            stats.active += 1;
            if word.num_correct_tries < self.mastery_threshold {
                stats.unlearned_active += 1;
            } else {
                stats.mastered += 1;
            }
        }
        stats
    }

    /// Tops the language's pool up to `min_active_unlearned`, consuming
    /// inactive inventory first and calling `source` only when none is left.
    pub async fn ensure_active_pool(
        &self,
        language: &str,
        source: Option<&dyn VocabularySource>,
    ) -> Result<(), PoolError> {
        let lang = normalize_language(language);
        if self.activate_from_inventory(&lang) == 0 {
            return Ok(());
        }

        let Some(source) = source else {
            warn!(language, "pool short and no vocabulary source configured");
            return Err(PoolError::PoolExhausted {
                language: language.to_string(),
            });
        };

        let _gate = self.refill_gate.lock().await;
        let mut rounds = 0;
        let mut empty_batches = 0;

        loop {
            let known = {
                let mut words = self.words.lock();
                if self.activate_locked(&mut words, &lang) == 0 {
                    return Ok(());
                }
                known_words_in(&words, &lang)
            };

            if rounds >= self.max_fetch_rounds {
                warn!(language, rounds, "fetch budget exhausted");
                return Err(PoolError::FetchBudgetExhausted {
                    language: language.to_string(),
                    rounds,
                });
            }
            rounds += 1;

            debug!(language, round = rounds, known = known.len(), "fetching vocabulary batch");
            let batch = match tokio::time::timeout(self.source_timeout, source.fetch(language, &known))
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    warn!(language, timeout = ?self.source_timeout, "vocabulary source timed out");
                    return Err(PoolError::SourceTimeout {
                        language: language.to_string(),
                        timeout: self.source_timeout,
                    });
                }
            };

            let offered = batch.len();
            let added = self.insert_candidates(batch, Some(lang.as_str()));
            if added > 0 {
                info!(language, offered, added, "pool replenished from source");
                empty_batches = 0;
                continue;
            }

            empty_batches += 1;
            if empty_batches > self.empty_fetch_retries {
                warn!(language, offered, "vocabulary source produced nothing new");
                return Err(PoolError::SourceEmpty {
                    language: language.to_string(),
                });
            }
            warn!(language, offered, attempt = empty_batches, "empty vocabulary batch, retrying");
        }
    }

    /// Picks uniformly among the pool after making sure it is full.
    pub async fn get_word(
        &self,
        language: &str,
        source: Option<&dyn VocabularySource>,
    ) -> Result<WordRecord, PoolError> {
        self.ensure_active_pool(language, source).await?;

        let lang = normalize_language(language);
        let words = self.words.lock();
        let pool: Vec<&WordRecord> = words
            .iter()
            .filter(|w| w.is_language(&lang) && w.is_unlearned(self.mastery_threshold))
            .collect();

        pool.choose(&mut rand::rng())
            .map(|w| (*w).clone())
            .ok_or_else(|| PoolError::NoEligibleWords {
                language: language.to_string(),
            })
    }

    /// Applies `update` to every record with this exact text, in any
    /// language. Returns the number of records touched.
    pub fn score(&self, original: &str, update: ScoreUpdate) -> usize {
        let mut words = self.words.lock();
        let mut scored = Vec::new();
        for word in words.iter_mut().filter(|w| w.text == original) {
            update.apply(word);
            scored.push((word.language.clone(), word.num_correct_tries));
        }

        if scored.is_empty() {
            warn!(original, "tried to score word not in store");
        } else {
            debug!(original, right = update.right, ?scored, "scored word");
        }
        scored.len()
    }

    pub fn dump_word_entries(&self, language: &str) -> String {
        let lang = normalize_language(language);
        self.words
            .lock()
            .iter()
            .filter(|w| w.is_language(&lang))
            .map(|w| {
                format!(
                    "{}: {} | active={} | tries={}",
                    w.language, w.text, w.active, w.num_correct_tries
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn activate_from_inventory(&self, lang: &str) -> usize {
        let mut words = self.words.lock();
        self.activate_locked(&mut words, lang)
    }

    /// Activates the first inactive record until the deficit closes or
    /// inventory runs out. Returns the remaining deficit.
    fn activate_locked(&self, words: &mut [WordRecord], lang: &str) -> usize {
        loop {
            let unlearned = words
                .iter()
                .filter(|w| w.is_language(lang) && w.is_unlearned(self.mastery_threshold))
                .count();
            let deficit = self.min_active_unlearned.saturating_sub(unlearned);
            if deficit == 0 {
                return 0;
            }

            match words.iter_mut().find(|w| w.is_language(lang) && !w.active) {
                Some(word) => {
                    word.active = true;
                    debug!(language = lang, text = %word.text, "activated word");
                }
                None => return deficit,
            }
        }
    }
}

fn known_words_in(words: &[WordRecord], lang: &str) -> Vec<String> {
    words
        .iter()
        .filter(|w| w.is_language(lang))
        .map(|w| w.text.clone())
        .collect()
}
