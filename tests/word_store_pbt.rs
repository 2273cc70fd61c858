//! Property-based tests for the word store.
//!
//! - Dedup: no two records share (lowercase language, text), whatever is added
//! - Add-only: re-adding known keys changes nothing
//! - Scoring: right increments every match by one, wrong resets every match
//! - Eligibility: mastered words never appear in the pool

use std::collections::HashSet;

use proptest::prelude::*;

use naas_backend::config::DrillConfig;
use naas_backend::services::word_store::{ScoreUpdate, WordRecord, WordStore};

fn arb_language() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["greek", "Greek", "GREEK", "hindi", "Hindi", "russian"])
        .prop_map(str::to_string)
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["λόγος", "θεός", "नमस्ते", "мир", "Мир", "no"]).prop_map(str::to_string)
}

fn arb_record() -> impl Strategy<Value = WordRecord> {
    (arb_text(), arb_language(), any::<bool>(), 0u32..6).prop_map(|(text, language, active, tries)| {
        WordRecord {
            num_correct_tries: tries,
            active,
            ..WordRecord::new(text, language)
        }
    })
}

fn tries_by_record(store: &WordStore, languages: &[&str]) -> Vec<String> {
    languages
        .iter()
        .flat_map(|l| store.dump_word_entries(l).lines().map(str::to_string).collect::<Vec<_>>())
        .collect()
}

proptest! {
    #[test]
    fn prop_store_never_holds_duplicate_keys(
        batches in prop::collection::vec(prop::collection::vec(arb_record(), 0..12), 0..6)
    ) {
        let store = WordStore::new(&DrillConfig::default());
        let mut expected = HashSet::new();
        for batch in batches {
            for record in &batch {
                expected.insert((record.language.to_lowercase(), record.text.clone()));
            }
            store.add_words(batch);
        }

        prop_assert_eq!(store.len(), expected.len());
        for language in ["greek", "hindi", "russian"] {
            let known = store.known_words(language);
            let unique: HashSet<&String> = known.iter().collect();
            prop_assert_eq!(unique.len(), known.len());
            prop_assert!(store.inactive_words(language).len() == known.len());
        }
    }

    #[test]
    fn prop_readding_is_noop(records in prop::collection::vec(arb_record(), 1..12)) {
        let store = WordStore::new(&DrillConfig::default());
        store.add_words(records.clone());
        let before = tries_by_record(&store, &["greek", "hindi", "russian"]);

        prop_assert_eq!(store.add_words(records), 0);
        prop_assert_eq!(tries_by_record(&store, &["greek", "hindi", "russian"]), before);
    }

    #[test]
    fn prop_scoring_is_monotone(
        records in prop::collection::vec(arb_record(), 1..12),
        target in arb_text(),
        right in any::<bool>(),
    ) {
        let store = WordStore::from_records(&DrillConfig::default(), records.clone());

        let mut seen = HashSet::new();
        let mut expected: Vec<WordRecord> = records
            .into_iter()
            .filter(|r| seen.insert((r.language.to_lowercase(), r.text.clone())))
            .collect();
        let mut expected_touched = 0;
        for record in expected.iter_mut().filter(|r| r.text == target) {
            expected_touched += 1;
            record.num_correct_tries = if right { record.num_correct_tries + 1 } else { 0 };
        }

        prop_assert_eq!(store.score(&target, ScoreUpdate { right }), expected_touched);

        for language in ["greek", "hindi", "russian"] {
            let lines: Vec<String> = expected
                .iter()
                .filter(|r| r.language.to_lowercase() == language)
                .map(|r| format!(
                    "{}: {} | active={} | tries={}",
                    r.language, r.text, r.active, r.num_correct_tries
                ))
                .collect();
            prop_assert_eq!(store.dump_word_entries(language), lines.join("\n"));
        }
    }

    #[test]
    fn prop_mastered_never_eligible(records in prop::collection::vec(arb_record(), 0..16)) {
        let config = DrillConfig::default();
        let store = WordStore::from_records(&config, records);
        for language in ["greek", "hindi", "russian"] {
            for word in store.unlearned_active_words(language) {
                prop_assert!(word.active);
                prop_assert!(word.num_correct_tries < config.mastery_threshold);
            }
        }
    }
}
