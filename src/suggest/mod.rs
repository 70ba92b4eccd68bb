//! Fuzzy suggestions for misspelled words.
//!
//! A [`SuggestionGenerator`] walks the trie while filling a weighted edit
//! distance matrix one row per trie level, and yields every word whose cost
//! stays within the limit it is handed on each pull. A
//! [`SuggestionCollector`] keeps the cheapest few and keeps lowering that
//! limit as better candidates come in.

pub mod collector;
pub mod distance;
pub mod generator;
pub mod orthography;
pub mod walker;
pub mod weights;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::trie::TrieBlob;

pub use collector::SuggestionCollector;
pub use generator::SuggestionGenerator;
pub use walker::HintedWalker;
pub use weights::{CostMapDef, PenaltyAdjustment, WeightMap};

pub type Cost = i32;

/// Cost of a plain edit.
pub const BASE_COST: Cost = 100;

/// Separator the walker emits between joined words; removed from results.
pub const JOIN_SEPARATOR: char = '+';
/// Separator the walker emits between separate words; kept in results.
pub const WORD_SEPARATOR: char = ' ';

pub fn is_separator(c: char) -> bool {
    c == JOIN_SEPARATOR || c == WORD_SEPARATOR
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SuggestionResult {
    pub word: String,
    pub cost: Cost,
}

impl SuggestionResult {
    pub fn new(word: impl Into<String>, cost: Cost) -> Self {
        Self {
            word: word.into(),
            cost,
        }
    }
}

/// Whether a suggestion may span several dictionary words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundMethod {
    #[default]
    None,
    /// Words are glued together: "inthe" → "in" + "the".
    JoinWords,
    /// Words are separated by a space: "inthe" → "in the".
    SeparateWords,
}

impl CompoundMethod {
    pub(crate) fn separator(self) -> Option<char> {
        match self {
            CompoundMethod::None => None,
            CompoundMethod::JoinWords => Some(JOIN_SEPARATOR),
            CompoundMethod::SeparateWords => Some(WORD_SEPARATOR),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestOptions {
    pub compound_method: CompoundMethod,
    pub num_suggestions: usize,
    /// Most edits a suggestion may need.
    pub change_limit: usize,
    /// Also search the case and accent insensitive forms.
    pub ignore_case: bool,
    /// Keep candidates that tie with the last one past `num_suggestions`.
    pub include_ties: bool,
    #[serde(rename = "timeout_ms", with = "duration_ms")]
    pub timeout: Duration,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            compound_method: CompoundMethod::None,
            num_suggestions: 8,
            change_limit: 5,
            ignore_case: true,
            include_ties: false,
            timeout: Duration::from_millis(1000),
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Edit costs used by the generator. All values are in units where a plain
/// edit costs [`BASE_COST`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CostWeights {
    pub base: Cost,
    /// Substitution between visually similar letters.
    pub visual_sub: Cost,
    /// Total cost of transposing two adjacent letters.
    pub swap: Cost,
    /// Inserting or deleting a repeated letter.
    pub duplicate: Cost,
    /// Added to the insert cost of a word separator.
    pub insert_separator: Cost,
    /// Extra cost for edits involving `-`.
    pub hyphen: Cost,
    /// Added per word by length: index is the word length, longer words add nothing.
    pub word_length: [Cost; 5],
    /// Added for each word after the first in a compound suggestion.
    pub extra_word: Cost,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            base: BASE_COST,
            visual_sub: 1,
            swap: 75,
            duplicate: 60,
            insert_separator: -1,
            hyphen: 100,
            word_length: [0, 50, 25, 5, 0],
            extra_word: 5,
        }
    }
}

/// Ranked suggestions for `word`.
pub fn suggest(blob: &TrieBlob, word: &str, options: &SuggestOptions) -> Vec<SuggestionResult> {
    suggest_filtered(blob, word, options, |_, _| true)
}

/// Ranked suggestions for `word` that pass `filter`.
pub fn suggest_filtered<F>(
    blob: &TrieBlob,
    word: &str,
    options: &SuggestOptions,
    filter: F,
) -> Vec<SuggestionResult>
where
    F: Fn(&str, Cost) -> bool,
{
    let weights = CostWeights::default();
    let mut collector = SuggestionCollector::new(word, options, weights).with_filter(filter);
    let mut generator = SuggestionGenerator::new(blob, word, options, weights);
    collector.collect(&mut generator);
    collector.suggestions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::TrieBlobBuilder;

    #[test]
    fn options_from_toml() {
        let options: SuggestOptions = toml::from_str(
            r#"
            compound_method = "separate_words"
            num_suggestions = 3
            timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(options.compound_method, CompoundMethod::SeparateWords);
        assert_eq!(options.num_suggestions, 3);
        assert_eq!(options.change_limit, 5);
        assert_eq!(options.timeout, Duration::from_millis(250));
    }

    #[test]
    fn exact_word_costs_nothing() {
        let blob = TrieBlobBuilder::from_words(["house", "mouse", "horse"]).build();
        let results = suggest(&blob, "house", &SuggestOptions::default());
        assert_eq!(results[0], SuggestionResult::new("house", 0));
        let words: Vec<&str> = results.iter().map(|r| r.word.as_str()).collect();
        assert!(words.contains(&"horse"));
        assert!(words.contains(&"mouse"));
    }

    #[test]
    fn filter_removes_candidates() {
        let blob = TrieBlobBuilder::from_words(["house", "mouse", "horse"]).build();
        let options = SuggestOptions::default();
        let results = suggest_filtered(&blob, "house", &options, |w, _| w != "mouse");
        assert!(results.iter().all(|r| r.word != "mouse"));
        assert!(results.iter().any(|r| r.word == "house"));
    }
}
