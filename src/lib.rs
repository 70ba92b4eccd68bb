//! Compact trie dictionaries with weighted fuzzy suggestions.
//!
//! Words are stored in a [`Trie`]: an immutable, suffix-shared graph packed
//! into flat arrays ([`trie::TrieBlob`]). Dictionaries can be built from word
//! lists, written in a compact text format ([`io`]) or as binary blobs, and
//! queried for exact lookups, compounds, forbidden words and ranked
//! spelling suggestions ([`suggest`]).

pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod error;
pub mod io;
pub mod suggest;
pub mod trie;

use serde::Serialize;

pub use checker::SpellChecker;
pub use config::Config;
pub use error::{Result, TrieError};
pub use io::ExportOptions;
pub use suggest::{CompoundMethod, SuggestOptions, SuggestionResult};
pub use trie::{Trie, TrieOptions};

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub error_count: usize,
    pub errors: Vec<SpellError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpellError {
    pub word: String,
    pub line: usize,
    pub column: usize,
    pub context: String,
    /// The word is explicitly marked as wrong in the dictionary.
    pub forbidden: bool,
    pub suggestions: Vec<String>,
}
