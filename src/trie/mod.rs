pub mod blob;
pub mod builder;
pub mod char_index;
pub mod cursor;
pub mod find;
pub mod node;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::io::{self, ExportOptions};
use crate::suggest::{self, SuggestOptions, SuggestionResult, JOIN_SEPARATOR, WORD_SEPARATOR};

pub use blob::{BlobNode, TrieBlob};
pub use builder::{insert_words_at_cursor, BuilderCursor, TrieBlobBuilder};
pub use char_index::{CharIndex, CharIndexBuilder};
pub use cursor::{TrieCursor, Words};
pub use find::{CompoundMode, FindOptions, FindResult};
pub use node::{GraphNodeRef, NodeGraph, NodeId, TrieNode};

pub const COMPOUND_FIX: char = '+';
pub const CASE_INSENSITIVE_PREFIX: char = '~';
pub const FORBID_PREFIX: char = '!';

/// Marker characters a dictionary uses for its special entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrieOptions {
    /// Leading or trailing character of words that take part in compounds.
    pub compound_character: char,
    /// Root of the subtree holding case and accent folded forms.
    pub strip_case_and_accents_prefix: char,
    /// Root of the subtree holding forbidden words.
    pub forbidden_word_prefix: char,
    /// Whether the dictionary distinguishes case at all.
    pub is_case_aware: bool,
}

impl Default for TrieOptions {
    fn default() -> Self {
        Self {
            compound_character: COMPOUND_FIX,
            strip_case_and_accents_prefix: CASE_INSENSITIVE_PREFIX,
            forbidden_word_prefix: FORBID_PREFIX,
            is_case_aware: true,
        }
    }
}

impl TrieOptions {
    /// The characters that introduce special subtrees below the root.
    pub fn special_prefixes(&self) -> [char; 3] {
        [
            self.compound_character,
            self.strip_case_and_accents_prefix,
            self.forbidden_word_prefix,
        ]
    }
}

/// A read-only dictionary: a [`TrieBlob`] plus word-level operations.
///
/// `Trie` is `Send + Sync`; lookups and suggestions only need `&self`.
#[derive(Debug)]
pub struct Trie {
    blob: TrieBlob,
    num_words: OnceLock<usize>,
}

impl Trie {
    pub fn from_blob(blob: TrieBlob) -> Self {
        Self {
            blob,
            num_words: OnceLock::new(),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_words_with_options(words, TrieOptions::default())
    }

    pub fn from_words_with_options<I, S>(words: I, options: TrieOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = TrieBlobBuilder::new(options);
        builder.insert_words(words);
        Self::from_blob(builder.build())
    }

    /// Parses the text serialization produced by [`Trie::export`].
    pub fn import(text: &str) -> Result<Self> {
        Self::import_with_options(text, TrieOptions::default())
    }

    pub fn import_with_options(text: &str, options: TrieOptions) -> Result<Self> {
        io::import_trie_with_options(text, options).map(Self::from_blob)
    }

    pub fn export(&self, options: &ExportOptions) -> String {
        io::serialize_trie(&self.blob, options)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.blob.encode_bin()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        TrieBlob::decode_bin(bytes).map(Self::from_blob)
    }

    pub fn blob(&self) -> &TrieBlob {
        &self.blob
    }

    pub fn root(&self) -> BlobNode<'_> {
        self.blob.root()
    }

    pub fn options(&self) -> &TrieOptions {
        self.blob.options()
    }

    /// Exact lookup of a stored entry, markers included.
    pub fn has(&self, word: &str) -> bool {
        self.blob.has(word)
    }

    /// `true` if `word` is a valid, non-forbidden word, allowing compounds.
    pub fn has_word(&self, word: &str, case_sensitive: bool) -> bool {
        let r = self.find(
            word,
            &FindOptions {
                match_case: case_sensitive,
                ..FindOptions::default()
            },
        );
        r.found && !r.forbidden
    }

    pub fn find(&self, word: &str, options: &FindOptions) -> FindResult {
        find::find_word(self.root(), word, self.options(), options)
    }

    pub fn is_forbidden_word(&self, word: &str) -> bool {
        find::is_forbidden_word(self.root(), word, self.options().forbidden_word_prefix)
    }

    pub fn suggest(&self, word: &str, options: &SuggestOptions) -> Vec<String> {
        self.suggest_with_cost(word, options)
            .into_iter()
            .map(|s| s.word)
            .collect()
    }

    /// Ranked suggestions for `word`, forbidden words excluded.
    pub fn suggest_with_cost(&self, word: &str, options: &SuggestOptions) -> Vec<SuggestionResult> {
        suggest::suggest_filtered(&self.blob, word, options, |candidate, _| {
            let plain: String = candidate
                .chars()
                .filter(|&c| c != JOIN_SEPARATOR)
                .collect();
            plain
                .split(WORD_SEPARATOR)
                .all(|part| !self.is_forbidden_word(part))
        })
    }

    /// Every stored entry in character order, special entries included.
    pub fn words(&self) -> Words<BlobNode<'_>> {
        self.blob.words()
    }

    /// Stored entries starting with `prefix`.
    pub fn complete_word<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = String> + 'a {
        let node = self.blob.find_node(prefix);
        node.into_iter()
            .flat_map(move |n| Words::with_prefix(n, prefix))
    }

    /// Number of stored entries, counted once and cached.
    pub fn num_words(&self) -> usize {
        *self.num_words.get_or_init(|| self.words().count())
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.blob.num_nodes()
    }
}
