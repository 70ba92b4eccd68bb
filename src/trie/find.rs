use serde::{Deserialize, Serialize};

use super::node::{walk, TrieNode};
use super::TrieOptions;

/// How words may be split into compound parts during lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundMode {
    /// Only whole stored words match.
    None,
    /// Words may be glued from parts marked with the compound character.
    #[default]
    Compound,
    /// Words may be glued from any stored words, each at least
    /// [`FindOptions::legacy_min_compound_length`] long. Markers are ignored.
    Legacy,
}

pub const DEFAULT_LEGACY_MIN_COMPOUND_LENGTH: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindOptions {
    pub match_case: bool,
    pub compound_mode: CompoundMode,
    pub legacy_min_compound_length: usize,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            match_case: true,
            compound_mode: CompoundMode::Compound,
            legacy_min_compound_length: DEFAULT_LEGACY_MIN_COMPOUND_LENGTH,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FindResult {
    pub found: bool,
    pub forbidden: bool,
    pub compound_used: bool,
    pub case_matched: bool,
}

/// Looks `word` up below `root`.
///
/// Besides exact matches this follows the marker conventions of
/// [`TrieOptions`]: a word may be assembled from compound parts ("foo+" then
/// "+bar"), matched through the case and accent insensitive subtree when case
/// need not match, and is reported as forbidden when the forbidden subtree
/// holds it.
pub fn find_word<N: TrieNode>(
    root: N,
    word: &str,
    trie: &TrieOptions,
    options: &FindOptions,
) -> FindResult {
    if walk(root, word).is_some_and(|n| n.eow()) {
        return FindResult {
            found: true,
            forbidden: is_forbidden_word(root, word, trie.forbidden_word_prefix),
            compound_used: false,
            case_matched: true,
        };
    }

    let mut roots = vec![(root, true)];
    if !options.match_case {
        if let Some(r) = root.get(trie.strip_case_and_accents_prefix) {
            roots.push((r, false));
        }
    }
    let chars: Vec<char> = word.chars().collect();
    let found = match options.compound_mode {
        CompoundMode::Legacy => {
            legacy_segments(&roots, &chars, options.legacy_min_compound_length, true, false)
        }
        mode => {
            let compound = (mode == CompoundMode::Compound).then_some(trie.compound_character);
            let compound_roots: Vec<(N, bool)> = match compound {
                Some(cc) => roots
                    .iter()
                    .filter_map(|&(r, case)| r.get(cc).map(|n| (n, case)))
                    .collect(),
                None => Vec::new(),
            };
            let search = Search {
                compound,
                compound_roots: &compound_roots,
            };
            roots
                .iter()
                .find_map(|&(r, case)| search.segments(r, &chars, 0, case, false))
        }
    };

    if let Some((compound_used, case_matched)) = found {
        let forbid_root = if case_matched {
            Some(root)
        } else {
            root.get(trie.strip_case_and_accents_prefix)
        };
        let forbidden =
            forbid_root.is_some_and(|r| is_forbidden_word(r, word, trie.forbidden_word_prefix));
        return FindResult {
            found: true,
            forbidden,
            compound_used,
            case_matched,
        };
    }

    FindResult {
        found: false,
        forbidden: is_forbidden_word(root, word, trie.forbidden_word_prefix),
        compound_used: false,
        case_matched: false,
    }
}

/// `true` when `word` is stored under the forbidden prefix below `root`.
pub fn is_forbidden_word<N: TrieNode>(root: N, word: &str, forbidden_prefix: char) -> bool {
    root.get(forbidden_prefix)
        .and_then(|n| walk(n, word))
        .is_some_and(|n| n.eow())
}

struct Search<'r, N> {
    compound: Option<char>,
    compound_roots: &'r [(N, bool)],
}

impl<N: TrieNode> Search<'_, N> {
    /// Matches `chars` from `node`. `consumed` counts the characters matched
    /// in the current part; a part must not be empty.
    fn segments(
        &self,
        node: N,
        chars: &[char],
        consumed: usize,
        case_matched: bool,
        compound_used: bool,
    ) -> Option<(bool, bool)> {
        let Some((&c, rest)) = chars.split_first() else {
            return (node.eow() && consumed > 0).then_some((compound_used, case_matched));
        };
        if let Some(next) = node.get(c) {
            let found = self.segments(next, rest, consumed + 1, case_matched, compound_used);
            if found.is_some() {
                return found;
            }
        }
        let cc = self.compound?;
        if consumed == 0 || !node.get(cc).is_some_and(|m| m.eow()) {
            return None;
        }
        self.compound_roots.iter().find_map(|&(part_root, case)| {
            let next = part_root.get(c)?;
            self.segments(next, rest, 1, case_matched && case, true)
        })
    }
}

/// Splits `chars` into whole stored words of at least `min` characters,
/// trying the longest split points last.
fn legacy_segments<N: TrieNode>(
    roots: &[(N, bool)],
    chars: &[char],
    min: usize,
    case_matched: bool,
    compound_used: bool,
) -> Option<(bool, bool)> {
    for &(root, case) in roots {
        let case_matched = case_matched && case;
        let mut node = root;
        for (i, &c) in chars.iter().enumerate() {
            let Some(next) = node.get(c) else { break };
            node = next;
            let len = i + 1;
            if !node.eow() || len < min {
                continue;
            }
            let rest = &chars[len..];
            if rest.is_empty() {
                return Some((compound_used, case_matched));
            }
            if rest.len() >= min {
                let found = legacy_segments(roots, rest, min, case_matched, true);
                if found.is_some() {
                    return found;
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::node::NodeGraph;

    fn options() -> TrieOptions {
        TrieOptions::default()
    }

    #[test]
    fn exact_match() {
        let graph = NodeGraph::from_words(["hello", "world"]);
        let r = find_word(graph.root(), "hello", &options(), &FindOptions::default());
        assert!(r.found);
        assert!(r.case_matched);
        assert!(!r.compound_used);
        assert!(!find_word(graph.root(), "hell", &options(), &FindOptions::default()).found);
    }

    #[test]
    fn compound_parts() {
        let graph = NodeGraph::from_words(["foot+", "+ball", "+ball+", "+room", "snow+"]);
        let opts = FindOptions::default();
        let r = find_word(graph.root(), "football", &options(), &opts);
        assert!(r.found);
        assert!(r.compound_used);
        assert!(find_word(graph.root(), "snowballroom", &options(), &opts).found);
        // a suffix part cannot stand alone
        assert!(!find_word(graph.root(), "ball", &options(), &opts).found);
        // "room" does not allow a following part
        assert!(!find_word(graph.root(), "roomball", &options(), &opts).found);

        let none = FindOptions {
            compound_mode: CompoundMode::None,
            ..opts
        };
        assert!(!find_word(graph.root(), "football", &options(), &none).found);
    }

    #[test]
    fn legacy_compounds_join_plain_words() {
        let graph = NodeGraph::from_words(["walk", "talk", "way", "on", "Side", "~side"]);
        let legacy = FindOptions {
            compound_mode: CompoundMode::Legacy,
            ..FindOptions::default()
        };
        let r = find_word(graph.root(), "walkway", &options(), &legacy);
        assert!(r.found);
        assert!(r.compound_used);
        assert!(r.case_matched);
        assert!(find_word(graph.root(), "walktalkway", &options(), &legacy).found);
        // every part needs three letters
        assert!(!find_word(graph.root(), "walkon", &options(), &legacy).found);
        assert!(!find_word(graph.root(), "walkta", &options(), &legacy).found);
        let shorter = FindOptions {
            legacy_min_compound_length: 2,
            ..legacy
        };
        assert!(find_word(graph.root(), "walkon", &options(), &shorter).found);
        // whole words still match exactly
        assert!(find_word(graph.root(), "on", &options(), &legacy).found);

        assert!(!find_word(graph.root(), "walkway", &options(), &FindOptions::default()).found);
        assert!(!find_word(graph.root(), "wayside", &options(), &legacy).found);
        let loose = FindOptions {
            match_case: false,
            ..legacy
        };
        let r = find_word(graph.root(), "wayside", &options(), &loose);
        assert!(r.found);
        assert!(!r.case_matched);
    }

    #[test]
    fn case_insensitive_subtree() {
        let graph = NodeGraph::from_words(["Paris", "~paris"]);
        let strict = FindOptions::default();
        assert!(!find_word(graph.root(), "paris", &options(), &strict).found);

        let loose = FindOptions {
            match_case: false,
            ..strict
        };
        let r = find_word(graph.root(), "paris", &options(), &loose);
        assert!(r.found);
        assert!(!r.case_matched);
    }

    #[test]
    fn forbidden_words() {
        let graph = NodeGraph::from_words(["colour", "!colour", "color"]);
        let r = find_word(graph.root(), "colour", &options(), &FindOptions::default());
        assert!(r.found);
        assert!(r.forbidden);
        assert!(!find_word(graph.root(), "color", &options(), &FindOptions::default()).forbidden);
        assert!(is_forbidden_word(graph.root(), "colour", '!'));
    }
}
