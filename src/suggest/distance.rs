use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::weights::WeightMap;
use super::Cost;

/// Calculate Levenshtein distance between two strings
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut row = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            row[j + 1] = std::cmp::min(
                std::cmp::min(
                    prev[j + 1] + 1, // deletion
                    row[j] + 1,      // insertion
                ),
                prev[j] + cost, // substitution
            );
        }
        std::mem::swap(&mut prev, &mut row);
    }

    prev[b_chars.len()]
}

#[derive(Debug, PartialEq, Eq)]
struct Candidate {
    cost: Cost,
    penalty: Cost,
    ai: usize,
    bi: usize,
}

impl Ord for Candidate {
    /// Cheapest first, then furthest along.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| (self.ai + self.bi).cmp(&(other.ai + other.bi)))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Edit distance found by a best-first search over the edit graph.
///
/// Insertions, deletions, substitutions and adjacent transpositions each cost
/// `cost`; matching characters are free.
pub fn distance_a_star(a: &str, b: &str, cost: Cost) -> Cost {
    distance_a_star_weighted(a, b, &WeightMap::default(), cost)
}

/// Like [`distance_a_star`], but edits listed in `map` may be cheaper and
/// carry penalties. The result is the cheapest path's cost plus its
/// penalties plus the map's adjustments for `b`.
///
/// Both words are searched as `^word$`, so map entries can refer to the
/// start or end of a word.
pub fn distance_a_star_weighted(a: &str, b: &str, map: &WeightMap, cost: Cost) -> Cost {
    let adjustment = map.adjustment(b);
    let a = anchored(a);
    let b = anchored(b);
    let width = b.len() + 1;
    let mut best = vec![Cost::MAX; (a.len() + 1) * width];
    let mut queue = BinaryHeap::new();

    best[0] = 0;
    queue.push(Candidate {
        cost: 0,
        penalty: 0,
        ai: 0,
        bi: 0,
    });

    while let Some(Candidate { cost: c, penalty: p, ai, bi }) = queue.pop() {
        if ai == a.len() && bi == b.len() {
            return c + p + adjustment;
        }
        if c > best[ai * width + bi] {
            continue;
        }

        let mut relax = |ai: usize, bi: usize, step: Cost, penalty: Cost| {
            let next = c + step;
            let slot = &mut best[ai * width + bi];
            if next < *slot {
                *slot = next;
                queue.push(Candidate {
                    cost: next,
                    penalty: p + penalty,
                    ai,
                    bi,
                });
            }
        };

        if ai + 1 < a.len() && bi + 1 < b.len() && a[ai] == b[bi + 1] && a[ai + 1] == b[bi] {
            relax(ai + 2, bi + 2, cost, 0);
        }
        if bi < b.len() {
            relax(ai, bi + 1, cost, 0);
        }
        if ai < a.len() {
            relax(ai + 1, bi, cost, 0);
        }
        for step in map.steps(&a, ai, &b, bi) {
            relax(step.ai, step.bi, step.cost, step.penalty);
        }
        if ai < a.len() && bi < b.len() {
            let step = if a[ai] == b[bi] { 0 } else { cost };
            relax(ai + 1, bi + 1, step, 0);
        }
    }

    // The end node is always reachable.
    best[a.len() * width + b.len()] + adjustment
}

fn anchored(word: &str) -> Vec<char> {
    std::iter::once('^').chain(word.chars()).chain(['$']).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::weights::{CostMapDef, PenaltyAdjustment};

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("hello", "hello"), 0);
        assert_eq!(levenshtein_distance("hello", "hallo"), 1);
        assert_eq!(levenshtein_distance("hello", "hullo"), 1);
        assert_eq!(levenshtein_distance("hello", "world"), 4);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn a_star_matches_levenshtein_without_swaps() {
        for (a, b) in [
            ("", ""),
            ("apple", "aple"),
            ("kitten", "sitting"),
            ("flaw", "lawn"),
            ("café", "cafe"),
        ] {
            let expected = levenshtein_distance(a, b) as Cost * 100;
            assert_eq!(distance_a_star(a, b, 100), expected, "{a} / {b}");
        }
    }

    #[test]
    fn a_star_counts_a_swap_as_one_edit() {
        assert_eq!(distance_a_star("ab", "ba", 100), 100);
        assert_eq!(levenshtein_distance("ab", "ba"), 2);
    }

    fn vowels(replace: Cost) -> WeightMap {
        WeightMap::new(&[CostMapDef {
            map: "aeiou".into(),
            replace: Some(replace),
            ..CostMapDef::default()
        }])
    }

    #[test]
    fn empty_map_is_the_plain_distance() {
        let map = WeightMap::default();
        for (a, b) in [("", ""), ("form", "from"), ("kitten", "sitting"), ("café", "cafe")] {
            assert_eq!(distance_a_star_weighted(a, b, &map, 100), distance_a_star(a, b, 100));
        }
    }

    #[test]
    fn mapped_replacements_are_cheaper() {
        let map = vowels(50);
        assert_eq!(distance_a_star_weighted("cat", "cot", &map, 100), 50);
        assert_eq!(distance_a_star_weighted("cat", "cut", &map, 100), 50);
        assert_eq!(distance_a_star_weighted("cat", "bat", &map, 100), 100);
        assert_eq!(distance_a_star_weighted("cat", "cot", &vowels(150), 100), 100);
    }

    #[test]
    fn insertions_of_mapped_sequences() {
        let map = WeightMap::new(&[CostMapDef {
            map: "(ll)".into(),
            ins_del: Some(30),
            ..CostMapDef::default()
        }]);
        assert_eq!(distance_a_star_weighted("bad", "ballad", &map, 100), 130);
        assert_eq!(distance_a_star_weighted("baad", "ballad", &map, 100), 30);
    }

    #[test]
    fn mapped_swaps() {
        let map = WeightMap::new(&[CostMapDef {
            map: "ie".into(),
            swap: Some(20),
            ..CostMapDef::default()
        }]);
        assert_eq!(distance_a_star_weighted("recieve", "receive", &map, 100), 20);
        assert_eq!(distance_a_star("recieve", "receive", 100), 100);
    }

    #[test]
    fn penalties_add_to_the_cost() {
        let map = WeightMap::new(&[CostMapDef {
            map: "aeiou".into(),
            replace: Some(50),
            penalty: Some(7),
            ..CostMapDef::default()
        }]);
        assert_eq!(distance_a_star_weighted("cat", "cot", &map, 100), 57);

        let mut map = WeightMap::default();
        map.add_adjustment(PenaltyAdjustment {
            id: "trailing-e".into(),
            pattern: regex::Regex::new("e$").unwrap(),
            penalty: 10,
        });
        assert_eq!(distance_a_star_weighted("cat", "cate", &map, 100), 110);
        assert_eq!(distance_a_star_weighted("cate", "cat", &map, 100), 100);
    }

    #[test]
    fn distances_are_symmetric() {
        for (a, b) in [("orange", "range"), ("abcd", "bacd"), ("tree", "three")] {
            assert_eq!(levenshtein_distance(a, b), levenshtein_distance(b, a));
            assert_eq!(distance_a_star(a, b, 100), distance_a_star(b, a, 100));
        }
    }
}
