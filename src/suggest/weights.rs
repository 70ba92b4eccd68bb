//! Edit costs that depend on the characters involved.
//!
//! A [`WeightMap`] is built from [`CostMapDef`]s. Each definition lists sets
//! of interchangeable characters or sequences and what it costs to insert,
//! delete, replace or swap them. Cheaper costs win when definitions overlap,
//! larger penalties win.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Cost, JOIN_SEPARATOR};

/// One entry of a cost map.
///
/// `map` holds sets separated by `|`. Inside a set every character stands
/// alone unless grouped in parentheses: `"aeiou|(ei)(ie)"` is the set of
/// vowels and the set `{ei, ie}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostMapDef {
    pub map: String,
    pub ins_del: Option<Cost>,
    pub replace: Option<Cost>,
    pub swap: Option<Cost>,
    pub penalty: Option<Cost>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Weight {
    cost: Cost,
    penalty: Cost,
}

#[derive(Debug, Default)]
struct CostTrie {
    children: HashMap<char, CostTrie>,
    weight: Option<Weight>,
}

impl CostTrie {
    fn add(&mut self, s: &[char], cost: Cost, penalty: Option<Cost>) {
        if s.is_empty() {
            return;
        }
        let node = s
            .iter()
            .fold(self, |t, &c| t.children.entry(c).or_default());
        let penalty = penalty.unwrap_or(0);
        node.weight = Some(match node.weight {
            Some(w) => Weight {
                cost: w.cost.min(cost),
                penalty: w.penalty.max(penalty),
            },
            None => Weight { cost, penalty },
        });
    }

    /// Every stored entry that `s[i..]` starts with, as (end index, weight).
    fn prefixes<'a>(
        &'a self,
        s: &'a [char],
        i: usize,
    ) -> impl Iterator<Item = (usize, Weight)> + 'a {
        let mut node = self;
        (i..s.len())
            .map_while(move |j| {
                node = node.children.get(&s[j])?;
                Some((j + 1, node.weight))
            })
            .filter_map(|(end, w)| w.map(|w| (end, w)))
    }
}

/// Costs of turning one sequence into another.
#[derive(Debug, Default)]
struct PairTrie {
    children: HashMap<char, PairTrie>,
    targets: Option<CostTrie>,
}

impl PairTrie {
    fn add(&mut self, from: &[char], to: &[char], cost: Cost, penalty: Option<Cost>) {
        let node = from
            .iter()
            .fold(self, |t, &c| t.children.entry(c).or_default());
        node.targets.get_or_insert_with(CostTrie::default).add(to, cost, penalty);
    }

    fn prefixes<'a>(
        &'a self,
        s: &'a [char],
        i: usize,
    ) -> impl Iterator<Item = (usize, &'a CostTrie)> + 'a {
        let mut node = self;
        (i..s.len())
            .map_while(move |j| {
                node = node.children.get(&s[j])?;
                Some((j + 1, node.targets.as_ref()))
            })
            .filter_map(|(end, t)| t.map(|t| (end, t)))
    }
}

/// A penalty added once for every match of `pattern` in a suggestion.
#[derive(Debug, Clone)]
pub struct PenaltyAdjustment {
    pub id: String,
    pub pattern: Regex,
    pub penalty: Cost,
}

/// A step of the weighted search: both positions after the edit plus what
/// the edit added.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Step {
    pub ai: usize,
    pub bi: usize,
    pub cost: Cost,
    pub penalty: Cost,
}

impl Step {
    fn new(ai: usize, bi: usize, w: Weight) -> Self {
        Self {
            ai,
            bi,
            cost: w.cost,
            penalty: w.penalty,
        }
    }
}

#[derive(Debug, Default)]
pub struct WeightMap {
    ins_del: CostTrie,
    replace: PairTrie,
    swap: PairTrie,
    adjustments: Vec<PenaltyAdjustment>,
}

impl WeightMap {
    pub fn new<'a>(defs: impl IntoIterator<Item = &'a CostMapDef>) -> Self {
        let mut map = Self::default();
        for def in defs {
            map.add_def(def);
        }
        map
    }

    pub fn add_def(&mut self, def: &CostMapDef) {
        for set in split_map(&def.map) {
            if let Some(cost) = def.ins_del {
                for s in &set {
                    self.ins_del.add(s, cost, def.penalty);
                }
            }
            for (trie, cost) in [(&mut self.replace, def.replace), (&mut self.swap, def.swap)] {
                let Some(cost) = cost else { continue };
                for left in &set {
                    for right in set.iter().filter(|r| *r != left) {
                        trie.add(left, right, cost, def.penalty);
                    }
                }
            }
        }
    }

    /// Adds a penalty rule, replacing an earlier one with the same id.
    pub fn add_adjustment(&mut self, adjustment: PenaltyAdjustment) {
        match self.adjustments.iter_mut().find(|a| a.id == adjustment.id) {
            Some(slot) => *slot = adjustment,
            None => self.adjustments.push(adjustment),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ins_del.children.is_empty()
            && self.replace.children.is_empty()
            && self.swap.children.is_empty()
            && self.adjustments.is_empty()
    }

    /// Total penalty the adjustments charge for `word`.
    pub fn adjustment(&self, word: &str) -> Cost {
        self.adjustments
            .iter()
            .map(|a| a.pattern.find_iter(word).count() as Cost * a.penalty)
            .sum()
    }

    /// Cost of replacing `from` with `to`, if the map has one.
    pub fn replace_cost(&self, from: &str, to: &str) -> Option<Cost> {
        let mut pairs = &self.replace;
        for c in from.chars() {
            pairs = pairs.children.get(&c)?;
        }
        let mut costs = pairs.targets.as_ref()?;
        for c in to.chars() {
            costs = costs.children.get(&c)?;
        }
        costs.weight.map(|w| w.cost)
    }

    /// Edits the map allows from (`ai`, `bi`).
    pub(crate) fn steps(&self, a: &[char], ai: usize, b: &[char], bi: usize) -> Vec<Step> {
        let mut steps = Vec::new();

        for (end, w) in self.ins_del.prefixes(a, ai) {
            steps.push(Step::new(end, bi, w));
        }
        for (end, w) in self.ins_del.prefixes(b, bi) {
            steps.push(Step::new(ai, end, w));
        }

        for (left_end, targets) in self.swap.prefixes(a, ai) {
            for (right_end, w) in targets.prefixes(a, left_end) {
                let swapped = a[left_end..right_end].iter().chain(&a[ai..left_end]);
                let len = right_end - ai;
                if b.len() - bi >= len && swapped.eq(&b[bi..bi + len]) {
                    steps.push(Step::new(ai + len, bi + len, w));
                }
            }
        }

        for (a_end, targets) in self.replace.prefixes(a, ai) {
            for (b_end, w) in targets.prefixes(b, bi) {
                steps.push(Step::new(a_end, b_end, w));
            }
        }

        steps
    }
}

/// Splits a map into its sets. Word separator look-alikes become `+`.
fn split_map(map: &str) -> Vec<Vec<Vec<char>>> {
    let map = map.replace(&['∙', '•', '・', '●'][..], &JOIN_SEPARATOR.to_string());
    map.split('|')
        .map(|set| {
            let mut items = Vec::new();
            let mut group: Option<Vec<char>> = None;
            for c in set.chars() {
                match group.as_mut() {
                    Some(_) if c == ')' => items.extend(group.take()),
                    Some(seq) => seq.push(c),
                    None if c == '(' => group = Some(Vec::new()),
                    None => items.push(vec![c]),
                }
            }
            items
        })
        .filter(|set| !set.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(map: &str) -> CostMapDef {
        CostMapDef {
            map: map.to_string(),
            ..CostMapDef::default()
        }
    }

    #[test]
    fn sets_and_groups() {
        let sets = split_map("ab|(ei)(ie)c|");
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0], vec![vec!['a'], vec!['b']]);
        assert_eq!(sets[1], vec![vec!['e', 'i'], vec!['i', 'e'], vec!['c']]);
    }

    #[test]
    fn lowest_cost_and_highest_penalty_win() {
        let map = WeightMap::new(&[
            CostMapDef {
                replace: Some(50),
                penalty: Some(5),
                ..def("ae")
            },
            CostMapDef {
                replace: Some(30),
                penalty: Some(1),
                ..def("ae")
            },
        ]);
        assert_eq!(map.replace_cost("a", "e"), Some(30));
        assert_eq!(map.replace_cost("e", "a"), Some(30));
        assert_eq!(map.replace_cost("a", "a"), None);
        let a = ['a'];
        let e = ['e'];
        let steps = map.steps(&a, 0, &e, 0);
        assert_eq!(steps, vec![Step { ai: 1, bi: 1, cost: 30, penalty: 5 }]);
    }

    #[test]
    fn separator_look_alikes_are_folded() {
        let map = WeightMap::new(&[CostMapDef {
            ins_del: Some(10),
            ..def("•")
        }]);
        let b = ['+'];
        assert_eq!(map.steps(&[], 0, &b, 0), vec![Step { ai: 0, bi: 1, cost: 10, penalty: 0 }]);
    }

    #[test]
    fn adjustments_count_every_match() {
        let mut map = WeightMap::default();
        assert!(map.is_empty());
        map.add_adjustment(PenaltyAdjustment {
            id: "double-l".into(),
            pattern: Regex::new("ll").unwrap(),
            penalty: 20,
        });
        assert_eq!(map.adjustment("ballroll"), 40);
        map.add_adjustment(PenaltyAdjustment {
            id: "double-l".into(),
            pattern: Regex::new("ll").unwrap(),
            penalty: 1,
        });
        assert_eq!(map.adjustment("ballroll"), 2);
        assert_eq!(map.adjustment("bar"), 0);
    }
}
