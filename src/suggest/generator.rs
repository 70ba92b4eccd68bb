use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::trie::TrieBlob;

use super::orthography::visual_mask;
use super::walker::{HintedWalker, WalkerStep};
use super::{is_separator, Cost, CostWeights, SuggestOptions, SuggestionResult};

/// Share of the word length that may be edited before the change limit applies.
const MAX_COST_SCALE: f64 = 0.5;
const INF: Cost = Cost::MAX / 4;
/// Walker steps between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 64;

/// DP state seen right after a word separator.
#[derive(Debug)]
struct HistoryTag {
    text: String,
    /// First entry of `history` found after this state.
    index: usize,
    min: Cost,
}

/// Pull-based suggestion search.
///
/// Each call to [`SuggestionGenerator::next`] resumes the walk and returns the
/// next word costing at most the given limit. Lowering the limit between
/// calls prunes the rest of the search.
///
/// Row `d` of the matrix holds the cost of matching the first `d` trie
/// letters against each prefix of the input. Only the band of columns whose
/// cost is within the limit is computed; a branch is abandoned once its whole
/// band is over the limit.
pub struct SuggestionGenerator<'a> {
    walker: HintedWalker<'a>,
    weights: CostWeights,
    /// The input with a leading placeholder, so column `i` is letter `i`.
    x: Vec<char>,
    mx: usize,
    matrix: Vec<Vec<Cost>>,
    bands: Vec<(usize, usize)>,
    history: Vec<SuggestionResult>,
    history_tags: HashMap<Vec<Cost>, HistoryTag>,
    pending: VecDeque<SuggestionResult>,
    cost_limit: Cost,
    /// Minimum of the last computed row; the walk goes below the last node
    /// only if this is within the limit.
    last_min: Cost,
    deadline: Option<Instant>,
    steps: usize,
    expired: bool,
}

impl<'a> SuggestionGenerator<'a> {
    pub fn new(
        blob: &'a TrieBlob,
        word: &str,
        options: &SuggestOptions,
        weights: CostWeights,
    ) -> Self {
        let x: Vec<char> = std::iter::once(' ').chain(word.chars()).collect();
        let mx = x.len() - 1;
        let scale = (mx as f64 * MAX_COST_SCALE).min(options.change_limit as f64);
        let cost_limit = (f64::from(weights.base) * scale) as Cost;

        let mut row = vec![INF; mx + 1];
        let mut b = 0;
        let mut c = 0;
        let mut i = 0;
        while i <= mx && c <= cost_limit {
            c = i as Cost * weights.base;
            row[i] = c;
            b = i;
            i += 1;
        }

        Self {
            walker: HintedWalker::new(blob, word, options.compound_method, options.ignore_case),
            weights,
            x,
            mx,
            matrix: vec![row],
            bands: vec![(0, b)],
            history: Vec::new(),
            history_tags: HashMap::new(),
            pending: VecDeque::new(),
            cost_limit,
            last_min: 0,
            deadline: None,
            steps: 0,
            expired: false,
        }
    }

    /// The limit the search started with.
    pub fn cost_limit(&self) -> Cost {
        self.cost_limit
    }

    /// Stops the search once `deadline` has passed.
    pub fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// `true` if the search stopped because of the deadline.
    pub fn timed_out(&self) -> bool {
        self.expired
    }

    /// Next suggestion costing at most `max_cost`, or `None` when the search
    /// is exhausted or out of time.
    pub fn next(&mut self, max_cost: Cost) -> Option<SuggestionResult> {
        self.cost_limit = max_cost;
        loop {
            while let Some(r) = self.pending.pop_front() {
                if r.cost <= self.cost_limit {
                    return Some(r);
                }
            }
            if self.check_deadline() {
                return None;
            }
            let go_deeper = self.last_min <= self.cost_limit;
            let step = self.walker.next(go_deeper)?;
            if let Some(r) = self.process(step) {
                return Some(r);
            }
        }
    }

    fn check_deadline(&mut self) -> bool {
        if self.expired {
            return true;
        }
        self.steps += 1;
        if let Some(deadline) = self.deadline {
            if self.steps % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                log::debug!("suggestion search stopped after {} steps", self.steps);
                self.expired = true;
            }
        }
        self.expired
    }

    fn process(&mut self, step: WalkerStep<'a>) -> Option<SuggestionResult> {
        let depth = step.depth;
        let w = step.letter;
        let (mut a, mut b) = self.bands[depth];
        let limit = self.cost_limit;

        if is_separator(w) && self.replay_history(depth, a, b) {
            self.last_min = INF;
            return None;
        }

        let d = depth + 1;
        let text = self.walker.text();
        let weights = self.weights;
        let last_sug_letter = if d > 1 { Some(text[d - 2]) } else { None };
        let c = weights.base - d as Cost + if w == '-' { weights.hyphen } else { 0 };
        let ci_plain = c + if is_separator(w) { weights.insert_separator } else { 0 };
        let ci = if last_sug_letter == Some(w) {
            ci_plain.min(weights.duplicate)
        } else {
            ci_plain
        };
        let psc = weights.swap - weights.base;
        let w_mask = visual_mask(w);
        let mx = self.mx;

        while self.matrix.len() <= d {
            self.matrix.push(vec![INF; mx + 1]);
        }
        while self.bands.len() <= d {
            self.bands.push((0, 0));
        }
        let (head, tail) = self.matrix.split_at_mut(d);
        let prev = &head[d - 1];
        let cur = &mut tail[0];
        let x = &self.x;

        let sub_cost = |cur_letter: char, last_letter: char| -> Cost {
            if w == cur_letter {
                0
            } else if w_mask & visual_mask(cur_letter) != 0 {
                weights.visual_sub
            } else if last_sug_letter == Some(cur_letter) && w == last_letter {
                psc
            } else {
                c
            }
        };
        let del_cost = |i: usize| -> Cost {
            if x[i] == x[i - 1] {
                c.min(weights.duplicate)
            } else {
                c
            }
        };

        cur[a] = prev[a] + ci + d as Cost - a as Cost;
        let mut last_letter = x[a];
        let mut row_min = cur[a];

        for i in (a + 1)..=b {
            let cur_letter = x[i];
            let e = (prev[i - 1] + sub_cost(cur_letter, last_letter))
                .min(prev[i] + ci)
                .min(cur[i - 1] + del_cost(i));
            row_min = row_min.min(e);
            cur[i] = e;
            last_letter = cur_letter;
        }

        // Extend the band to the right while it stays within the limit.
        let bb = b;
        while b < mx {
            b += 1;
            let i = b;
            let cur_letter = x[i];
            let j = bb.min(i - 1);
            let e = (prev[j] + sub_cost(cur_letter, last_letter)).min(cur[i - 1] + del_cost(i));
            row_min = row_min.min(e);
            cur[i] = e;
            last_letter = cur_letter;
            if e > limit {
                break;
            }
        }

        while b > a && cur[b] > limit {
            b -= 1;
        }
        while a < b && cur[a] > limit {
            a += 1;
        }
        b = (b + 1).min(mx);
        let cost = cur[b];
        self.bands[d] = (a, b);
        self.last_min = row_min;

        if step.eow() && cost <= limit {
            let result = SuggestionResult::new(text.iter().collect::<String>(), cost);
            self.history.push(result.clone());
            return Some(result);
        }
        None
    }

    /// Handles a separator step. If an equivalent DP state was seen before,
    /// queues the continuations found from there with the cost adjusted and
    /// returns `true`; the walk below this step can be skipped.
    fn replay_history(&mut self, depth: usize, a: usize, b: usize) -> bool {
        let row = &self.matrix[depth][a..=b];
        let row_min = row.iter().copied().min().unwrap_or(INF);
        let tag: Vec<Cost> = std::iter::once(a as Cost)
            .chain(row.iter().map(|&c| c - row_min))
            .collect();
        let text: String = self.walker.text().iter().collect();

        match self.history_tags.get(&tag) {
            Some(ht) if ht.min <= row_min => {
                let delta = row_min - ht.min;
                for h in self.history.get(ht.index..).unwrap_or_default() {
                    let Some(suffix) = h.word.strip_prefix(ht.text.as_str()) else {
                        break;
                    };
                    let cost = h.cost + delta;
                    if cost <= self.cost_limit {
                        self.pending
                            .push_back(SuggestionResult::new(format!("{text}{suffix}"), cost));
                    }
                }
                true
            }
            _ => {
                self.history_tags.insert(
                    tag,
                    HistoryTag {
                        text,
                        index: self.history.len(),
                        min: row_min,
                    },
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::CompoundMethod;
    use crate::trie::TrieBlobBuilder;

    fn run(words: &[&str], input: &str, options: &SuggestOptions) -> Vec<SuggestionResult> {
        let blob = TrieBlobBuilder::from_words(words).build();
        let mut generator = SuggestionGenerator::new(&blob, input, options, CostWeights::default());
        let limit = generator.cost_limit();
        let mut results = Vec::new();
        while let Some(r) = generator.next(limit) {
            results.push(r);
        }
        results
    }

    fn cost_of(results: &[SuggestionResult], word: &str) -> Option<Cost> {
        results.iter().find(|r| r.word == word).map(|r| r.cost)
    }

    #[test]
    fn exact_match_is_free() {
        let results = run(&["walk", "talk"], "walk", &SuggestOptions::default());
        assert_eq!(cost_of(&results, "walk"), Some(0));
        assert!(cost_of(&results, "talk").is_some_and(|c| c > 0));
    }

    #[test]
    fn first_letter_edits_cost_more() {
        let results = run(&["cart", "bart", "cast"], "dart", &SuggestOptions::default());
        let first = cost_of(&results, "cart").unwrap();
        let later = run(&["cart", "bart", "cast"], "cant", &SuggestOptions::default());
        let inner = cost_of(&later, "cast").unwrap();
        assert!(first > inner);
    }

    #[test]
    fn transposition_is_cheaper_than_two_edits() {
        let results = run(&["form", "from"], "form", &SuggestOptions::default());
        let swap = cost_of(&results, "from").unwrap();
        assert!(swap < 2 * 90, "{swap}");
        assert!(swap >= 70);
    }

    #[test]
    fn doubled_letters_are_cheap() {
        let results = run(&["apple", "ample"], "aple", &SuggestOptions::default());
        let double = cost_of(&results, "apple").unwrap();
        assert!(double <= 60, "{double}");
    }

    #[test]
    fn accents_are_nearly_free() {
        let results = run(&["café"], "cafe", &SuggestOptions::default());
        assert_eq!(cost_of(&results, "café"), Some(1));
    }

    #[test]
    fn lower_limit_prunes() {
        let blob = TrieBlobBuilder::from_words(["walk", "talk", "chalk"]).build();
        let options = SuggestOptions::default();
        let mut generator =
            SuggestionGenerator::new(&blob, "walk", &options, CostWeights::default());
        let mut results = Vec::new();
        while let Some(r) = generator.next(0) {
            results.push(r);
        }
        assert_eq!(results, vec![SuggestionResult::new("walk", 0)]);
    }

    #[test]
    fn separate_words() {
        let options = SuggestOptions {
            compound_method: CompoundMethod::SeparateWords,
            ..SuggestOptions::default()
        };
        let results = run(&["in", "the", "tin"], "in the", &options);
        assert_eq!(cost_of(&results, "in the"), Some(0));
    }
}
