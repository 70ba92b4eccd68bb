use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::generator::SuggestionGenerator;
use super::{is_separator, Cost, CostWeights, SuggestOptions, SuggestionResult, JOIN_SEPARATOR};

/// Collected suggestions may cost a bit more than the generator's own limit.
const MAX_ALLOWED_COST_SCALE: f64 = 0.515;

type Filter<'f> = Box<dyn Fn(&str, Cost) -> bool + 'f>;

/// Keeps the best suggestions seen so far.
///
/// Every time the working set grows past `num_suggestions`, the cost of the
/// last place becomes the new `max_cost` and everything more expensive is
/// dropped; the generator is then pulled with that lower limit.
pub struct SuggestionCollector<'f> {
    word: String,
    weights: CostWeights,
    num_suggestions: usize,
    include_ties: bool,
    max_cost: Cost,
    time_remaining: Duration,
    sugs: HashMap<String, Cost>,
    filter: Option<Filter<'f>>,
}

impl<'f> SuggestionCollector<'f> {
    pub fn new(word: &str, options: &SuggestOptions, weights: CostWeights) -> Self {
        let len = word.chars().count() as f64;
        let scale = (len * MAX_ALLOWED_COST_SCALE).min(options.change_limit as f64);
        Self {
            word: word.to_string(),
            weights,
            num_suggestions: options.num_suggestions,
            include_ties: options.include_ties,
            max_cost: (f64::from(weights.base) * scale) as Cost,
            time_remaining: options.timeout,
            sugs: HashMap::new(),
            filter: None,
        }
    }

    /// Only suggestions for which `filter(word, cost)` holds are kept.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, Cost) -> bool + 'f,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn max_cost(&self) -> Cost {
        self.max_cost
    }

    /// Pulls suggestions from `generator` until it is exhausted or the time
    /// budget runs out. Can be called again with another generator; the
    /// budget is shared.
    pub fn collect(&mut self, generator: &mut SuggestionGenerator<'_>) {
        if self.time_remaining.is_zero() {
            return;
        }
        let start = Instant::now();
        generator.set_deadline(start + self.time_remaining);
        while let Some(suggestion) = generator.next(self.max_cost) {
            self.add(suggestion);
        }
        if generator.timed_out() {
            log::debug!(
                "suggestions for {:?} cut short after {:?}",
                self.word,
                start.elapsed()
            );
        }
        self.time_remaining = self.time_remaining.saturating_sub(start.elapsed());
    }

    /// Offers one suggestion.
    pub fn add(&mut self, suggestion: SuggestionResult) -> &mut Self {
        let SuggestionResult { word, cost } = suggestion;
        let cost = cost + self.word_cost_adjustment(&word);
        if cost > self.max_cost {
            return self;
        }
        let word: String = word.chars().filter(|&c| c != JOIN_SEPARATOR).collect();
        if let Some(filter) = &self.filter {
            if !filter(&word, cost) {
                return self;
            }
        }
        match self.sugs.get_mut(&word) {
            Some(known) => {
                if cost < *known {
                    *known = cost;
                }
            }
            None => {
                self.sugs.insert(word, cost);
                if cost < self.max_cost && self.sugs.len() > self.num_suggestions {
                    self.drop_max();
                }
            }
        }
        self
    }

    /// Extra cost for short words and for every word after the first.
    fn word_cost_adjustment(&self, word: &str) -> Cost {
        let lengths = &self.weights.word_length;
        let mut words = 0;
        let mut cost = 0;
        for part in word.split(is_separator) {
            words += 1;
            cost += lengths.get(part.chars().count()).copied().unwrap_or(0);
        }
        cost + (words - 1) * self.weights.extra_word
    }

    fn drop_max(&mut self) {
        if self.num_suggestions == 0 {
            self.sugs.clear();
            return;
        }
        let sorted = self.sorted();
        let last = self.num_suggestions - 1;
        let Some(cutoff) = sorted.get(last).map(|s| s.cost) else {
            return;
        };
        self.max_cost = cutoff;
        for s in &sorted[last + 1..] {
            if s.cost > cutoff {
                self.sugs.remove(&s.word);
            }
        }
    }

    fn sorted(&self) -> Vec<SuggestionResult> {
        let mut sorted: Vec<SuggestionResult> = self
            .sugs
            .iter()
            .map(|(word, &cost)| SuggestionResult::new(word.clone(), cost))
            .collect();
        sorted.sort_by(compare_results);
        sorted
    }

    /// The suggestions, cheapest first.
    pub fn suggestions(&self) -> Vec<SuggestionResult> {
        let mut sorted = self.sorted();
        if !self.include_ties {
            sorted.truncate(self.num_suggestions);
        }
        sorted
    }
}

/// Cheaper first, then shorter, then in character order.
pub fn compare_results(a: &SuggestionResult, b: &SuggestionResult) -> Ordering {
    a.cost
        .cmp(&b.cost)
        .then_with(|| a.word.chars().count().cmp(&b.word.chars().count()))
        .then_with(|| a.word.cmp(&b.word))
}
