pub mod tokenizer;

use std::fs;
use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use regex::Regex;

use crate::suggest::SuggestOptions;
use crate::trie::Trie;
use crate::{CheckResult, Config, SpellError};
use tokenizer::Token;

/// Checks text against a [`Trie`] dictionary.
pub struct SpellChecker {
    trie: Trie,
    ignore_patterns: Vec<Regex>,
    suggest: SuggestOptions,
    case_sensitive: bool,
}

impl SpellChecker {
    pub fn new(trie: Trie, config: &Config) -> Self {
        let mut ignore_patterns = Vec::new();
        for pattern in &config.ignore_patterns {
            match Regex::new(pattern) {
                Ok(re) => ignore_patterns.push(re),
                Err(e) => log::warn!("invalid ignore pattern '{}': {}", pattern, e),
            }
        }

        Self {
            trie,
            ignore_patterns,
            suggest: config.suggest.clone(),
            case_sensitive: config.case_sensitive,
        }
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// `true` if `word` is spelled correctly.
    ///
    /// Without case sensitivity a capitalized word is also accepted when its
    /// lower case form is in the dictionary.
    pub fn is_correct(&self, word: &str) -> bool {
        if self.trie.has_word(word, self.case_sensitive) {
            return true;
        }
        if self.case_sensitive {
            return false;
        }
        let lower = word.to_lowercase();
        lower != word && self.trie.has_word(&lower, false)
    }

    /// Checks a single token; `None` if it is fine.
    pub fn check_token(&self, token: &Token) -> Option<SpellError> {
        let forbidden = self.trie.is_forbidden_word(&token.text);
        if !forbidden && self.is_correct(&token.text) {
            return None;
        }
        Some(SpellError {
            word: token.text.clone(),
            line: token.line,
            column: token.column,
            context: token.context.clone(),
            forbidden,
            suggestions: self.trie.suggest(&token.text, &self.suggest),
        })
    }

    pub fn check_text(&self, content: &str) -> CheckResult {
        let lines: Vec<&str> = content.lines().collect();
        let ignored: Vec<Vec<Range<usize>>> = lines
            .iter()
            .map(|line| self.ignored_ranges(line))
            .collect();

        let tokens: Vec<Token> = tokenizer::tokenize(content)
            .into_iter()
            .filter(|t| {
                let start = t.column - 1;
                !ignored[t.line - 1].iter().any(|r| r.contains(&start))
            })
            .collect();

        log::debug!("checking {} words", tokens.len());

        let errors: Vec<SpellError> = tokens
            .par_iter()
            .filter_map(|t| self.check_token(t))
            .collect();

        CheckResult {
            error_count: errors.len(),
            errors,
        }
    }

    pub fn check_file(&self, file_path: &Path) -> Result<CheckResult> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;
        Ok(self.check_text(&content))
    }

    /// Byte ranges of `line` covered by an ignore pattern.
    fn ignored_ranges(&self, line: &str) -> Vec<Range<usize>> {
        self.ignore_patterns
            .iter()
            .flat_map(|re| re.find_iter(line).map(|m| m.range()))
            .collect()
    }

    pub fn should_ignore(&self, word: &str) -> bool {
        self.ignore_patterns.iter().any(|re| re.is_match(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(words: &[&str]) -> SpellChecker {
        SpellChecker::new(Trie::from_words(words), &Config::default())
    }

    #[test]
    fn finds_misspelled_words() {
        let checker = checker(&["the", "quick", "brown", "fox"]);
        let result = checker.check_text("the quikc brown fox");
        assert_eq!(result.error_count, 1);
        let error = &result.errors[0];
        assert_eq!(error.word, "quikc");
        assert_eq!((error.line, error.column), (1, 5));
        assert_eq!(error.suggestions.first().map(String::as_str), Some("quick"));
    }

    #[test]
    fn capitalized_words_match_lower_case_entries() {
        let checker = checker(&["hello"]);
        assert!(checker.is_correct("Hello"));
        assert!(!checker.is_correct("Hallo"));
    }

    #[test]
    fn case_sensitive_mode() {
        let config = Config {
            case_sensitive: true,
            ..Config::default()
        };
        let checker = SpellChecker::new(Trie::from_words(["hello"]), &config);
        assert!(!checker.is_correct("Hello"));
        assert!(checker.is_correct("hello"));
    }

    #[test]
    fn forbidden_words_are_reported() {
        let checker = checker(&["colour", "color", "!colour"]);
        let result = checker.check_text("colour");
        assert_eq!(result.error_count, 1);
        assert!(result.errors[0].forbidden);
        assert!(result.errors[0].suggestions.contains(&"color".to_string()));
    }

    #[test]
    fn ignore_patterns_cover_urls() {
        let checker = checker(&["see"]);
        let result = checker.check_text("see https://exmaple.org/pathh");
        assert_eq!(result.error_count, 0);
    }

    #[test]
    fn invalid_patterns_are_skipped() {
        let config = Config {
            ignore_patterns: vec!["[".to_string(), "^zz".to_string()],
            ..Config::default()
        };
        let checker = SpellChecker::new(Trie::from_words(["ok"]), &config);
        assert!(checker.should_ignore("zzz"));
        assert!(!checker.should_ignore("ok"));
    }

    #[test]
    fn check_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "one\ntwo thre\n").unwrap();
        let result = checker(&["one", "two", "three"]).check_file(&path).unwrap();
        assert_eq!(result.error_count, 1);
        assert_eq!(result.errors[0].line, 2);
        assert_eq!(result.errors[0].column, 5);
    }
}
