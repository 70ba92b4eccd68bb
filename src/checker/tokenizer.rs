use unicode_segmentation::UnicodeSegmentation;

/// A word found in text, with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub context: String,
}

/// Extract the words of `content`, line by line.
///
/// A word is a run of letters, apostrophes and hyphens; camelCase and
/// snake_case runs are split into their parts. One-letter parts are dropped.
pub fn tokenize(content: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        for (word, column) in extract_words(line) {
            tokens.push(Token {
                context: get_context(line, column, word.len()),
                text: word,
                line: line_num + 1,
                column: column + 1,
            });
        }
    }

    tokens
}

fn extract_words(text: &str) -> Vec<(String, usize)> {
    let mut words = Vec::new();
    let mut current_word = String::new();
    let mut word_start = 0;
    let mut current_pos = 0;

    for grapheme in text.graphemes(true) {
        let ch = grapheme.chars().next().unwrap_or(' ');

        if ch.is_alphabetic() || ch == '\'' || ch == '-' || ch == '_' {
            if current_word.is_empty() {
                word_start = current_pos;
            }
            current_word.push_str(grapheme);
        } else if !current_word.is_empty() {
            push_parts(&mut words, &current_word, word_start);
            current_word.clear();
        }

        current_pos += grapheme.len();
    }

    if !current_word.is_empty() {
        push_parts(&mut words, &current_word, word_start);
    }

    words
}

fn push_parts(words: &mut Vec<(String, usize)>, word: &str, start: usize) {
    for (part, offset) in split_compound_word(word) {
        let trimmed = part.trim_start_matches('\'');
        let shift = part.len() - trimmed.len();
        let trimmed = trimmed.trim_end_matches('\'');
        if trimmed.chars().count() > 1 {
            words.push((trimmed.to_string(), start + offset + shift));
        }
    }
}

/// Split camelCase, snake_case and kebab-case into parts with their byte offsets.
pub fn split_compound_word(word: &str) -> Vec<(String, usize)> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_start = 0;
    let mut prev_lower = false;

    for (pos, ch) in word.char_indices() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                result.push((std::mem::take(&mut current), current_start));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            result.push((std::mem::take(&mut current), current_start));
        }
        if current.is_empty() {
            current_start = pos;
        }
        current.push(ch);
        prev_lower = ch.is_lowercase();
    }

    if !current.is_empty() {
        result.push((current, current_start));
    }

    result
}

fn get_context(line: &str, start: usize, len: usize) -> String {
    const CONTEXT_CHARS: usize = 30;

    let mut from = start.saturating_sub(CONTEXT_CHARS);
    while !line.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (start + len + CONTEXT_CHARS).min(line.len());
    while !line.is_char_boundary(to) {
        to += 1;
    }
    line[from..to].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_compound_splitting() {
        let parts = |w: &str| -> Vec<String> {
            split_compound_word(w).into_iter().map(|(p, _)| p).collect()
        };
        assert_eq!(parts("camelCase"), vec!["camel", "Case"]);
        assert_eq!(parts("snake_case"), vec!["snake", "case"]);
        assert_eq!(parts("kebab-case"), vec!["kebab", "case"]);
        assert_eq!(parts("HTML"), vec!["HTML"]);
    }

    #[test]
    fn positions_are_one_based() {
        let tokens = tokenize("hello world\n  again");
        assert_eq!(tokens.len(), 3);
        assert_eq!((tokens[1].line, tokens[1].column), (1, 7));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    }

    #[test]
    fn skips_numbers_and_single_letters() {
        assert_eq!(words("a 42 x-ray I'm"), vec!["ray", "I'm"]);
    }

    #[test]
    fn camel_case_parts_keep_their_column() {
        let tokens = tokenize("let parseTree");
        assert_eq!(tokens[1].text, "parse");
        assert_eq!(tokens[2].text, "Tree");
        assert_eq!(tokens[2].column, 10);
    }

    #[test]
    fn quoted_words_point_past_the_quote() {
        let line = "say 'hello' now";
        let tokens = tokenize(line);
        assert_eq!(tokens[1].text, "hello");
        assert_eq!(tokens[1].column, 6);
        assert_eq!(&line[tokens[1].column - 1..][..5], "hello");
        assert_eq!(tokens[1].context, line);
    }

    #[test]
    fn unicode_words() {
        assert_eq!(words("naïve café"), vec!["naïve", "café"]);
    }
}
