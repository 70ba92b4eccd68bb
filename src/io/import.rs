use lazy_static::lazy_static;
use regex::Regex;

use super::{unescape, BACK, COMMENT, DATA_MARKER, EOW, ESCAPE, REF, REF_END, REF_INDEX};
use crate::error::{Result, TrieError};
use crate::trie::{BuilderCursor, TrieBlob, TrieBlobBuilder, TrieOptions};

lazy_static! {
    static ref HEADER_VERSION: Regex = Regex::new(r"^TrieXv(\d+)$").unwrap();
    static ref HEADER_BASE: Regex = Regex::new(r"^base=(\d+)$").unwrap();
}

pub fn import_trie(text: &str) -> Result<TrieBlob> {
    import_trie_with_options(text, TrieOptions::default())
}

/// Reads the text produced by [`super::serialize_trie`]. Both the `TrieXv3`
/// and the `TrieXv4` layouts are accepted.
pub fn import_trie_with_options(text: &str, options: TrieOptions) -> Result<TrieBlob> {
    let mut version = None;
    let mut radix = 10;
    let mut data_start = None;
    let mut line_no = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        line_no += 1;
        offset += line.len();
        let line = line.trim();
        if line == DATA_MARKER {
            data_start = Some(offset);
            break;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(caps) = HEADER_VERSION.captures(line) {
            version = caps[1].parse::<u32>().ok();
        } else if let Some(caps) = HEADER_BASE.captures(line) {
            radix = caps[1]
                .parse::<u32>()
                .ok()
                .filter(|r| (2..=36).contains(r))
                .ok_or_else(|| TrieError::UnknownFormat(format!("unsupported base: {line}")))?;
        } else {
            log::debug!("ignoring header line {line_no}: {line}");
        }
    }

    let version = match version {
        Some(v @ (3 | 4)) => v,
        Some(v) => return Err(TrieError::UnknownFormat(format!("TrieXv{v}"))),
        None => return Err(TrieError::UnknownFormat("missing TrieXv header".to_string())),
    };
    let data_start = data_start
        .ok_or_else(|| TrieError::UnknownFormat(format!("missing {DATA_MARKER} marker")))?;

    let mut builder = TrieBlobBuilder::new(options);
    {
        let mut parser = Parser {
            cursor: builder.cursor(),
            radix,
            ref_index: Vec::new(),
            state: if version >= 4 { State::Start } else { State::Main },
        };
        let mut line = line_no + 1;
        let mut column = 0;
        for c in text[data_start..].chars() {
            column += 1;
            parser
                .feed(c)
                .map_err(|message| TrieError::parse(line, column, message))?;
            if c == '\n' {
                line += 1;
                column = 0;
            }
        }
        parser
            .finish()
            .map_err(|message| TrieError::parse(line, column, message))?;
    }
    Ok(builder.build())
}

enum State {
    /// Before the first data character; a `[` opens the reference index.
    Start,
    Index(String),
    Main,
    /// After `$` or `<`; a digit here is a step count.
    Back,
    Ref { indexed: bool, digits: String },
    Escape,
    Comment,
}

struct Parser<'b> {
    cursor: BuilderCursor<'b>,
    radix: u32,
    ref_index: Vec<usize>,
    state: State,
}

type Step = std::result::Result<(), String>;

impl Parser<'_> {
    fn feed(&mut self, c: char) -> Step {
        match std::mem::replace(&mut self.state, State::Main) {
            State::Start if c.is_whitespace() => {
                self.state = State::Start;
                Ok(())
            }
            State::Start if c == '[' => {
                self.state = State::Index(String::new());
                Ok(())
            }
            State::Index(text) if c == ']' => {
                self.ref_index = self.parse_index(&text)?;
                Ok(())
            }
            State::Index(mut text) => {
                text.push(c);
                self.state = State::Index(text);
                Ok(())
            }
            State::Back => match c.to_digit(10) {
                Some(d @ 2..=9) => self.step_up(d as usize - 1),
                _ => self.main(c),
            },
            State::Ref { indexed, digits } if c == REF_END => self.reference(indexed, &digits),
            State::Ref { indexed, mut digits } if c.is_digit(self.radix) => {
                digits.push(c);
                self.state = State::Ref { indexed, digits };
                Ok(())
            }
            State::Ref { indexed, digits } => {
                self.reference(indexed, &digits)?;
                self.main(c)
            }
            State::Escape => {
                self.cursor.insert_char(unescape(c));
                Ok(())
            }
            State::Comment => {
                if c != COMMENT {
                    self.state = State::Comment;
                }
                Ok(())
            }
            State::Start | State::Main => self.main(c),
        }
    }

    fn main(&mut self, c: char) -> Step {
        match c {
            EOW => {
                if self.cursor.depth() == 0 {
                    return Err("end of word at the root".to_string());
                }
                self.cursor.mark_eow();
                self.step_up(1)?;
                self.state = State::Back;
            }
            BACK => {
                self.step_up(1)?;
                self.state = State::Back;
            }
            REF | REF_INDEX => {
                self.state = State::Ref {
                    indexed: c == REF_INDEX,
                    digits: String::new(),
                };
            }
            ESCAPE => self.state = State::Escape,
            COMMENT => self.state = State::Comment,
            '\n' | '\r' => {}
            c => self.cursor.insert_char(c),
        }
        Ok(())
    }

    fn step_up(&mut self, n: usize) -> Step {
        if n > self.cursor.depth() {
            return Err(format!(
                "cannot step up {n} levels from depth {}",
                self.cursor.depth()
            ));
        }
        self.cursor.back_step(n);
        Ok(())
    }

    fn reference(&mut self, indexed: bool, digits: &str) -> Step {
        let n = usize::from_str_radix(digits, self.radix)
            .map_err(|_| format!("invalid reference {digits:?}"))?;
        let ref_id = if indexed {
            *self
                .ref_index
                .get(n)
                .ok_or_else(|| format!("reference index {n} out of range"))?
        } else {
            n
        };
        self.cursor.check_reference(ref_id)?;
        self.cursor.reference(ref_id);
        Ok(())
    }

    fn parse_index(&self, text: &str) -> std::result::Result<Vec<usize>, String> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                usize::from_str_radix(s, self.radix)
                    .map_err(|_| format!("invalid reference index entry {s:?}"))
            })
            .collect()
    }

    fn finish(&mut self) -> Step {
        match std::mem::replace(&mut self.state, State::Main) {
            State::Ref { indexed, digits } => self.reference(indexed, &digits),
            State::Escape => Err("dangling escape at end of data".to_string()),
            State::Comment => Err("unterminated comment".to_string()),
            State::Index(_) => Err("unterminated reference index".to_string()),
            State::Start | State::Main | State::Back => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{serialize_trie, ExportOptions};

    const HEADER_V3: &str =
        "#!/usr/bin/env cspell-trie reader\nTrieXv3\nbase=10\n# Data:\n__DATA__\n";

    fn words(blob: &TrieBlob) -> Vec<String> {
        blob.words().collect()
    }

    #[test]
    fn reads_steps_and_counts() {
        let text = format!("{HEADER_V3}ab$c$2d$\n");
        let blob = import_trie(&text).unwrap();
        assert_eq!(words(&blob), vec!["ab", "ac", "d"]);
    }

    #[test]
    fn reads_references() {
        // node 1 is 'x', reused under 'y'
        let text = format!("{HEADER_V3}xa$b$2y#1;<\n");
        let blob = import_trie(&text).unwrap();
        assert_eq!(words(&blob), vec!["xa", "xb", "ya", "yb"]);
    }

    #[test]
    fn reads_indexed_references() {
        let text = "TrieXv4\nbase=10\n__DATA__\n[1]\nxa$b$2y@0;<\n";
        let blob = import_trie(text).unwrap();
        assert_eq!(words(&blob), vec!["xa", "xb", "ya", "yb"]);
    }

    #[test]
    fn reads_escapes_and_comments() {
        let text = format!("{HEADER_V3}a\\$\\1$3/ a comment /b$\n");
        let blob = import_trie(&text).unwrap();
        assert_eq!(words(&blob), vec!["a$1", "b"]);
    }

    #[test]
    fn other_radix() {
        let words_in: Vec<String> = (0..40).map(|i| format!("w{i:02}x")).collect();
        let blob = TrieBlobBuilder::from_words(&words_in).build();
        let options = ExportOptions {
            base: 16,
            ..ExportOptions::default()
        };
        let text = serialize_trie(&blob, &options);
        assert!(text.contains("base=16"));
        assert_eq!(words(&import_trie(&text).unwrap()), words_in);
    }

    #[test]
    fn unknown_format() {
        assert!(matches!(
            import_trie("TrieXv9\n__DATA__\n"),
            Err(TrieError::UnknownFormat(_))
        ));
        assert!(matches!(import_trie("hello"), Err(TrieError::UnknownFormat(_))));
        assert!(matches!(import_trie("TrieXv3\nab$"), Err(TrieError::UnknownFormat(_))));
    }

    #[test]
    fn errors_carry_a_position() {
        // "ab$" leaves the cursor at depth 1, so the third '<' climbs past the root
        let text = "TrieXv3\n__DATA__\nab$\nc<<<";
        match import_trie(text) {
            Err(TrieError::Parse { line, column, .. }) => {
                assert_eq!(line, 4);
                assert_eq!(column, 4);
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn bad_references_are_errors() {
        assert!(import_trie("TrieXv3\n__DATA__\nab#9;").is_err());
        assert!(import_trie("TrieXv3\n__DATA__\nab#0;").is_err());
        assert!(import_trie("TrieXv4\n__DATA__\n[]\nab@0;").is_err());
        assert!(import_trie("TrieXv3\n__DATA__\nab\\").is_err());
    }

    #[test]
    fn empty_data() {
        let blob = import_trie("TrieXv4\n__DATA__\n[]\n").unwrap();
        assert_eq!(blob.num_nodes(), 1);
    }
}
