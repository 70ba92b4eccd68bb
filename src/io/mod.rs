//! Text serialization of tries.
//!
//! ```text
//! #!/usr/bin/env cspell-trie reader
//! TrieXv4
//! base=10
//! # Data:
//! __DATA__
//! [12,40]
//! ab$c$2...
//! ```
//!
//! Literal characters walk down, `$` ends a word and steps up, `<` steps up,
//! an optional digit after either gives the total number of levels. `#n;`
//! reuses the subtree emitted as node `n`, `@n;` the node stored at position
//! `n` of the reference index. `\` escapes the next character.

mod export;
mod import;

use serde::{Deserialize, Serialize};

pub use export::{serialize_node, serialize_trie};
pub use import::{import_trie, import_trie_with_options};

pub(crate) const HEADER_SHEBANG: &str = "#!/usr/bin/env cspell-trie reader";
pub(crate) const DATA_MARKER: &str = "__DATA__";

pub(crate) const EOW: char = '$';
pub(crate) const BACK: char = '<';
pub(crate) const REF: char = '#';
pub(crate) const REF_INDEX: char = '@';
pub(crate) const REF_END: char = ';';
pub(crate) const ESCAPE: char = '\\';
pub(crate) const COMMENT: char = '/';

/// Characters written with a leading escape.
const SPECIAL: &str = "$<#@;\\/[]\n\r0123456789";

pub(crate) fn escape(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        c if SPECIAL.contains(c) => format!("{ESCAPE}{c}"),
        c => c.to_string(),
    }
}

pub(crate) fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        c => c,
    }
}

pub(crate) fn to_radix(mut n: usize, radix: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        let d = (n % radix as usize) as u32;
        digits.push(char::from_digit(d, radix).unwrap_or('0'));
        n /= radix as usize;
    }
    digits.iter().rev().collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Radix of node numbers, clamped to 10..=36.
    pub base: u32,
    /// Written as `#` lines in the header.
    pub comment: String,
    /// Wrap data lines at this many characters; 0 keeps one line per
    /// top-level letter.
    pub line_width: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            base: 10,
            comment: String::new(),
            line_width: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radix_formatting() {
        assert_eq!(to_radix(0, 10), "0");
        assert_eq!(to_radix(255, 16), "ff");
        assert_eq!(to_radix(35, 36), "z");
        assert_eq!(to_radix(1234, 10), "1234");
    }

    #[test]
    fn escaping() {
        assert_eq!(escape('a'), "a");
        assert_eq!(escape('$'), "\\$");
        assert_eq!(escape('7'), "\\7");
        assert_eq!(escape('\n'), "\\n");
        assert_eq!(unescape('n'), '\n');
        assert_eq!(unescape('$'), '$');
    }
}
