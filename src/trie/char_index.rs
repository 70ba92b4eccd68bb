use std::collections::HashMap;

/// Placeholder stored in slot 0, which never maps back to a character.
const RESERVED: char = '\0';

/// Grows the character table while a trie is being built.
///
/// Codes are handed out on first sight and never change afterwards.
/// Code 0 is reserved and is never assigned to a character.
#[derive(Clone, Debug)]
pub struct CharIndexBuilder {
    chars: Vec<char>,
    codes: HashMap<char, u32>,
}

impl Default for CharIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CharIndexBuilder {
    pub fn new() -> Self {
        Self {
            chars: vec![RESERVED],
            codes: HashMap::new(),
        }
    }

    /// Returns the code of `c`, assigning the next free code if `c` is new.
    pub fn code_for(&mut self, c: char) -> u32 {
        if let Some(&code) = self.codes.get(&c) {
            return code;
        }
        let code = self.chars.len() as u32;
        self.chars.push(c);
        self.codes.insert(c, code);
        code
    }

    /// Encodes every character of `word`, growing the table as needed.
    pub fn encode(&mut self, word: &str) -> Vec<u32> {
        word.chars().map(|c| self.code_for(c)).collect()
    }

    /// Looks up a code without assigning one.
    pub fn get(&self, c: char) -> Option<u32> {
        self.codes.get(&c).copied()
    }

    pub fn char_at(&self, code: u32) -> Option<char> {
        match code {
            0 => None,
            _ => self.chars.get(code as usize).copied(),
        }
    }

    /// Number of slots, including the reserved code 0.
    pub fn size(&self) -> usize {
        self.chars.len()
    }

    /// Freezes the mapping.
    pub fn build(self) -> CharIndex {
        CharIndex {
            chars: self.chars,
            codes: self.codes,
        }
    }
}

/// Frozen bidirectional mapping between characters and their codes.
#[derive(Clone, Debug)]
pub struct CharIndex {
    chars: Vec<char>,
    codes: HashMap<char, u32>,
}

impl CharIndex {
    /// Rebuilds an index from its characters in code order, slot 0 excluded.
    ///
    /// Returns `None` when a character appears twice.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Option<Self> {
        let mut builder = CharIndexBuilder::new();
        for c in chars {
            if builder.get(c).is_some() {
                return None;
            }
            builder.code_for(c);
        }
        Some(builder.build())
    }

    #[inline]
    pub fn code(&self, c: char) -> Option<u32> {
        self.codes.get(&c).copied()
    }

    #[inline]
    pub fn char_at(&self, code: u32) -> Option<char> {
        match code {
            0 => None,
            _ => self.chars.get(code as usize).copied(),
        }
    }

    /// Encodes `word`, or `None` if it contains a character the trie never saw.
    pub fn encode(&self, word: &str) -> Option<Vec<u32>> {
        word.chars().map(|c| self.code(c)).collect()
    }

    /// Number of slots, including the reserved code 0.
    pub fn size(&self) -> usize {
        self.chars.len()
    }

    /// Characters in code order, starting with code 1.
    pub fn chars(&self) -> &[char] {
        &self.chars[1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_character_keeps_its_code() {
        let mut builder = CharIndexBuilder::new();
        let codes = builder.encode("banana");
        assert_eq!(codes[1], codes[3]);
        assert_eq!(codes[3], codes[5]);
        assert_eq!(codes[2], codes[4]);
        // b, a, n plus the reserved slot
        assert_eq!(builder.size(), 4);
    }

    #[test]
    fn code_zero_is_reserved() {
        let mut builder = CharIndexBuilder::new();
        let codes = builder.encode("xyz");
        assert!(codes.iter().all(|&c| c != 0));
        assert_eq!(builder.char_at(0), None);
    }

    #[test]
    fn unicode_characters() {
        let mut builder = CharIndexBuilder::new();
        let codes = builder.encode("café 🍎 ж");
        let index = builder.build();
        let decoded: String = codes.iter().filter_map(|&c| index.char_at(c)).collect();
        assert_eq!(decoded, "café 🍎 ж");
        assert_eq!(index.code('🍎'), Some(codes[5]));
    }

    #[test]
    fn frozen_index_rejects_unknown_characters() {
        let mut builder = CharIndexBuilder::new();
        builder.encode("abc");
        let index = builder.build();
        assert!(index.encode("cab").is_some());
        assert!(index.encode("abd").is_none());
    }

    #[test]
    fn from_chars_rejects_duplicates() {
        assert!(CharIndex::from_chars("abc".chars()).is_some());
        assert!(CharIndex::from_chars("abca".chars()).is_none());
    }
}
