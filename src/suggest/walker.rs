use crate::trie::{BlobNode, TrieBlob, TrieNode};

use super::CompoundMethod;

/// A node as the walker sees it. Roots hide their special-prefix children
/// and never end a word.
#[derive(Clone, Copy, Debug)]
struct WalkNode<'a> {
    node: BlobNode<'a>,
    is_root: bool,
}

#[derive(Clone, Copy, Debug)]
struct Entry<'a> {
    letter: char,
    node: WalkNode<'a>,
    hint_offset: usize,
}

#[derive(Debug)]
struct Level<'a> {
    entries: Vec<Entry<'a>>,
    pos: usize,
}

/// One node visited by [`HintedWalker`].
#[derive(Clone, Copy, Debug)]
pub struct WalkerStep<'a> {
    /// Index of `letter` in the walker's text.
    pub depth: usize,
    pub letter: char,
    pub node: BlobNode<'a>,
}

impl WalkerStep<'_> {
    pub fn eow(&self) -> bool {
        self.node.eow()
    }
}

/// Depth-first walker that tries the letters of a hint word first.
///
/// At each level the children matching the next few hint letters (and the
/// two before them) are visited before the rest, so close candidates are
/// found early and the cost limit drops quickly. Parts of stored compounds
/// are followed transparently, and with a [`CompoundMethod`] a word end can
/// be followed by a separator and a fresh word.
pub struct HintedWalker<'a> {
    hint: Vec<char>,
    compound_character: char,
    special: [char; 3],
    roots: Vec<WalkNode<'a>>,
    compound_roots: Vec<BlobNode<'a>>,
    /// Where a separator edge leads.
    method_roots: Vec<(char, WalkNode<'a>)>,
    next_root: usize,
    stack: Vec<Level<'a>>,
    text: Vec<char>,
    last: Option<Entry<'a>>,
}

impl<'a> HintedWalker<'a> {
    pub fn new(
        blob: &'a TrieBlob,
        hint: &str,
        compound_method: CompoundMethod,
        ignore_case: bool,
    ) -> Self {
        let options = blob.options();
        let root = blob.root();
        let mut raw_roots = vec![root];
        if ignore_case {
            if let Some(r) = root.get(options.strip_case_and_accents_prefix) {
                raw_roots.push(r);
            }
        }
        let compound_roots: Vec<BlobNode<'a>> = raw_roots
            .iter()
            .filter_map(|r| r.get(options.compound_character))
            .collect();
        let roots: Vec<WalkNode<'a>> = raw_roots
            .iter()
            .map(|&node| WalkNode { node, is_root: true })
            .collect();
        let method_roots = match compound_method.separator() {
            Some(sep) => roots
                .iter()
                .copied()
                .chain(compound_roots.iter().map(|&node| WalkNode { node, is_root: false }))
                .map(|n| (sep, n))
                .collect(),
            None => Vec::new(),
        };

        Self {
            hint: hint.chars().collect(),
            compound_character: options.compound_character,
            special: options.special_prefixes(),
            roots,
            compound_roots,
            method_roots,
            next_root: 0,
            stack: Vec::new(),
            text: Vec::new(),
            last: None,
        }
    }

    /// Letters from the root to the node returned last.
    pub fn text(&self) -> &[char] {
        &self.text
    }

    /// Moves to the next node. With `go_deeper = false` the children of the
    /// previously returned node are skipped.
    pub fn next(&mut self, go_deeper: bool) -> Option<WalkerStep<'a>> {
        if let Some(last) = self.last.take() {
            if go_deeper {
                let entries = self.children(last.node, last.hint_offset);
                self.stack.push(Level { entries, pos: 0 });
            }
        }
        loop {
            let Some(level) = self.stack.last_mut() else {
                let root = *self.roots.get(self.next_root)?;
                self.next_root += 1;
                let entries = self.children(root, 0);
                self.stack.push(Level { entries, pos: 0 });
                continue;
            };
            let Some(&entry) = level.entries.get(level.pos) else {
                self.stack.pop();
                continue;
            };
            level.pos += 1;
            let depth = self.stack.len() - 1;
            self.text.truncate(depth);
            self.text.push(entry.letter);
            self.last = Some(entry);
            return Some(WalkerStep {
                depth,
                letter: entry.letter,
                node: entry.node.node,
            });
        }
    }

    fn is_hidden(&self, n: WalkNode<'a>, c: char) -> bool {
        c == self.compound_character || (n.is_root && self.special.contains(&c))
    }

    fn children(&self, n: WalkNode<'a>, hint_offset: usize) -> Vec<Entry<'a>> {
        let node = n.node;
        let mut entries = Vec::with_capacity(node.size());

        if node.has_children() {
            let ahead = self.hint.iter().skip(hint_offset).take(3);
            let end = hint_offset.min(self.hint.len());
            let behind = self.hint[end.saturating_sub(2)..end].iter();
            let mut hints: Vec<char> = Vec::with_capacity(5);
            for &h in ahead.chain(behind) {
                if !hints.contains(&h) {
                    hints.push(h);
                }
            }

            for &h in &hints {
                if self.is_hidden(n, h) {
                    continue;
                }
                if let Some(child) = node.get(h) {
                    entries.push(Entry {
                        letter: h,
                        node: WalkNode { node: child, is_root: false },
                        hint_offset: hint_offset + 1,
                    });
                }
            }
            for i in 0..node.size() {
                if let (Some(c), Some(child)) = (node.key(i), node.child(i)) {
                    if hints.contains(&c) || self.is_hidden(n, c) {
                        continue;
                    }
                    entries.push(Entry {
                        letter: c,
                        node: WalkNode { node: child, is_root: false },
                        hint_offset: hint_offset + 1,
                    });
                }
            }

            // A word that continues as a compound: carry on in the parts
            // that may follow it, without emitting the marker.
            if !n.is_root
                && node.has(self.compound_character)
                && !self.compound_roots.contains(&node)
            {
                for &part_root in &self.compound_roots {
                    let part = WalkNode { node: part_root, is_root: false };
                    entries.extend(self.children(part, hint_offset));
                }
            }
        }

        if node.eow() && !n.is_root {
            for &(sep, root) in &self.method_roots {
                entries.push(Entry {
                    letter: sep,
                    node: root,
                    hint_offset,
                });
            }
        }

        entries
    }
}
