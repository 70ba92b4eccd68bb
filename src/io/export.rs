use std::collections::HashMap;

use super::{
    escape, to_radix, ExportOptions, BACK, DATA_MARKER, EOW, HEADER_SHEBANG, REF, REF_END,
    REF_INDEX,
};
use crate::trie::{TrieBlob, TrieNode};

const FORMAT_VERSION: &str = "TrieXv4";
/// Largest step count a single `$n` or `<n` token carries.
const MAX_STEP: usize = 9;

pub fn serialize_trie(blob: &TrieBlob, options: &ExportOptions) -> String {
    serialize_node(blob.root(), options)
}

/// Serializes the trie below `root`. Works for any [`TrieNode`], so a
/// [`crate::trie::NodeGraph`] is written exactly like a blob.
pub fn serialize_node<N: TrieNode>(root: N, options: &ExportOptions) -> String {
    let radix = options.base.clamp(10, 36);
    let refs = reference_map(root, radix);
    let ref_pos: HashMap<usize, usize> = refs.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let mut writer = Writer {
        radix,
        line_width: options.line_width,
        ref_pos: &ref_pos,
        numbers: HashMap::new(),
        out: String::new(),
        line_len: 0,
        pending_eol: false,
        last: EOW,
        count: 0,
    };
    writer.walk(root, 0);
    writer.flush();
    let body = writer.out;

    let index: Vec<String> = refs
        .iter()
        .filter_map(|id| writer.numbers.get(id))
        .map(|&n| to_radix(n, radix))
        .collect();

    let mut out = String::with_capacity(body.len() + 128);
    out.push_str(HEADER_SHEBANG);
    out.push('\n');
    out.push_str(FORMAT_VERSION);
    out.push('\n');
    out.push_str(&format!("base={radix}\n"));
    for line in options.comment.lines() {
        out.push_str(&format!("# {line}\n"));
    }
    out.push_str("# Data:\n");
    out.push_str(DATA_MARKER);
    out.push('\n');
    out.push('[');
    out.push_str(&index.join(","));
    out.push_str("]\n");
    out.push_str(&body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    log::debug!(
        "serialized trie: {} nodes numbered, {} indexed references",
        writer.numbers.len(),
        index.len()
    );
    out
}

/// Nodes worth an entry in the reference index, most referenced first.
///
/// A node qualifies when at least two parents share it and writing `@i;`
/// instead of `#n;` saves more than the index entry costs.
fn reference_map<N: TrieNode>(root: N, radix: u32) -> Vec<usize> {
    fn visit<N: TrieNode>(node: N, seen: &mut HashMap<usize, (usize, usize)>) {
        for i in 0..node.size() {
            let Some(child) = node.child(i) else { continue };
            if !child.has_children() {
                continue;
            }
            match seen.get_mut(&child.id()) {
                Some(entry) => entry.0 += 1,
                None => {
                    // +1: the root is node 0
                    let order = seen.len() + 1;
                    seen.insert(child.id(), (1, order));
                    visit(child, seen);
                }
            }
        }
    }

    let mut seen = HashMap::new();
    visit(root, &mut seen);

    let mut candidates: Vec<(usize, usize, usize)> = seen
        .into_iter()
        .filter(|&(_, (count, _))| count >= 2)
        .map(|(id, (count, order))| (id, count, order))
        .collect();
    candidates.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let digits = |n: usize| to_radix(n, radix).len() as isize;
    let mut refs = Vec::new();
    for (id, count, order) in candidates {
        let idx_digits = digits(refs.len());
        let num_digits = digits(order);
        let savings = count as isize * (num_digits - idx_digits) - (num_digits + 1);
        if savings > 0 {
            refs.push(id);
        }
    }
    refs
}

struct Writer<'r> {
    radix: u32,
    line_width: usize,
    ref_pos: &'r HashMap<usize, usize>,
    /// Node id to emitted node number.
    numbers: HashMap<usize, usize>,
    out: String,
    line_len: usize,
    pending_eol: bool,
    /// Pending step token (`$` or `<`) and how many levels it covers.
    last: char,
    count: usize,
}

impl Writer<'_> {
    fn walk<N: TrieNode>(&mut self, node: N, depth: usize) {
        if let Some(&number) = self.numbers.get(&node.id()) {
            let token = match self.ref_pos.get(&node.id()) {
                Some(&pos) => format!("{REF_INDEX}{}{REF_END}", to_radix(pos, self.radix)),
                None => format!("{REF}{}{REF_END}", to_radix(number, self.radix)),
            };
            self.token(&token);
            return;
        }
        if node.has_children() {
            let number = self.numbers.len();
            self.numbers.insert(node.id(), number);
            for i in 0..node.size() {
                if let (Some(c), Some(child)) = (node.key(i), node.child(i)) {
                    self.token(&escape(c));
                    self.walk(child, depth + 1);
                    self.back();
                    if depth == 0 {
                        self.pending_eol = true;
                    }
                }
            }
        }
        if node.eow() {
            self.eow();
        }
    }

    fn eow(&mut self) {
        self.flush();
        self.last = EOW;
        self.count = 0;
    }

    fn back(&mut self) {
        self.count += 1;
    }

    /// Writes pending steps, then `token`. A new top-level letter starts a
    /// new line.
    fn token(&mut self, token: &str) {
        self.flush();
        if self.pending_eol {
            self.newline();
        }
        self.push(token);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.line_len = 0;
        self.pending_eol = false;
    }

    /// Writes the pending steps, at most nine levels per token.
    fn flush(&mut self) {
        while self.count > 0 {
            let n = self.count.min(MAX_STEP);
            let token = if n > 1 {
                format!("{}{}", self.last, n)
            } else {
                self.last.to_string()
            };
            self.push(&token);
            self.last = BACK;
            self.count -= n;
        }
    }

    fn push(&mut self, token: &str) {
        let len = token.chars().count();
        if self.line_width > 0 && self.line_len > 0 && self.line_len + len > self.line_width {
            self.newline();
        }
        self.out.push_str(token);
        self.line_len += len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::{NodeGraph, TrieBlobBuilder};

    fn data(text: &str) -> String {
        let (_, data) = text.split_once("__DATA__\n").unwrap();
        data.to_string()
    }

    #[test]
    fn simple_words() {
        let blob = TrieBlobBuilder::from_words(["ab", "a"]).build();
        let text = serialize_trie(&blob, &ExportOptions::default());
        assert!(text.starts_with(HEADER_SHEBANG));
        assert!(text.contains("\nTrieXv4\nbase=10\n"));
        assert_eq!(data(&text), "[]\nab$$\n");
    }

    #[test]
    fn long_steps_are_split() {
        let blob = TrieBlobBuilder::from_words(["abcdefghijkl"]).build();
        let text = serialize_trie(&blob, &ExportOptions::default());
        assert_eq!(data(&text), "[]\nabcdefghijkl$9<3\n");
    }

    #[test]
    fn shared_subtrees_become_references() {
        let blob = TrieBlobBuilder::from_words(["xab", "xac", "yab", "yac"]).build();
        let text = serialize_trie(&blob, &ExportOptions::default());
        // 'x' and 'y' lead to the same node, numbered 1
        assert!(data(&text).contains("#1;"), "{text}");
    }

    #[test]
    fn special_characters_are_escaped() {
        let blob = TrieBlobBuilder::from_words(["a$1"]).build();
        let text = serialize_trie(&blob, &ExportOptions::default());
        assert_eq!(data(&text), "[]\na\\$\\1$3\n");
    }

    #[test]
    fn line_width_wraps_between_tokens() {
        let blob = TrieBlobBuilder::from_words(["abcdefghijkl"]).build();
        let options = ExportOptions {
            line_width: 5,
            ..ExportOptions::default()
        };
        let body = data(&serialize_trie(&blob, &options));
        for line in body.lines().skip(1) {
            assert!(line.chars().count() <= 5, "{line}");
        }
        assert!(body.contains("$9"));
    }

    #[test]
    fn comments_go_to_the_header() {
        let blob = TrieBlobBuilder::from_words(["a"]).build();
        let options = ExportOptions {
            comment: "first\nsecond".to_string(),
            ..ExportOptions::default()
        };
        let text = serialize_trie(&blob, &options);
        assert!(text.contains("# first\n# second\n"));
    }

    #[test]
    fn graphs_serialize_like_blobs() {
        let words = ["car", "cart", "dog"];
        let graph = NodeGraph::from_words(words);
        let blob = TrieBlobBuilder::from_words(words).build();
        assert_eq!(
            serialize_node(graph.root(), &ExportOptions::default()),
            serialize_trie(&blob, &ExportOptions::default())
        );
    }
}
