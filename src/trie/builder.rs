use std::collections::HashMap;

use super::blob::{pack_edge, TrieBlob, NODE_MASK_EOW};
use super::char_index::CharIndexBuilder;
use super::node::{GraphNodeRef, NodeGraph, TrieNode};
use super::TrieOptions;

const ROOT: usize = 0;

#[derive(Clone, Debug, Default)]
struct BuildNode {
    eow: bool,
    /// Shared with another parent through a reference; copied before any change.
    frozen: bool,
    children: Vec<(u32, usize)>,
}

/// Mutable trie under construction.
///
/// Words go in through [`TrieBlobBuilder::insert`] or a [`BuilderCursor`];
/// [`TrieBlobBuilder::build`] merges identical subtrees and lays the result
/// out as a [`TrieBlob`].
#[derive(Clone, Debug)]
pub struct TrieBlobBuilder {
    options: TrieOptions,
    char_index: CharIndexBuilder,
    nodes: Vec<BuildNode>,
}

impl Default for TrieBlobBuilder {
    fn default() -> Self {
        Self::new(TrieOptions::default())
    }
}

impl TrieBlobBuilder {
    pub fn new(options: TrieOptions) -> Self {
        Self {
            options,
            char_index: CharIndexBuilder::new(),
            nodes: vec![BuildNode::default()],
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::default();
        builder.insert_words(words);
        builder
    }

    /// Builder holding every word of `graph`.
    pub fn from_graph(graph: &NodeGraph, options: TrieOptions) -> Self {
        let mut builder = Self::new(options);
        builder.insert_node(graph.root());
        builder
    }

    fn insert_node(&mut self, root: GraphNodeRef<'_>) {
        fn copy(cursor: &mut BuilderCursor<'_>, node: GraphNodeRef<'_>) {
            for i in 0..node.size() {
                if let (Some(c), Some(child)) = (node.key(i), node.child(i)) {
                    cursor.insert_char(c);
                    if child.eow() {
                        cursor.mark_eow();
                    }
                    copy(cursor, child);
                    cursor.back_step(1);
                }
            }
        }
        let mut cursor = self.cursor();
        copy(&mut cursor, root);
    }

    pub fn options(&self) -> &TrieOptions {
        &self.options
    }

    /// Adds one word. Surrounding whitespace is trimmed and empty words are ignored.
    pub fn insert(&mut self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        let mut cursor = self.cursor();
        for c in word.chars() {
            cursor.insert_char(c);
        }
        cursor.mark_eow();
    }

    /// Adds many words, sharing the prefix each word has with the one before it.
    pub fn insert_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cursor = self.cursor();
        insert_words_at_cursor(&mut cursor, words);
    }

    pub fn has(&self, word: &str) -> bool {
        let mut id = ROOT;
        for c in word.chars() {
            let Some(code) = self.char_index.get(c) else {
                return false;
            };
            match self.child_of(id, code) {
                Some(child) => id = child,
                None => return false,
            }
        }
        self.nodes[id].eow
    }

    /// A cursor positioned at the root.
    pub fn cursor(&mut self) -> BuilderCursor<'_> {
        BuilderCursor {
            builder: self,
            stack: vec![(ROOT, 0)],
            refs: vec![ROOT],
        }
    }

    fn child_of(&self, id: usize, code: u32) -> Option<usize> {
        self.nodes[id]
            .children
            .iter()
            .find(|&&(c, _)| c == code)
            .map(|&(_, child)| child)
    }

    fn add_node(&mut self, node: BuildNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn relink(&mut self, parent: usize, code: u32, child: usize) {
        if let Some(edge) = self.nodes[parent].children.iter_mut().find(|(c, _)| *c == code) {
            edge.1 = child;
        }
    }

    /// Merges identical subtrees and lays the trie out in its compact form.
    ///
    /// Nodes are numbered so that the root is 0 and every edge leads to a
    /// higher index.
    pub fn build(self) -> TrieBlob {
        let char_index = self.char_index.build();

        // Post-order walk assigning each reachable node the id of its
        // structurally identical representative.
        type Signature = (bool, Vec<(char, usize)>);
        let mut canonical: HashMap<usize, usize> = HashMap::new();
        let mut known: HashMap<Signature, usize> = HashMap::new();
        let mut unique: Vec<Signature> = Vec::new();
        let mut stack: Vec<(usize, usize)> = vec![(ROOT, 0)];

        while let Some(&(id, pos)) = stack.last() {
            let children = &self.nodes[id].children;
            if let Some(&(_, child)) = children.get(pos) {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                if !canonical.contains_key(&child) {
                    stack.push((child, 0));
                }
                continue;
            }
            stack.pop();

            let mut edges: Vec<(char, usize)> = children
                .iter()
                .filter_map(|&(code, child)| {
                    let c = char_index.char_at(code)?;
                    canonical.get(&child).map(|&u| (c, u))
                })
                .collect();
            edges.sort_unstable_by_key(|&(c, _)| c);
            let signature = (self.nodes[id].eow, edges);
            let uid = match known.get(&signature) {
                Some(&uid) => uid,
                None => {
                    unique.push(signature.clone());
                    known.insert(signature, unique.len() - 1);
                    unique.len() - 1
                }
            };
            canonical.insert(id, uid);
        }

        // The root is the last unique node; reversing the order makes it 0
        // and turns every child into a later node.
        let last = unique.len() - 1;
        let mut nodes = Vec::with_capacity(unique.len());
        let mut child_start = Vec::with_capacity(unique.len());
        let mut edges = Vec::new();
        for (eow, children) in unique.iter().rev() {
            let mut header = children.len() as u32;
            if *eow {
                header |= NODE_MASK_EOW;
            }
            nodes.push(header);
            child_start.push(edges.len() as u32);
            for &(c, uid) in children {
                let code = char_index.code(c).unwrap_or_default();
                edges.push(pack_edge(code, (last - uid) as u32));
            }
        }

        log::debug!(
            "built trie blob: {} nodes ({} before merging), {} edges",
            nodes.len(),
            self.nodes.len(),
            edges.len()
        );

        TrieBlob::from_parts(nodes, child_start, edges, char_index, self.options)
    }
}

/// Incremental writer over a [`TrieBlobBuilder`].
///
/// The cursor remembers the path from the root, so words that share a prefix
/// can be added by backing up and inserting only the differing suffix. Nodes
/// are numbered in the order they receive their first child, starting with
/// the root as 0; [`BuilderCursor::reference`] uses these numbers.
///
/// Misuse (stepping above the root, referencing an unknown number) panics.
pub struct BuilderCursor<'b> {
    builder: &'b mut TrieBlobBuilder,
    /// (node, code of the edge from its parent)
    stack: Vec<(usize, u32)>,
    refs: Vec<usize>,
}

impl BuilderCursor<'_> {
    /// Number of characters between the root and the cursor.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    fn current(&self) -> usize {
        self.stack[self.stack.len() - 1].0
    }

    /// Makes the current node private to this path before it is changed.
    fn make_writable(&mut self) -> usize {
        let top = self.stack.len() - 1;
        let (id, code) = self.stack[top];
        if !self.builder.nodes[id].frozen {
            return id;
        }
        let mut copy = self.builder.nodes[id].clone();
        copy.frozen = false;
        // The children are now shared by the original and the copy.
        for &(_, child) in &copy.children {
            self.builder.nodes[child].frozen = true;
        }
        let copy_id = self.builder.add_node(copy);
        let parent = self.stack[top - 1].0;
        self.builder.relink(parent, code, copy_id);
        self.stack[top] = (copy_id, code);
        copy_id
    }

    /// Moves to the child reached through `c`, creating it if needed.
    pub fn insert_char(&mut self, c: char) {
        let id = self.make_writable();
        let code = self.builder.char_index.code_for(c);
        let child = match self.builder.child_of(id, code) {
            Some(child) => child,
            None => {
                if self.builder.nodes[id].children.is_empty() && id != ROOT {
                    self.refs.push(id);
                }
                let child = self.builder.add_node(BuildNode::default());
                self.builder.nodes[id].children.push((code, child));
                child
            }
        };
        self.stack.push((child, code));
    }

    /// Marks the current node as the end of a word.
    pub fn mark_eow(&mut self) {
        let id = self.make_writable();
        self.builder.nodes[id].eow = true;
    }

    /// Moves `n` levels back towards the root.
    pub fn back_step(&mut self, n: usize) {
        assert!(n <= self.depth(), "cannot step {n} levels back from depth {}", self.depth());
        self.stack.truncate(self.stack.len() - n);
    }

    /// Number of nodes that can currently be referenced.
    pub fn num_refs(&self) -> usize {
        self.refs.len()
    }

    /// Checks whether [`BuilderCursor::reference`] would accept `ref_id` here.
    pub fn check_reference(&self, ref_id: usize) -> Result<(), String> {
        let Some(&target) = self.refs.get(ref_id) else {
            return Err(format!("unknown node reference {ref_id}"));
        };
        if self.depth() == 0 {
            return Err("a reference cannot replace the root".to_string());
        }
        let current = &self.builder.nodes[self.current()];
        if current.eow || !current.children.is_empty() {
            return Err("a reference must follow a new character".to_string());
        }
        if self.stack.iter().any(|&(id, _)| id == target) {
            return Err(format!("reference {ref_id} points to an enclosing node"));
        }
        Ok(())
    }

    /// Replaces the freshly inserted current node with an existing node.
    ///
    /// The referenced node becomes shared; later changes through either path
    /// copy it first.
    pub fn reference(&mut self, ref_id: usize) {
        if let Err(message) = self.check_reference(ref_id) {
            panic!("{message}");
        }
        let target = self.refs[ref_id];
        let top = self.stack.len() - 1;
        let code = self.stack[top].1;
        let parent = self.stack[top - 1].0;
        self.builder.relink(parent, code, target);
        self.builder.nodes[target].frozen = true;
        self.stack[top] = (target, code);
    }
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Inserts `words` through `cursor`, which must be at the root.
///
/// Each word only pays for the part that differs from the previous word, so
/// sorted input is cheapest. Words are compared by Unicode scalar value, so a
/// shared prefix never ends inside a character. The cursor is back at the
/// root afterwards.
pub fn insert_words_at_cursor<I, S>(cursor: &mut BuilderCursor<'_>, words: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    debug_assert_eq!(cursor.depth(), 0);
    let mut prev: Vec<char> = Vec::new();
    for word in words {
        let word = word.as_ref().trim();
        if word.is_empty() {
            continue;
        }
        let chars: Vec<char> = word.chars().collect();
        let common = common_prefix_len(&prev, &chars);
        cursor.back_step(prev.len() - common);
        for &c in &chars[common..] {
            cursor.insert_char(c);
        }
        cursor.mark_eow();
        prev = chars;
    }
    cursor.back_step(prev.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_has() {
        let mut builder = TrieBlobBuilder::default();
        builder.insert("hello");
        builder.insert("  help ");
        builder.insert("");
        assert!(builder.has("hello"));
        assert!(builder.has("help"));
        assert!(!builder.has("hel"));
        assert!(!builder.has(""));
    }

    #[test]
    fn build_merges_identical_suffixes() {
        let blob = TrieBlobBuilder::from_words(["walking", "talking", "walked", "talked"]).build();
        // 't' and 'w' lead to the same node, and the "d" and "g" leaves merge:
        // root, t|w, a, l, k, e, i, n, leaf
        assert_eq!(blob.num_nodes(), 9);
        let words: Vec<String> = blob.words().collect();
        assert_eq!(words, vec!["talked", "talking", "walked", "walking"]);
    }

    #[test]
    fn empty_builder_has_a_root() {
        let blob = TrieBlobBuilder::default().build();
        assert_eq!(blob.num_nodes(), 1);
        assert_eq!(blob.words().count(), 0);
    }

    #[test]
    fn cursor_walks_back_and_forth() {
        let mut builder = TrieBlobBuilder::default();
        let mut cursor = builder.cursor();
        for c in "cat".chars() {
            cursor.insert_char(c);
        }
        cursor.mark_eow();
        cursor.back_step(1);
        cursor.insert_char('r');
        cursor.mark_eow();
        cursor.back_step(3);
        assert_eq!(cursor.depth(), 0);
        assert!(builder.has("cat"));
        assert!(builder.has("car"));
    }

    #[test]
    #[should_panic]
    fn back_step_past_root_panics() {
        let mut builder = TrieBlobBuilder::default();
        let mut cursor = builder.cursor();
        cursor.insert_char('a');
        cursor.back_step(2);
    }

    #[test]
    fn reference_shares_a_subtree() {
        let mut builder = TrieBlobBuilder::default();
        let mut cursor = builder.cursor();
        // "ab" and "ac"; node for 'a' gets number 1
        cursor.insert_char('a');
        cursor.insert_char('b');
        cursor.mark_eow();
        cursor.back_step(1);
        cursor.insert_char('c');
        cursor.mark_eow();
        cursor.back_step(2);
        // "x" reuses the 'a' subtree
        cursor.insert_char('x');
        assert!(cursor.check_reference(1).is_ok());
        cursor.reference(1);
        cursor.back_step(1);
        assert!(builder.has("xb"));
        assert!(builder.has("xc"));
        assert!(builder.has("ab"));
    }

    #[test]
    fn writing_through_a_reference_copies_the_node() {
        let mut builder = TrieBlobBuilder::default();
        let mut cursor = builder.cursor();
        cursor.insert_char('a');
        cursor.insert_char('b');
        cursor.insert_char('c');
        cursor.mark_eow();
        cursor.back_step(3);
        cursor.insert_char('x');
        cursor.reference(1);
        cursor.insert_char('b');
        cursor.insert_char('d');
        cursor.mark_eow();
        cursor.back_step(3);
        assert!(builder.has("xbd"));
        assert!(builder.has("xbc"));
        assert!(!builder.has("abd"));
        assert!(builder.has("abc"));
    }

    #[test]
    fn invalid_references_are_reported() {
        let mut builder = TrieBlobBuilder::default();
        let mut cursor = builder.cursor();
        cursor.insert_char('a');
        cursor.insert_char('b');
        assert!(cursor.check_reference(7).is_err());
        // 'a' encloses the cursor
        assert!(cursor.check_reference(1).is_err());
    }

    #[test]
    fn insert_words_at_cursor_shares_prefixes() {
        let mut builder = TrieBlobBuilder::default();
        let mut cursor = builder.cursor();
        insert_words_at_cursor(&mut cursor, ["tea", "team", "ten", "to"]);
        assert_eq!(cursor.depth(), 0);
        for w in ["tea", "team", "ten", "to"] {
            assert!(builder.has(w), "{w}");
        }
        assert!(!builder.has("te"));
    }

    #[test]
    fn from_graph_keeps_words() {
        let graph = NodeGraph::from_words(["one", "two", "three"]);
        let blob = TrieBlobBuilder::from_graph(&graph, TrieOptions::default()).build();
        let words: Vec<String> = blob.words().collect();
        assert_eq!(words, vec!["one", "three", "two"]);
    }
}
