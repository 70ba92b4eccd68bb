use std::collections::HashMap;

use super::blob::TrieBlob;
use super::cursor::Words;

/// Read-only view of one trie node.
///
/// Implemented by the compact [`TrieBlob`] nodes and by the logical
/// [`NodeGraph`], so traversal, lookup and export are written once.
/// Children are always reported in ascending character order.
pub trait TrieNode: Copy {
    /// End-of-word flag.
    fn eow(&self) -> bool;

    /// Number of children.
    fn size(&self) -> usize;

    /// Character of the child at `index`.
    fn key(&self, index: usize) -> Option<char>;

    /// Child at `index`, positional access without a character lookup.
    fn child(&self, index: usize) -> Option<Self>;

    /// Child reached through `c`.
    fn get(&self, c: char) -> Option<Self>;

    /// Identity of the node within its trie. Shared subtrees share an id.
    fn id(&self) -> usize;

    fn keys(&self) -> Vec<char> {
        (0..self.size()).filter_map(|i| self.key(i)).collect()
    }

    fn has(&self, c: char) -> bool {
        self.get(c).is_some()
    }

    fn has_children(&self) -> bool {
        self.size() > 0
    }
}

/// Follows `text` from `node`, one character at a time.
pub fn walk<N: TrieNode>(node: N, text: &str) -> Option<N> {
    text.chars().try_fold(node, |n, c| n.get(c))
}

pub type NodeId = usize;

#[derive(Clone, Debug, Default)]
struct GraphNode {
    eow: bool,
    /// Sorted by character.
    children: Vec<(char, NodeId)>,
}

/// Logical trie: an arena of nodes addressed by [`NodeId`].
///
/// A child is an index rather than an owned box, so the same subtree can be
/// reachable from several parents.
#[derive(Clone, Debug)]
pub struct NodeGraph {
    nodes: Vec<GraphNode>,
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeGraph {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![GraphNode::default()],
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut graph = Self::new();
        for word in words {
            graph.insert(word.as_ref());
        }
        graph
    }

    /// Copies a compact trie, keeping its shared subtrees shared.
    pub fn from_blob(blob: &TrieBlob) -> Self {
        fn copy(
            blob: &TrieBlob,
            idx: u32,
            graph: &mut NodeGraph,
            known: &mut HashMap<u32, NodeId>,
        ) -> NodeId {
            if let Some(&id) = known.get(&idx) {
                return id;
            }
            let node = blob.node(idx);
            let id = if idx == 0 {
                NodeGraph::ROOT
            } else {
                graph.add_node(false)
            };
            graph.set_eow(id, node.eow());
            for i in 0..node.size() {
                if let (Some(c), Some(child)) = (node.key(i), node.child(i)) {
                    let child_id = copy(blob, child.index(), graph, known);
                    graph.set_child(id, c, child_id);
                }
            }
            known.insert(idx, id);
            id
        }

        let mut graph = Self::new();
        let mut known = HashMap::new();
        copy(blob, 0, &mut graph, &mut known);
        graph
    }

    pub fn insert(&mut self, word: &str) {
        let mut id = Self::ROOT;
        for c in word.chars() {
            id = match self.child_of(id, c) {
                Some(child) => child,
                None => {
                    let child = self.add_node(false);
                    self.set_child(id, c, child);
                    child
                }
            };
        }
        self.set_eow(id, true);
    }

    pub fn has(&self, word: &str) -> bool {
        walk(self.root(), word).is_some_and(|n| n.eow())
    }

    pub fn add_node(&mut self, eow: bool) -> NodeId {
        self.nodes.push(GraphNode {
            eow,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn set_eow(&mut self, id: NodeId, eow: bool) {
        self.nodes[id].eow = eow;
    }

    /// Points the `c` edge of `parent` at `child`, replacing any previous target.
    pub fn set_child(&mut self, parent: NodeId, c: char, child: NodeId) {
        let children = &mut self.nodes[parent].children;
        match children.binary_search_by_key(&c, |&(k, _)| k) {
            Ok(pos) => children[pos].1 = child,
            Err(pos) => children.insert(pos, (c, child)),
        }
    }

    fn child_of(&self, parent: NodeId, c: char) -> Option<NodeId> {
        let children = &self.nodes[parent].children;
        children
            .binary_search_by_key(&c, |&(k, _)| k)
            .ok()
            .map(|pos| children[pos].1)
    }

    pub fn root(&self) -> GraphNodeRef<'_> {
        self.node(Self::ROOT)
    }

    pub fn node(&self, id: NodeId) -> GraphNodeRef<'_> {
        GraphNodeRef { graph: self, id }
    }

    /// Number of nodes in the arena, unreachable ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[Self::ROOT].children.is_empty() && !self.nodes[Self::ROOT].eow
    }

    pub fn words(&self) -> Words<GraphNodeRef<'_>> {
        Words::new(self.root())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GraphNodeRef<'a> {
    graph: &'a NodeGraph,
    id: NodeId,
}

impl<'a> GraphNodeRef<'a> {
    fn data(&self) -> &'a GraphNode {
        &self.graph.nodes[self.id]
    }
}

impl TrieNode for GraphNodeRef<'_> {
    fn eow(&self) -> bool {
        self.data().eow
    }

    fn size(&self) -> usize {
        self.data().children.len()
    }

    fn key(&self, index: usize) -> Option<char> {
        self.data().children.get(index).map(|&(c, _)| c)
    }

    fn child(&self, index: usize) -> Option<Self> {
        self.data()
            .children
            .get(index)
            .map(|&(_, id)| self.graph.node(id))
    }

    fn get(&self, c: char) -> Option<Self> {
        self.graph.child_of(self.id, c).map(|id| self.graph.node(id))
    }

    fn id(&self) -> usize {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::builder::TrieBlobBuilder;

    #[test]
    fn insert_and_lookup() {
        let graph = NodeGraph::from_words(["walk", "walker", "talk"]);
        assert!(graph.has("walk"));
        assert!(graph.has("walker"));
        assert!(graph.has("talk"));
        assert!(!graph.has("walke"));
        assert!(!graph.has("tal"));
    }

    #[test]
    fn keys_are_sorted() {
        let graph = NodeGraph::from_words(["zebra", "apple", "mango"]);
        assert_eq!(graph.root().keys(), vec!['a', 'm', 'z']);
    }

    #[test]
    fn absent_children_are_none() {
        let graph = NodeGraph::from_words(["a"]);
        let root = graph.root();
        assert!(root.get('b').is_none());
        assert!(root.child(3).is_none());
        assert!(root.key(1).is_none());
        assert!(!root.has('b'));
    }

    #[test]
    fn empty_graph() {
        let graph = NodeGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.words().count(), 0);
    }

    #[test]
    fn blob_conversion_keeps_shared_subtrees() {
        let blob = TrieBlobBuilder::from_words(["walking", "talking", "walked", "talked"]).build();
        let graph = NodeGraph::from_blob(&blob);
        let walk_node = walk(graph.root(), "walk").map(|n| n.id());
        let talk_node = walk(graph.root(), "talk").map(|n| n.id());
        assert!(walk_node.is_some());
        assert_eq!(walk_node, talk_node);

        let mut words: Vec<String> = graph.words().collect();
        words.sort();
        assert_eq!(words, vec!["talked", "talking", "walked", "walking"]);
    }
}
