use super::char_index::CharIndex;
use super::cursor::Words;
use super::node::TrieNode;
use super::TrieOptions;
use crate::error::{Result, TrieError};

pub(crate) const NODE_MASK_EOW: u32 = 1 << 31;
pub(crate) const NODE_MASK_NUM_CHILDREN: u32 = NODE_MASK_EOW - 1;

const EDGE_MASK_CODE: u64 = 0xffff_ffff;
const EDGE_TARGET_SHIFT: u32 = 32;

const SIGNATURE: &[u8; 8] = b"TrieBlob";
const ENDIAN_MARK: u32 = 0x0403_0201;
const BIN_VERSION: u32 = 1;
const HEADER_LEN: usize = 44;

#[inline]
pub(crate) fn pack_edge(code: u32, target: u32) -> u64 {
    u64::from(code) | (u64::from(target) << EDGE_TARGET_SHIFT)
}

#[inline]
fn edge_code(edge: u64) -> u32 {
    (edge & EDGE_MASK_CODE) as u32
}

#[inline]
fn edge_target(edge: u64) -> u32 {
    (edge >> EDGE_TARGET_SHIFT) as u32
}

/// Immutable, compact trie.
///
/// Node `i` is described by `nodes[i]` (end-of-word bit plus child count) and
/// owns the edges `edges[child_start[i]..child_start[i] + count]`, sorted by
/// character. Node 0 is the root. Every edge points to a node with a larger
/// index, so the graph is acyclic by construction.
#[derive(Clone, Debug)]
pub struct TrieBlob {
    nodes: Vec<u32>,
    child_start: Vec<u32>,
    edges: Vec<u64>,
    char_index: CharIndex,
    options: TrieOptions,
}

impl TrieBlob {
    pub(crate) fn from_parts(
        nodes: Vec<u32>,
        child_start: Vec<u32>,
        edges: Vec<u64>,
        char_index: CharIndex,
        options: TrieOptions,
    ) -> Self {
        debug_assert_eq!(nodes.len(), child_start.len());
        Self {
            nodes,
            child_start,
            edges,
            char_index,
            options,
        }
    }

    pub fn root(&self) -> BlobNode<'_> {
        self.node(0)
    }

    /// Node at `index`. Indices come from [`BlobNode::index`].
    pub fn node(&self, index: u32) -> BlobNode<'_> {
        BlobNode { blob: self, index }
    }

    pub fn has(&self, word: &str) -> bool {
        self.find_node(word).is_some_and(|n| n.eow())
    }

    /// Node reached by following `prefix` from the root.
    pub fn find_node(&self, prefix: &str) -> Option<BlobNode<'_>> {
        let mut idx = 0;
        for c in prefix.chars() {
            let code = self.char_index.code(c)?;
            idx = self.child_index(idx, code)?;
        }
        Some(self.node(idx))
    }

    pub fn words(&self) -> Words<BlobNode<'_>> {
        Words::new(self.root())
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn char_index(&self) -> &CharIndex {
        &self.char_index
    }

    pub fn options(&self) -> &TrieOptions {
        &self.options
    }

    #[inline]
    fn header(&self, idx: u32) -> u32 {
        self.nodes[idx as usize]
    }

    #[inline]
    fn edge_range(&self, idx: u32) -> std::ops::Range<usize> {
        let start = self.child_start[idx as usize] as usize;
        let count = (self.header(idx) & NODE_MASK_NUM_CHILDREN) as usize;
        start..start + count
    }

    fn child_index(&self, idx: u32, code: u32) -> Option<u32> {
        self.edges[self.edge_range(idx)]
            .iter()
            .find(|&&e| edge_code(e) == code)
            .map(|&e| edge_target(e))
    }

    /// Serializes to the little-endian binary layout read by [`TrieBlob::decode_bin`].
    pub fn encode_bin(&self) -> Vec<u8> {
        let chars = self.char_index.chars();
        let len = HEADER_LEN
            + 4 * (chars.len() + self.nodes.len() + self.child_start.len())
            + 8 * self.edges.len();
        let mut out = Vec::with_capacity(len);

        out.extend_from_slice(SIGNATURE);
        for v in [
            ENDIAN_MARK,
            BIN_VERSION,
            self.options.compound_character as u32,
            self.options.strip_case_and_accents_prefix as u32,
            self.options.forbidden_word_prefix as u32,
            u32::from(self.options.is_case_aware),
            chars.len() as u32,
            self.nodes.len() as u32,
            self.edges.len() as u32,
        ] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        for &c in chars {
            out.extend_from_slice(&(c as u32).to_le_bytes());
        }
        for &n in &self.nodes {
            out.extend_from_slice(&n.to_le_bytes());
        }
        for &s in &self.child_start {
            out.extend_from_slice(&s.to_le_bytes());
        }
        for &e in &self.edges {
            out.extend_from_slice(&e.to_le_bytes());
        }
        debug_assert_eq!(out.len(), len);
        out
    }

    /// Reads a blob written by [`TrieBlob::encode_bin`], validating every
    /// node and edge so later traversal cannot index out of bounds.
    pub fn decode_bin(bytes: &[u8]) -> Result<Self> {
        let invalid = |msg: &str| TrieError::InvalidBlob(msg.to_string());

        if bytes.len() < HEADER_LEN || &bytes[..8] != SIGNATURE {
            return Err(invalid("missing TrieBlob signature"));
        }
        let mut reader = ByteReader::new(&bytes[8..]);
        if reader.u32()? != ENDIAN_MARK {
            return Err(invalid("unsupported byte order"));
        }
        let version = reader.u32()?;
        if version != BIN_VERSION {
            return Err(TrieError::InvalidBlob(format!("unsupported version {version}")));
        }
        let compound_character = reader.char()?;
        let strip_case_and_accents_prefix = reader.char()?;
        let forbidden_word_prefix = reader.char()?;
        let is_case_aware = reader.u32()? != 0;
        let num_chars = reader.u32()? as usize;
        let num_nodes = reader.u32()? as usize;
        let num_edges = reader.u32()? as usize;

        let expected = num_chars
            .checked_add(num_nodes)
            .and_then(|n| n.checked_add(num_nodes))
            .and_then(|n| n.checked_mul(4))
            .and_then(|n| num_edges.checked_mul(8).and_then(|e| n.checked_add(e)))
            .ok_or_else(|| invalid("section sizes overflow"))?;
        if reader.remaining() != expected {
            return Err(invalid("truncated or oversized data"));
        }
        if num_nodes == 0 {
            return Err(invalid("missing root node"));
        }

        let chars = (0..num_chars)
            .map(|_| reader.char())
            .collect::<Result<Vec<_>>>()?;
        let char_index =
            CharIndex::from_chars(chars).ok_or_else(|| invalid("duplicate character in index"))?;
        let nodes = (0..num_nodes).map(|_| reader.u32()).collect::<Result<Vec<_>>>()?;
        let child_start = (0..num_nodes).map(|_| reader.u32()).collect::<Result<Vec<_>>>()?;
        let edges = (0..num_edges).map(|_| reader.u64()).collect::<Result<Vec<_>>>()?;

        for (idx, (&header, &start)) in nodes.iter().zip(&child_start).enumerate() {
            let count = (header & NODE_MASK_NUM_CHILDREN) as usize;
            let end = (start as usize)
                .checked_add(count)
                .filter(|&end| end <= num_edges)
                .ok_or_else(|| TrieError::InvalidBlob(format!("node {idx} edges out of range")))?;
            let mut prev: Option<char> = None;
            for &edge in &edges[start as usize..end] {
                let target = edge_target(edge) as usize;
                if target <= idx || target >= num_nodes {
                    return Err(TrieError::InvalidBlob(format!(
                        "node {idx} has an edge to invalid node {target}"
                    )));
                }
                let c = char_index.char_at(edge_code(edge)).ok_or_else(|| {
                    TrieError::InvalidBlob(format!(
                        "node {idx} has an edge with an unknown character"
                    ))
                })?;
                if prev.is_some_and(|p| p >= c) {
                    return Err(TrieError::InvalidBlob(format!(
                        "node {idx} children are not sorted"
                    )));
                }
                prev = Some(c);
            }
        }

        Ok(Self {
            nodes,
            child_start,
            edges,
            char_index,
            options: TrieOptions {
                compound_character,
                strip_case_and_accents_prefix,
                forbidden_word_prefix,
                is_case_aware,
            },
        })
    }
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| TrieError::InvalidBlob("unexpected end of data".to_string()))?;
        self.pos = end;
        let mut buf = [0u8; N];
        buf.copy_from_slice(slice);
        Ok(buf)
    }

    fn u32(&mut self) -> Result<u32> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> Result<u64> {
        self.take::<8>().map(u64::from_le_bytes)
    }

    fn char(&mut self) -> Result<char> {
        let v = self.u32()?;
        char::from_u32(v).ok_or_else(|| TrieError::InvalidBlob(format!("invalid character {v:#x}")))
    }
}

/// A node inside a [`TrieBlob`].
#[derive(Clone, Copy, Debug)]
pub struct BlobNode<'a> {
    blob: &'a TrieBlob,
    index: u32,
}

impl<'a> BlobNode<'a> {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn blob(&self) -> &'a TrieBlob {
        self.blob
    }

    #[inline]
    fn edge(&self, i: usize) -> Option<u64> {
        let range = self.blob.edge_range(self.index);
        if i < range.len() {
            Some(self.blob.edges[range.start + i])
        } else {
            None
        }
    }
}

impl PartialEq for BlobNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.blob, other.blob) && self.index == other.index
    }
}

impl Eq for BlobNode<'_> {}

impl TrieNode for BlobNode<'_> {
    #[inline]
    fn eow(&self) -> bool {
        self.blob.header(self.index) & NODE_MASK_EOW != 0
    }

    #[inline]
    fn size(&self) -> usize {
        (self.blob.header(self.index) & NODE_MASK_NUM_CHILDREN) as usize
    }

    fn key(&self, index: usize) -> Option<char> {
        self.edge(index)
            .and_then(|e| self.blob.char_index.char_at(edge_code(e)))
    }

    fn child(&self, index: usize) -> Option<Self> {
        self.edge(index).map(|e| self.blob.node(edge_target(e)))
    }

    fn get(&self, c: char) -> Option<Self> {
        let code = self.blob.char_index.code(c)?;
        self.blob
            .child_index(self.index, code)
            .map(|idx| self.blob.node(idx))
    }

    fn id(&self) -> usize {
        self.index as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::builder::TrieBlobBuilder;

    fn sample() -> TrieBlob {
        TrieBlobBuilder::from_words(["apple", "apples", "banana", "band", "bands", "café"]).build()
    }

    #[test]
    fn lookup() {
        let blob = sample();
        assert!(blob.has("apple"));
        assert!(blob.has("café"));
        assert!(!blob.has("app"));
        assert!(!blob.has("cafe"));
        assert!(!blob.has("xyz"));
        assert!(blob.find_node("ban").is_some());
    }

    #[test]
    fn children_are_sorted_by_character() {
        let blob = TrieBlobBuilder::from_words(["zoo", "bee", "ant", "émigré"]).build();
        assert_eq!(blob.root().keys(), vec!['a', 'b', 'z', 'é']);
    }

    #[test]
    fn edges_point_forward() {
        let blob = sample();
        for idx in 0..blob.num_nodes() as u32 {
            let node = blob.node(idx);
            for i in 0..node.size() {
                let child = node.child(i).unwrap();
                assert!(child.index() > idx);
            }
        }
    }

    #[test]
    fn binary_round_trip() {
        let blob = sample();
        let bytes = blob.encode_bin();
        let decoded = TrieBlob::decode_bin(&bytes).unwrap();
        assert_eq!(decoded.num_nodes(), blob.num_nodes());
        assert_eq!(decoded.options(), blob.options());
        let words: Vec<String> = decoded.words().collect();
        assert_eq!(words, blob.words().collect::<Vec<_>>());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            TrieBlob::decode_bin(b"not a trie"),
            Err(TrieError::InvalidBlob(_))
        ));

        let mut bytes = sample().encode_bin();
        bytes.truncate(bytes.len() - 3);
        assert!(TrieBlob::decode_bin(&bytes).is_err());
    }

    #[test]
    fn decode_rejects_backward_edges() {
        let blob = sample();
        let mut bytes = blob.encode_bin();
        // Point the last edge back at the root.
        let len = bytes.len();
        bytes[len - 4..].copy_from_slice(&0u32.to_le_bytes());
        assert!(TrieBlob::decode_bin(&bytes).is_err());
    }
}
