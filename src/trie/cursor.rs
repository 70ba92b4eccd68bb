use super::node::TrieNode;

#[derive(Clone, Copy, Debug)]
struct Frame<N> {
    node: N,
    /// Next child to visit.
    next: usize,
}

/// Depth-first cursor over a trie.
///
/// [`TrieCursor::advance`] visits every node below the start node in
/// pre-order, children in character order. Passing `go_deeper = false`
/// skips the subtree of the node visited last, which is how searches prune
/// branches that cannot lead anywhere useful.
///
/// The cursor can also be steered by hand with [`TrieCursor::descend`] and
/// [`TrieCursor::back`].
#[derive(Clone, Debug)]
pub struct TrieCursor<N: TrieNode> {
    stack: Vec<Frame<N>>,
    text: String,
    /// The top frame was produced by the last `advance`.
    visited: bool,
    done: bool,
}

impl<N: TrieNode> TrieCursor<N> {
    pub fn new(root: N) -> Self {
        Self::with_prefix(root, "")
    }

    /// Cursor starting at `node`, which is reached by `prefix`.
    pub fn with_prefix(node: N, prefix: &str) -> Self {
        Self {
            stack: vec![Frame { node, next: 0 }],
            text: prefix.to_string(),
            visited: false,
            done: false,
        }
    }

    /// Characters from the root to the current node.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Levels below the start node.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn node(&self) -> N {
        self.stack[self.stack.len() - 1].node
    }

    pub fn eow(&self) -> bool {
        self.node().eow()
    }

    pub fn keys(&self) -> Vec<char> {
        self.node().keys()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Steps into the `c` child. Returns `false` and stays put if there is none.
    pub fn descend(&mut self, c: char) -> bool {
        match self.node().get(c) {
            Some(child) => {
                self.push(c, child);
                self.visited = false;
                true
            }
            None => false,
        }
    }

    /// Moves up `n` levels, stopping at the start node. Returns the number
    /// of levels actually moved.
    pub fn back(&mut self, n: usize) -> usize {
        let steps = n.min(self.depth());
        for _ in 0..steps {
            self.pop();
        }
        self.visited = false;
        steps
    }

    fn push(&mut self, c: char, node: N) {
        self.stack.push(Frame { node, next: 0 });
        self.text.push(c);
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
            self.text.pop();
        }
    }

    /// Visits the next node in pre-order and returns its text, or `None`
    /// once the whole subtree of the start node has been visited.
    pub fn advance(&mut self, go_deeper: bool) -> Option<&str> {
        if self.done {
            return None;
        }
        if self.visited && !go_deeper {
            self.pop();
        }
        self.visited = false;
        loop {
            let top = self.stack.len() - 1;
            let frame = &mut self.stack[top];
            if frame.next < frame.node.size() {
                let i = frame.next;
                frame.next += 1;
                if let (Some(c), Some(child)) = (frame.node.key(i), frame.node.child(i)) {
                    self.push(c, child);
                    self.visited = true;
                    return Some(&self.text);
                }
                continue;
            }
            if top == 0 {
                self.done = true;
                return None;
            }
            self.pop();
        }
    }
}

impl<N: TrieNode> Iterator for TrieCursor<N> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.advance(true).map(str::to_owned)
    }
}

/// Every word below a node, in character order.
#[derive(Clone, Debug)]
pub struct Words<N: TrieNode> {
    cursor: TrieCursor<N>,
    start_eow: bool,
}

impl<N: TrieNode> Words<N> {
    pub fn new(root: N) -> Self {
        Self::with_prefix(root, "")
    }

    /// Words below `node`, each prefixed by `prefix`. The prefix itself is
    /// included when `node` ends a word and the prefix is not empty.
    pub fn with_prefix(node: N, prefix: &str) -> Self {
        Self {
            cursor: TrieCursor::with_prefix(node, prefix),
            start_eow: node.eow() && !prefix.is_empty(),
        }
    }
}

impl<N: TrieNode> Iterator for Words<N> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.start_eow {
            self.start_eow = false;
            return Some(self.cursor.text().to_owned());
        }
        loop {
            self.cursor.advance(true)?;
            if self.cursor.eow() {
                return Some(self.cursor.text().to_owned());
            }
        }
    }
}
