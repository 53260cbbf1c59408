//! Name index: a prefix tree over the characters of dotted variable names.
//!
//! One `Branch` per character, with a `Leaf` appended to the last branch of
//! every registered name. Sibling order is insertion order, which makes
//! enumeration (and therefore completion output) deterministic.

/// Handle to a node inside a [`Trie`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node holds.
#[derive(Debug, Clone)]
pub enum NodeKind<V> {
    /// The single entry point; matches no character.
    Root,
    /// One matched character of a name.
    Branch(char),
    /// Terminates a full name.
    Leaf { name: Box<str>, value: V },
}

/// A node of the trie and its ordered children.
#[derive(Debug, Clone)]
pub struct TrieNode<V> {
    kind: NodeKind<V>,
    children: Vec<NodeId>,
}

impl<V> TrieNode<V> {
    fn new(kind: NodeKind<V>) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind<V> {
        &self.kind
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Full name, if this is a leaf.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Stored value, if this is a leaf.
    pub fn value(&self) -> Option<&V> {
        match &self.kind {
            NodeKind::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A character trie mapping names to values.
///
/// # Complexity
///
/// - `find`: O(k · f) where k = name length and f = sibling fan-out
/// - `insert`: same as `find`
/// - `collect_leaves`: O(n) in the size of the subtree
///
/// # Examples
///
/// ```
/// use cvars::core::Trie;
///
/// let mut trie = Trie::new();
/// trie.insert("gui.width", 800);
/// trie.insert("gui.height", 600);
/// trie.insert("console.MaxLines", 200);
///
/// assert_eq!(trie.get("gui.width"), Some(&800));
/// assert!(trie.get("gui").is_none());
///
/// let node = trie.find_prefix_node("gui.").unwrap();
/// assert_eq!(trie.collect_leaves(node).len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Trie<V> {
    nodes: Vec<TrieNode<V>>,
    // Creation order, for substring search without walking the tree.
    names: Vec<Box<str>>,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    const ROOT: NodeId = NodeId(0);

    /// Create a trie holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new(NodeKind::Root)],
            names: Vec::new(),
        }
    }

    /// Number of names stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Access a node by handle.
    #[inline]
    pub fn node(&self, id: NodeId) -> &TrieNode<V> {
        &self.nodes[id.0]
    }

    /// Insert a name, creating one branch per character and appending a leaf.
    ///
    /// The caller checks that `name` is not present yet.
    pub fn insert(&mut self, name: &str, value: V) -> NodeId {
        debug_assert!(!self.contains(name), "duplicate trie insert: {name}");

        let mut current = Self::ROOT;
        for c in name.chars() {
            current = match self.branch_child(current, c) {
                Some(next) => next,
                None => self.push_child(current, NodeKind::Branch(c)),
            };
        }

        let leaf = self.push_child(
            current,
            NodeKind::Leaf {
                name: name.into(),
                value,
            },
        );
        self.names.push(name.into());
        leaf
    }

    /// Find the leaf for an exact name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let end = self.walk(name)?;
        self.nodes[end.0]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child.0].name() == Some(name))
    }

    /// Get the value stored under an exact name.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.find(name).and_then(|id| self.nodes[id.0].value())
    }

    /// Get a mutable reference to the value stored under an exact name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        let id = self.find(name)?;
        match &mut self.nodes[id.0].kind {
            NodeKind::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Check whether a name is present.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Walk the characters of `prefix` and return the node reached.
    ///
    /// If that node's only child is a leaf, the leaf is returned instead.
    /// An empty prefix yields the root.
    pub fn find_prefix_node(&self, prefix: &str) -> Option<NodeId> {
        if prefix.is_empty() {
            return Some(Self::ROOT);
        }

        let end = self.walk(prefix)?;
        match self.nodes[end.0].children.as_slice() {
            [only] if self.nodes[only.0].is_leaf() => Some(*only),
            _ => Some(end),
        }
    }

    /// Every leaf in the subtree of `id`, depth first in insertion order.
    pub fn collect_leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            if node.is_leaf() {
                leaves.push(current);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }

        leaves
    }

    /// Every name containing `needle`, in creation order.
    pub fn find_by_substring(&self, needle: &str) -> Vec<&str> {
        self.names
            .iter()
            .filter(|name| name.contains(needle))
            .map(|name| name.as_ref())
            .collect()
    }

    /// All names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|name| name.as_ref())
    }

    /// All `(name, value)` pairs in trie order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.collect_leaves(Self::ROOT)
            .into_iter()
            .filter_map(|id| match &self.nodes[id.0].kind {
                NodeKind::Leaf { name, value } => Some((name.as_ref(), value)),
                _ => None,
            })
    }

    /// Drop every node except the root.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0].children.clear();
        self.names.clear();
    }

    fn walk(&self, key: &str) -> Option<NodeId> {
        key.chars()
            .try_fold(Self::ROOT, |current, c| self.branch_child(current, c))
    }

    fn branch_child(&self, parent: NodeId, c: char) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&child| matches!(self.nodes[child.0].kind, NodeKind::Branch(b) if b == c))
    }

    fn push_child(&mut self, parent: NodeId, kind: NodeKind<V>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TrieNode::new(kind));
        self.nodes[parent.0].children.push(id);
        id
    }
}
