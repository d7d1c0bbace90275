use std::hash::{BuildHasherDefault, Hash, Hasher};

use hashbrown::hash_map::RawEntryMut;
use rustc_hash::FxHasher;

use crate::{
    green::{GreenElementRef, GreenNode, GreenToken},
    NodeOrToken,
};

type HashMap<K, V> = hashbrown::HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Strategy for deduplicating freshly built green elements.
///
/// Interning only ever affects which allocation ends up in the tree, never
/// the shape or text of the tree.
pub trait Interner {
    fn intern_token(&mut self, token: GreenToken) -> GreenToken;
    fn intern_node(&mut self, node: GreenNode) -> GreenNode;
}

/// Keeps every element as built.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterning;

impl Interner for NoInterning {
    #[inline]
    fn intern_token(&mut self, token: GreenToken) -> GreenToken {
        token
    }

    #[inline]
    fn intern_node(&mut self, node: GreenNode) -> GreenNode {
        node
    }
}

#[derive(Debug)]
struct NoHash<T>(T);

/// Interner based on hash-consing.
///
/// Tokens are keyed by their content. Nodes are keyed by kind and the
/// identity of their children, so a node is only found again if its children
/// were interned as well. Green nodes are fully immutable, so it's ok to
/// deduplicate them; in lieu of a more sophisticated cache, only "small"
/// nodes are kept.
#[derive(Debug)]
pub struct NodeCache {
    nodes: HashMap<NoHash<GreenNode>, ()>,
    tokens: HashMap<NoHash<GreenToken>, ()>,
    children_limit: usize,
}

impl Default for NodeCache {
    fn default() -> NodeCache {
        NodeCache::with_children_limit(3)
    }
}

impl NodeCache {
    /// Nodes with more slots than `limit` are never cached.
    pub fn with_children_limit(limit: usize) -> NodeCache {
        NodeCache { nodes: HashMap::default(), tokens: HashMap::default(), children_limit: limit }
    }

    pub fn len(&self) -> usize {
        self.nodes.len() + self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers every cacheable element of `root` so that rebuilding an
    /// identical element returns the existing one.
    pub fn seed(&mut self, root: &GreenNode) {
        // Children go in before their parents.
        for child in root.children() {
            match child {
                NodeOrToken::Node(it) => self.seed(it),
                NodeOrToken::Token(it) => {
                    self.intern_token(it.clone());
                }
            }
        }
        self.intern_node(root.clone());
    }
}

fn token_hash(token: &GreenToken) -> u64 {
    let mut h = FxHasher::default();
    token.kind().hash(&mut h);
    token.text().hash(&mut h);
    token.leading_trivia().hash(&mut h);
    token.trailing_trivia().hash(&mut h);
    token.flags().hash(&mut h);
    h.finish()
}

fn node_hash(node: &GreenNode) -> u64 {
    let mut h = FxHasher::default();
    node.kind().hash(&mut h);
    for slot in node.slots() {
        slot.map(element_key).hash(&mut h);
    }
    h.finish()
}

fn element_key(element: GreenElementRef<'_>) -> (bool, usize) {
    (element.is_node(), element.addr())
}

fn same_children(a: &GreenNode, b: &GreenNode) -> bool {
    a.kind() == b.kind()
        && a.flags() == b.flags()
        && a.slot_count() == b.slot_count()
        && a.slots().zip(b.slots()).all(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => a.ptr_eq(&b),
            (None, None) => true,
            _ => false,
        })
}

impl Interner for NodeCache {
    fn intern_token(&mut self, token: GreenToken) -> GreenToken {
        let hash = token_hash(&token);
        let entry = self.tokens.raw_entry_mut().from_hash(hash, |it| it.0 == token);
        match entry {
            RawEntryMut::Occupied(entry) => entry.key().0.clone(),
            RawEntryMut::Vacant(entry) => {
                entry.insert_with_hasher(hash, NoHash(token.clone()), (), |t| token_hash(&t.0));
                token
            }
        }
    }

    fn intern_node(&mut self, node: GreenNode) -> GreenNode {
        if node.slot_count() > self.children_limit {
            return node;
        }
        let hash = node_hash(&node);
        let entry = self.nodes.raw_entry_mut().from_hash(hash, |it| same_children(&it.0, &node));
        match entry {
            RawEntryMut::Occupied(entry) => entry.key().0.clone(),
            RawEntryMut::Vacant(entry) => {
                entry.insert_with_hasher(hash, NoHash(node.clone()), (), |n| node_hash(&n.0));
                node
            }
        }
    }
}
