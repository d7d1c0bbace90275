mod node;
mod token;
mod trivia;
mod element;
mod flags;
mod factory;
mod list_builder;
mod node_cache;

pub(crate) use self::node::GreenChild;

pub use self::{
    element::{GreenElement, GreenElementRef},
    factory::GreenFactory,
    flags::GreenFlags,
    list_builder::{SyntaxListBuilder, SyntaxListPool},
    node::{GreenNode, Slots},
    node_cache::{Interner, NoInterning, NodeCache},
    token::GreenToken,
    trivia::{GreenTrivia, TriviaPiece},
};

/// SyntaxKind is a type tag for each token or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyntaxKind(pub u16);

impl SyntaxKind {
    /// Kind of the nodes produced by [`SyntaxListBuilder::to_list_node`].
    /// Languages must map it to one of their own kinds.
    pub const LIST: SyntaxKind = SyntaxKind(u16::MAX);
}

/// Shape of one fixed slot of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Leaving the slot empty marks the node as missing.
    Required,
    /// The slot may be empty in a well-formed node.
    Optional,
}
