//! Typed views over red nodes and locators that outlive a single tree.
//!
//! A red node pins the whole tree it belongs to. [`SyntaxNodePtr`] instead
//! records a kind and a full span, and is resolved again against the root of
//! whichever tree version is current.

use std::iter::successors;

use crate::{Language, SyntaxNode, SyntaxToken, TextRange};

/// A node of a known kind. Casting checks the kind and wraps the same red
/// node, nothing is copied.
pub trait AstNode {
    type Language: Language;

    fn can_cast(kind: <Self::Language as Language>::Kind) -> bool
    where
        Self: Sized;

    fn cast(node: SyntaxNode<Self::Language>) -> Option<Self>
    where
        Self: Sized;

    fn syntax(&self) -> &SyntaxNode<Self::Language>;
}

/// First child of `parent` that casts to `N`.
pub fn child<N: AstNode>(parent: &SyntaxNode<N::Language>) -> Option<N> {
    parent.children().find_map(N::cast)
}

/// First token child of `parent` with the given kind. Missing tokens count.
pub fn token<L: Language>(parent: &SyntaxNode<L>, kind: L::Kind) -> Option<SyntaxToken<L>> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|it| it.kind() == kind)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxNodePtr<L: Language> {
    kind: L::Kind,
    range: TextRange,
}

impl<L: Language> SyntaxNodePtr<L> {
    pub fn new(node: &SyntaxNode<L>) -> Self {
        Self { kind: node.kind(), range: node.full_span() }
    }

    pub fn kind(&self) -> L::Kind {
        self.kind
    }

    /// The node of the recorded kind spanning exactly the recorded range.
    ///
    /// `None` when `root` is not a root or an edit moved or reshaped the node.
    pub fn to_node(&self, root: &SyntaxNode<L>) -> Option<SyntaxNode<L>> {
        if root.parent().is_some() || !root.full_span().contains_range(self.range) {
            return None;
        }
        successors(Some(root.clone()), |node| {
            node.child_or_token_at_range(self.range).and_then(|it| it.into_node())
        })
        .find(|it| it.full_span() == self.range && it.kind() == self.kind)
    }

    pub fn cast<N: AstNode<Language = L>>(self) -> Option<AstPtr<N>> {
        N::can_cast(self.kind).then(|| AstPtr { raw: self })
    }
}

/// A [`SyntaxNodePtr`] that resolves to `N`.
pub struct AstPtr<N: AstNode> {
    raw: SyntaxNodePtr<N::Language>,
}

impl<N: AstNode> AstPtr<N> {
    pub fn new(node: &N) -> Self {
        Self { raw: SyntaxNodePtr::new(node.syntax()) }
    }

    pub fn to_node(&self, root: &SyntaxNode<N::Language>) -> Option<N> {
        self.raw.to_node(root).and_then(N::cast)
    }
}

impl<N: AstNode> Clone for AstPtr<N> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<N: AstNode> From<AstPtr<N>> for SyntaxNodePtr<N::Language> {
    fn from(ptr: AstPtr<N>) -> SyntaxNodePtr<N::Language> {
        ptr.raw
    }
}
