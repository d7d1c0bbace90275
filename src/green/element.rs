use std::fmt;

use crate::{
    green::{GreenFlags, GreenNode, GreenToken, SyntaxKind},
    NodeOrToken, TextSize,
};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;
pub type GreenElementRef<'a> = NodeOrToken<&'a GreenNode, &'a GreenToken>;

impl From<GreenNode> for GreenElement {
    #[inline]
    fn from(node: GreenNode) -> GreenElement {
        NodeOrToken::Node(node)
    }
}

impl<'a> From<&'a GreenNode> for GreenElementRef<'a> {
    #[inline]
    fn from(node: &'a GreenNode) -> GreenElementRef<'a> {
        NodeOrToken::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    #[inline]
    fn from(token: GreenToken) -> GreenElement {
        NodeOrToken::Token(token)
    }
}

impl<'a> From<&'a GreenToken> for GreenElementRef<'a> {
    #[inline]
    fn from(token: &'a GreenToken) -> GreenElementRef<'a> {
        NodeOrToken::Token(token)
    }
}

impl GreenElementRef<'_> {
    #[inline]
    pub fn to_owned(self) -> GreenElement {
        match self {
            NodeOrToken::Node(node) => NodeOrToken::Node(node.clone()),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.clone()),
        }
    }
}

macro_rules! green_element_methods {
    () => {
        /// Returns kind of this element.
        #[inline]
        pub fn kind(&self) -> SyntaxKind {
            match self {
                NodeOrToken::Node(it) => it.kind(),
                NodeOrToken::Token(it) => it.kind(),
            }
        }

        /// Returns length of the text covered by this element, trivia
        /// included.
        #[inline]
        pub fn full_width(&self) -> TextSize {
            match self {
                NodeOrToken::Node(it) => it.full_width(),
                NodeOrToken::Token(it) => it.full_width(),
            }
        }

        #[inline]
        pub fn flags(&self) -> GreenFlags {
            match self {
                NodeOrToken::Node(it) => it.flags(),
                NodeOrToken::Token(it) => it.flags(),
            }
        }

        /// Whether both elements share the same allocation.
        #[inline]
        pub fn ptr_eq(&self, other: &Self) -> bool {
            match (self, other) {
                (NodeOrToken::Node(a), NodeOrToken::Node(b)) => a.ptr_eq(b),
                (NodeOrToken::Token(a), NodeOrToken::Token(b)) => a.ptr_eq(b),
                _ => false,
            }
        }
    };
}

impl GreenElement {
    green_element_methods!();

    /// Widths of the leading trivia of the first token and the trailing
    /// trivia of the last token, `None` if there are no tokens.
    #[inline]
    pub(crate) fn edge_trivia(&self) -> Option<(TextSize, TextSize)> {
        match self {
            NodeOrToken::Node(it) => it.edge_trivia(),
            NodeOrToken::Token(it) => {
                Some((it.leading_trivia().len(), it.trailing_trivia().len()))
            }
        }
    }
}

impl GreenElementRef<'_> {
    green_element_methods!();

    pub(crate) fn addr(&self) -> usize {
        match self {
            NodeOrToken::Node(it) => it.addr(),
            NodeOrToken::Token(it) => it.addr(),
        }
    }
}

impl fmt::Display for GreenElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOrToken::Node(it) => fmt::Display::fmt(it, f),
            NodeOrToken::Token(it) => fmt::Display::fmt(it, f),
        }
    }
}
