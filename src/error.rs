use text_size::{TextRange, TextSize};
use thiserror::Error;

/// Misuse of the construction, traversal or edit API.
///
/// These are bugs in the caller (usually the parser), never a consequence of
/// malformed source text: unparseable input is represented inside the tree
/// with missing tokens and error nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A token was requested for a kind the language does not treat as a
    /// terminal.
    #[error("`{kind}` is not a token kind")]
    InvalidTokenKind { kind: String },

    /// A node was requested for a terminal kind.
    #[error("`{kind}` is a token kind and cannot have children")]
    NotANodeKind { kind: String },

    /// The number of slots does not match the fixed arity of the kind.
    #[error("`{kind}` expects {expected} slots, got {found}")]
    ArityMismatch { kind: String, expected: usize, found: usize },

    /// A child index past the last slot of the node.
    #[error("slot index {index} out of range for a node with {len} slots")]
    IndexOutOfRange { index: usize, len: usize },

    /// An offset outside of the range covered by a node.
    #[error("offset {offset:?} is outside of {range:?}")]
    OffsetOutOfRange { offset: TextSize, range: TextRange },

    /// An edit that reaches past the end of the text.
    #[error("edit {edit:?} is outside of a text of length {len:?}")]
    EditOutOfBounds { edit: TextRange, len: TextSize },

    /// An offset that splits a UTF-8 sequence.
    #[error("offset {offset:?} is not on a char boundary")]
    NotCharBoundary { offset: TextSize },

    /// A green tree whose width differs from the text it claims to cover.
    #[error("tree covers {green:?} bytes but the text has {text:?}")]
    WidthMismatch { green: TextSize, text: TextSize },
}

pub type Result<T, E = SyntaxError> = std::result::Result<T, E>;
