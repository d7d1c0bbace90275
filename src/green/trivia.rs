use std::{fmt, sync::Arc};

use smol_str::SmolStr;

use crate::{green::SyntaxKind, TextSize};

/// One run of trivia, e.g. a span of whitespace or a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriviaPiece {
    kind: SyntaxKind,
    text: SmolStr,
}

impl TriviaPiece {
    pub fn new(kind: SyntaxKind, text: impl Into<SmolStr>) -> TriviaPiece {
        TriviaPiece { kind, text: text.into() }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    #[inline]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    #[inline]
    pub fn len(&self) -> TextSize {
        TextSize::of(self.text.as_str())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for TriviaPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Leading or trailing trivia of a token.
///
/// The empty trivia does not allocate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GreenTrivia {
    len: TextSize,
    pieces: Option<Arc<[TriviaPiece]>>,
}

impl GreenTrivia {
    pub fn new(pieces: impl IntoIterator<Item = TriviaPiece>) -> GreenTrivia {
        let pieces: Vec<TriviaPiece> = pieces.into_iter().filter(|it| !it.is_empty()).collect();
        if pieces.is_empty() {
            return GreenTrivia::empty();
        }
        let len = pieces.iter().map(TriviaPiece::len).sum();
        GreenTrivia { len, pieces: Some(pieces.into()) }
    }

    #[inline]
    pub fn empty() -> GreenTrivia {
        GreenTrivia::default()
    }

    #[inline]
    pub fn pieces(&self) -> &[TriviaPiece] {
        self.pieces.as_deref().unwrap_or(&[])
    }

    /// Total length of all pieces.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_none()
    }
}

impl fmt::Display for GreenTrivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pieces().iter().try_for_each(|piece| fmt::Display::fmt(piece, f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WS: SyntaxKind = SyntaxKind(0);
    const COMMENT: SyntaxKind = SyntaxKind(1);

    #[test]
    fn empty_pieces_are_dropped() {
        let trivia = GreenTrivia::new(vec![TriviaPiece::new(WS, ""), TriviaPiece::new(WS, "")]);
        assert!(trivia.is_empty());
        assert_eq!(trivia, GreenTrivia::empty());
    }

    #[test]
    fn trivia_length_and_text() {
        let pieces = vec![TriviaPiece::new(WS, "  "), TriviaPiece::new(COMMENT, "// hi\n")];
        let trivia = GreenTrivia::new(pieces);
        assert_eq!(trivia.len(), TextSize::from(8));
        assert_eq!(trivia.pieces().len(), 2);
        assert_eq!(trivia.to_string(), "  // hi\n");
    }
}
