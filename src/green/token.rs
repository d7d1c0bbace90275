use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use smol_str::SmolStr;

use crate::{
    green::{GreenFlags, GreenTrivia, SyntaxKind},
    TextSize,
};

#[derive(PartialEq, Eq, Hash)]
struct GreenTokenData {
    kind: SyntaxKind,
    text: SmolStr,
    leading: GreenTrivia,
    trailing: GreenTrivia,
    flags: GreenFlags,
}

/// Leaf node in the immutable tree.
///
/// A token owns the trivia around it, so the full text of a tree is the
/// concatenation of the full texts of its tokens.
#[derive(Clone)]
pub struct GreenToken {
    data: Arc<GreenTokenData>,
}

impl GreenToken {
    pub(crate) fn new(
        kind: SyntaxKind,
        text: SmolStr,
        leading: GreenTrivia,
        trailing: GreenTrivia,
    ) -> GreenToken {
        let data = GreenTokenData { kind, text, leading, trailing, flags: GreenFlags::empty() };
        GreenToken { data: Arc::new(data) }
    }

    pub(crate) fn new_missing(kind: SyntaxKind) -> GreenToken {
        let data = GreenTokenData {
            kind,
            text: SmolStr::default(),
            leading: GreenTrivia::empty(),
            trailing: GreenTrivia::empty(),
            flags: GreenFlags::IS_MISSING.with_summary(),
        };
        GreenToken { data: Arc::new(data) }
    }

    /// Kind of this Token.
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    /// Text of this Token, without trivia.
    #[inline]
    pub fn text(&self) -> &str {
        self.data.text.as_str()
    }

    #[inline]
    pub fn leading_trivia(&self) -> &GreenTrivia {
        &self.data.leading
    }

    #[inline]
    pub fn trailing_trivia(&self) -> &GreenTrivia {
        &self.data.trailing
    }

    /// Length of the text without trivia.
    #[inline]
    pub fn width(&self) -> TextSize {
        TextSize::of(self.text())
    }

    /// Length of the text including leading and trailing trivia.
    #[inline]
    pub fn full_width(&self) -> TextSize {
        self.data.leading.len() + self.width() + self.data.trailing.len()
    }

    #[inline]
    pub fn flags(&self) -> GreenFlags {
        self.data.flags
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.data.flags.contains(GreenFlags::IS_MISSING)
    }

    /// Whether both handles point to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &GreenToken) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.data) as usize
    }
}

impl PartialEq for GreenToken {
    fn eq(&self, other: &GreenToken) -> bool {
        self.ptr_eq(other) || self.data == other.data
    }
}

impl Eq for GreenToken {}

impl Hash for GreenToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state)
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenToken")
            .field("kind", &self.kind())
            .field("text", &self.text())
            .field("leading", &self.leading_trivia().to_string())
            .field("trailing", &self.trailing_trivia().to_string())
            .field("flags", &self.flags())
            .finish()
    }
}

impl fmt::Display for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.leading_trivia(), self.text(), self.trailing_trivia())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::green::TriviaPiece;

    const IDENT: SyntaxKind = SyntaxKind(1);
    const WS: SyntaxKind = SyntaxKind(2);

    #[test]
    fn full_width_counts_trivia() {
        let token = GreenToken::new(
            IDENT,
            "foo".into(),
            GreenTrivia::new(vec![TriviaPiece::new(WS, "  ")]),
            GreenTrivia::new(vec![TriviaPiece::new(WS, " ")]),
        );
        assert_eq!(token.width(), TextSize::from(3));
        assert_eq!(token.full_width(), TextSize::from(6));
        assert_eq!(token.to_string(), "  foo ");
    }

    #[test]
    fn missing_token_is_empty() {
        let token = GreenToken::new_missing(IDENT);
        assert!(token.is_missing());
        assert!(token.flags().contains(GreenFlags::CONTAINS_MISSING));
        assert_eq!(token.full_width(), TextSize::from(0));
    }

    #[test]
    fn equality_is_structural() {
        let a = GreenToken::new(IDENT, "x".into(), GreenTrivia::empty(), GreenTrivia::empty());
        let b = GreenToken::new(IDENT, "x".into(), GreenTrivia::empty(), GreenTrivia::empty());
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, GreenToken::new_missing(IDENT));
    }
}
