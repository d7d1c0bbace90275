use std::{fmt, sync::Arc};

use line_index::LineIndex;

use crate::{
    error::{Result, SyntaxError},
    TextRange, TextSize,
};

pub use line_index::LineCol;

/// Source text of a tree together with its line index.
///
/// Cloning is cheap, the text and the index are shared.
#[derive(Clone)]
pub struct SourceText {
    text: Arc<str>,
    lines: Arc<LineIndex>,
}

impl SourceText {
    pub fn new(text: impl Into<Arc<str>>) -> SourceText {
        let text = text.into();
        let lines = Arc::new(LineIndex::new(&text));
        SourceText { text, lines }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn len(&self) -> TextSize {
        TextSize::of(&*self.text)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The text under `range`.
    pub fn slice(&self, range: TextRange) -> Result<&str> {
        self.check_offset(range.start())?;
        self.check_offset(range.end())?;
        Ok(&self.text[range])
    }

    /// Zero-based line and byte column of `offset`.
    pub fn line_col(&self, offset: TextSize) -> Result<LineCol> {
        self.check_offset(offset)?;
        Ok(self.lines.line_col(offset))
    }

    /// Inverse of [`SourceText::line_col`].
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        self.lines.offset(line_col).filter(|&it| it <= self.len())
    }

    fn check_offset(&self, offset: TextSize) -> Result<()> {
        let len = self.len();
        if offset > len {
            return Err(SyntaxError::OffsetOutOfRange { offset, range: TextRange::up_to(len) });
        }
        if !self.text.is_char_boundary(offset.into()) {
            return Err(SyntaxError::NotCharBoundary { offset });
        }
        Ok(())
    }

    /// Checks that `edit` fits this text.
    pub fn validate(&self, edit: &TextEdit) -> Result<()> {
        let len = self.len();
        if edit.delete.end() > len {
            return Err(SyntaxError::EditOutOfBounds { edit: edit.delete, len });
        }
        self.check_offset(edit.delete.start())?;
        self.check_offset(edit.delete.end())
    }

    /// Returns the text after `edit`.
    pub fn apply(&self, edit: &TextEdit) -> Result<SourceText> {
        self.validate(edit)?;
        let mut text = String::with_capacity(
            self.text.len() - usize::from(edit.delete.len()) + edit.insert.len(),
        );
        text.push_str(&self.text[..usize::from(edit.delete.start())]);
        text.push_str(&edit.insert);
        text.push_str(&self.text[usize::from(edit.delete.end())..]);
        Ok(SourceText::new(text))
    }
}

impl fmt::Debug for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceText").field("len", &self.len()).finish()
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for SourceText {
    fn eq(&self, other: &str) -> bool {
        &*self.text == other
    }
}

impl PartialEq<&str> for SourceText {
    fn eq(&self, other: &&str) -> bool {
        &*self.text == *other
    }
}

/// Replacement of `delete` by `insert`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEdit {
    pub delete: TextRange,
    pub insert: String,
}

impl TextEdit {
    pub fn replace(range: TextRange, text: impl Into<String>) -> TextEdit {
        TextEdit { delete: range, insert: text.into() }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> TextEdit {
        TextEdit::replace(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> TextEdit {
        TextEdit::replace(range, String::new())
    }

    pub fn insert_len(&self) -> TextSize {
        TextSize::of(self.insert.as_str())
    }

    /// Maps an offset at or after the end of the deleted range into the
    /// edited text.
    pub(crate) fn shift(&self, offset: TextSize) -> TextSize {
        debug_assert!(offset >= self.delete.end());
        offset - self.delete.end() + self.delete.start() + self.insert_len()
    }
}
