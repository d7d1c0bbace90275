use std::{fmt, marker::PhantomData, sync::Arc};

use tracing::{debug, debug_span};

use crate::{
    error::{Result, SyntaxError},
    reparsing::{self, EditStats, IncrementalParser},
    Bias, GreenNode, Interner, Language, LineCol, NodeCache, SourceText, SyntaxElement,
    SyntaxNode, TextEdit, TextRange, TextSize,
};

/// Configuration of a [`SyntaxTree`], inherited by every tree derived from
/// it through an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    /// Reuse the old tree when applying edits. When off, every edit reparses
    /// the whole file.
    pub incremental: bool,
    /// Deduplicate small green nodes and tokens while parsing.
    pub interning: bool,
    /// After every incremental edit, parse the new text from scratch and
    /// panic if the trees differ.
    pub verify_incremental: bool,
}

impl Default for ParseOptions {
    fn default() -> ParseOptions {
        ParseOptions { incremental: true, interning: true, verify_incremental: false }
    }
}

impl ParseOptions {
    pub fn incremental(mut self, yes: bool) -> ParseOptions {
        self.incremental = yes;
        self
    }

    pub fn interning(mut self, yes: bool) -> ParseOptions {
        self.interning = yes;
        self
    }

    pub fn verify_incremental(mut self, yes: bool) -> ParseOptions {
        self.verify_incremental = yes;
        self
    }
}

/// A green root together with the text it was parsed from.
///
/// Trees are immutable: [`SyntaxTree::apply_edit`] returns a new tree and
/// leaves this one, and every red node obtained from it, valid.
pub struct SyntaxTree<L: Language> {
    green: GreenNode,
    text: SourceText,
    options: ParseOptions,
    _p: PhantomData<L>,
}

impl<L: Language> Clone for SyntaxTree<L> {
    fn clone(&self) -> Self {
        SyntaxTree {
            green: self.green.clone(),
            text: self.text.clone(),
            options: self.options,
            _p: PhantomData,
        }
    }
}

impl<L: Language> SyntaxTree<L> {
    /// Pairs an already built green root with its text.
    pub fn new(green: GreenNode, text: SourceText, options: ParseOptions) -> Result<SyntaxTree<L>> {
        if green.full_width() != text.len() {
            return Err(SyntaxError::WidthMismatch { green: green.full_width(), text: text.len() });
        }
        Ok(SyntaxTree { green, text, options, _p: PhantomData })
    }

    pub fn parse<P: IncrementalParser<L>>(
        text: impl Into<Arc<str>>,
        parser: &P,
        options: ParseOptions,
    ) -> Result<SyntaxTree<L>> {
        let text = SourceText::new(text);
        let _span = debug_span!("parse", len = ?text.len()).entered();
        let mut cache = NodeCache::default();
        let interner: Option<&mut dyn Interner> =
            if options.interning { Some(&mut cache) } else { None };
        let (green, _) = reparsing::full_reparse(text.as_str(), parser, interner)?;
        SyntaxTree::new(green, text, options)
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// The red root, at offset zero and without a parent.
    pub fn root(&self) -> SyntaxNode<L> {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn text(&self) -> &SourceText {
        &self.text
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn slice(&self, range: TextRange) -> Result<&str> {
        self.text.slice(range)
    }

    pub fn line_col(&self, offset: TextSize) -> Result<LineCol> {
        self.text.line_col(offset)
    }

    pub fn find(&self, offset: TextSize, bias: Bias) -> Result<SyntaxElement<L>> {
        self.root().find(offset, bias)
    }

    pub fn apply_edit<P: IncrementalParser<L>>(
        &self,
        edit: &TextEdit,
        parser: &P,
    ) -> Result<SyntaxTree<L>> {
        self.apply_edit_with_stats(edit, parser).map(|(tree, _)| tree)
    }

    /// Like [`SyntaxTree::apply_edit`], also reporting how much of the old
    /// tree was reused.
    pub fn apply_edit_with_stats<P: IncrementalParser<L>>(
        &self,
        edit: &TextEdit,
        parser: &P,
    ) -> Result<(SyntaxTree<L>, EditStats)> {
        let _span = debug_span!("apply_edit", delete = ?edit.delete, insert = ?edit.insert_len())
            .entered();
        let text = self.text.apply(edit)?;

        let (green, stats) = if self.options.incremental {
            reparsing::incremental_reparse(
                &self.root(),
                edit,
                text.as_str(),
                parser,
                self.options.interning,
            )?
        } else {
            let mut cache = NodeCache::default();
            let interner: Option<&mut dyn Interner> =
                if self.options.interning { Some(&mut cache) } else { None };
            reparsing::full_reparse(text.as_str(), parser, interner)?
        };

        assert_eq!(
            green.full_width(),
            self.green.full_width() - edit.delete.len() + edit.insert_len(),
            "edit changed the tree width inconsistently"
        );
        if self.options.verify_incremental {
            let (fresh, _) = reparsing::full_reparse(text.as_str(), parser, None)?;
            assert!(
                fresh == green,
                "incremental reparse diverged from a full parse\n\
                 incremental:\n{:#?}\nfull:\n{:#?}",
                SyntaxNode::<L>::new_root(green.clone()),
                SyntaxNode::<L>::new_root(fresh),
            );
        }
        debug!(
            reuse = ?stats.reuse,
            relexed_tokens = stats.relexed_tokens,
            fallbacks = stats.fallbacks,
            "applied edit"
        );

        let tree = SyntaxTree::new(green, text, self.options)?;
        Ok((tree, stats))
    }
}

impl<L: Language> fmt::Debug for SyntaxTree<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#?}", self.root())
        } else {
            f.debug_struct("SyntaxTree")
                .field("root", &self.root())
                .field("options", &self.options)
                .finish()
        }
    }
}

impl<L: Language> fmt::Display for SyntaxTree<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.text, f)
    }
}
