//! Immutable, position-independent syntax trees with incremental reparsing.
//!
//! The tree comes in two layers. Green nodes (see [`GreenNode`]) are
//! immutable, know only their width and children, and are shared freely
//! between trees and between the old and new versions of an edited tree.
//! Red nodes (see [`SyntaxNode`]) are cheap views materialized on demand,
//! adding absolute offsets and parent links.
//!
//! [`SyntaxTree::apply_edit`] turns a text edit into a new tree that reuses
//! every green subtree the edit did not touch.
#![forbid(
    // missing_debug_implementations,
    unconditional_recursion,
    future_incompatible,
    // missing_docs,
)]
#![deny(unsafe_code)]

mod green;
pub mod cursor;
pub mod api;
pub mod ast;
mod error;
mod reparsing;
mod text;
mod tree;
mod utility_types;
#[cfg(feature = "serde1")]
mod serde_impls;


pub use text_size::{TextLen, TextRange, TextSize};

pub use crate::{
    api::{
        Language, SyntaxElement, SyntaxElementChildren, SyntaxNode, SyntaxNodeChildren,
        SyntaxToken,
    },
    error::{Result, SyntaxError},
    green::{
        GreenElement, GreenElementRef, GreenFactory, GreenFlags, GreenNode, GreenToken,
        GreenTrivia, Interner, NoInterning, NodeCache, Slot, Slots, SyntaxKind, SyntaxListBuilder,
        SyntaxListPool, TriviaPiece,
    },
    reparsing::{EditStats, IncrementalParser, Reuse},
    text::{LineCol, SourceText, TextEdit},
    tree::{ParseOptions, SyntaxTree},
    utility_types::{Bias, Direction, NodeOrToken, TokenAtOffset, WalkEvent},
};
