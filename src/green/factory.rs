use std::{fmt, marker::PhantomData};

use crate::{
    api::Language,
    error::{Result, SyntaxError},
    green::{
        GreenElement, GreenFlags, GreenNode, GreenToken, GreenTrivia, Interner, NoInterning,
        NodeCache, Slot, SyntaxListBuilder, TriviaPiece,
    },
    NodeOrToken,
};

enum InternerSlot<'i> {
    Owned(Box<dyn Interner + 'i>),
    Borrowed(&'i mut dyn Interner),
}

/// Checked construction of green elements for the language `L`.
///
/// Every element built here has a valid kind and the arity its kind
/// prescribes; misuse is reported as a [`SyntaxError`] instead of producing
/// a malformed tree.
pub struct GreenFactory<'i, L: Language> {
    interner: InternerSlot<'i>,
    _p: PhantomData<fn() -> L>,
}

impl<L: Language> Default for GreenFactory<'_, L> {
    fn default() -> Self {
        GreenFactory::new()
    }
}

impl<L: Language> fmt::Debug for GreenFactory<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = match self.interner {
            InternerSlot::Owned(_) => "owned",
            InternerSlot::Borrowed(_) => "borrowed",
        };
        f.debug_struct("GreenFactory").field("interner", &interner).finish()
    }
}

impl<'i, L: Language> GreenFactory<'i, L> {
    /// A factory deduplicating through its own [`NodeCache`].
    pub fn new() -> GreenFactory<'i, L> {
        GreenFactory::from_slot(InternerSlot::Owned(Box::new(NodeCache::default())))
    }

    /// A factory sharing an external interner, e.g. a cache seeded with the
    /// previous version of a tree.
    pub fn with_interner(interner: &'i mut dyn Interner) -> GreenFactory<'i, L> {
        GreenFactory::from_slot(InternerSlot::Borrowed(interner))
    }

    pub fn without_interning() -> GreenFactory<'i, L> {
        GreenFactory::from_slot(InternerSlot::Owned(Box::new(NoInterning)))
    }

    fn from_slot(interner: InternerSlot<'i>) -> GreenFactory<'i, L> {
        GreenFactory { interner, _p: PhantomData }
    }

    fn interner(&mut self) -> &mut dyn Interner {
        match &mut self.interner {
            InternerSlot::Owned(it) => it.as_mut(),
            InternerSlot::Borrowed(it) => &mut **it,
        }
    }

    /// Creates a token. Its full width is the length of the trivia plus the
    /// length of `text`.
    pub fn token(
        &mut self,
        kind: L::Kind,
        text: &str,
        leading: GreenTrivia,
        trailing: GreenTrivia,
    ) -> Result<GreenToken> {
        check_token_kind::<L>(kind)?;
        let token = GreenToken::new(L::kind_to_raw(kind), text.into(), leading, trailing);
        Ok(self.interner().intern_token(token))
    }

    /// Creates a zero-width token standing in for one the parser expected
    /// but did not find.
    pub fn missing_token(&mut self, kind: L::Kind) -> Result<GreenToken> {
        check_token_kind::<L>(kind)?;
        Ok(self.interner().intern_token(GreenToken::new_missing(L::kind_to_raw(kind))))
    }

    /// Trivia made of `(kind, text)` pieces. Empty pieces are dropped.
    pub fn trivia<'t>(&self, pieces: impl IntoIterator<Item = (L::Kind, &'t str)>) -> GreenTrivia {
        GreenTrivia::new(
            pieces.into_iter().map(|(kind, text)| TriviaPiece::new(L::kind_to_raw(kind), text)),
        )
    }

    /// Creates a node from its slots in source order.
    ///
    /// Kinds with a fixed shape must get exactly one entry per slot; an empty
    /// required slot marks the node as missing.
    pub fn node(
        &mut self,
        kind: L::Kind,
        slots: impl IntoIterator<Item = Option<GreenElement>>,
    ) -> Result<GreenNode> {
        if L::is_token(kind) {
            return Err(SyntaxError::NotANodeKind { kind: format!("{:?}", kind) });
        }
        let slots: Vec<Option<GreenElement>> = slots.into_iter().collect();
        let mut own = GreenFlags::empty();
        if let Some(shape) = L::slots(kind) {
            if shape.len() != slots.len() {
                return Err(SyntaxError::ArityMismatch {
                    kind: format!("{:?}", kind),
                    expected: shape.len(),
                    found: slots.len(),
                });
            }
            let missing = shape
                .iter()
                .zip(slots.iter())
                .any(|(shape, slot)| *shape == Slot::Required && slot.is_none());
            own.set(GreenFlags::IS_MISSING, missing);
        }
        own.set(GreenFlags::IS_ERROR, L::is_error(kind));
        let node = GreenNode::new(L::kind_to_raw(kind), slots, own);
        Ok(self.interner().intern_node(node))
    }

    /// Convenience for nodes whose slots are all filled.
    pub fn node_from_children(
        &mut self,
        kind: L::Kind,
        children: impl IntoIterator<Item = GreenElement>,
    ) -> Result<GreenNode> {
        self.node(kind, children.into_iter().map(Some))
    }

    /// Freezes `builder` into a list, see [`SyntaxListBuilder::to_list_node`].
    pub fn list(&mut self, builder: &SyntaxListBuilder) -> Option<GreenElement> {
        match builder.to_list_node()? {
            NodeOrToken::Node(node) if node.is_list() => {
                Some(self.interner().intern_node(node).into())
            }
            element => Some(element),
        }
    }
}

fn check_token_kind<L: Language>(kind: L::Kind) -> Result<()> {
    if L::is_token(kind) {
        Ok(())
    } else {
        Err(SyntaxError::InvalidTokenKind { kind: format!("{:?}", kind) })
    }
}
