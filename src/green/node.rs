use std::{
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    slice,
    sync::Arc,
};

use crate::{
    error::{Result, SyntaxError},
    green::{GreenElement, GreenElementRef, GreenFlags, SyntaxKind},
    NodeOrToken, TextRange, TextSize,
};

/// One slot of a node: the element, if present, and its offset from the start
/// of the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GreenChild {
    rel_offset: TextSize,
    element: Option<GreenElement>,
}

impl GreenChild {
    #[inline]
    pub(crate) fn rel_offset(&self) -> TextSize {
        self.rel_offset
    }

    #[inline]
    pub(crate) fn element(&self) -> Option<GreenElementRef<'_>> {
        self.element.as_ref().map(NodeOrToken::as_ref)
    }

    fn rel_end(&self) -> TextSize {
        self.rel_offset + self.element.as_ref().map_or(TextSize::from(0), |it| it.full_width())
    }

    fn rel_range(&self) -> Option<TextRange> {
        let len = self.element.as_ref()?.full_width();
        Some(TextRange::at(self.rel_offset, len))
    }
}

#[derive(PartialEq, Eq)]
struct GreenNodeData {
    kind: SyntaxKind,
    full_width: TextSize,
    flags: GreenFlags,
    edge_trivia: Option<(TextSize, TextSize)>,
    children: Box<[GreenChild]>,
}

/// Internal node in the immutable tree.
///
/// A node has a fixed number of slots, any of which may be empty. Nodes know
/// their width but not their position, so the same node can be shared by
/// any number of trees.
#[derive(Clone)]
pub struct GreenNode {
    data: Arc<GreenNodeData>,
}

impl GreenNode {
    /// `own` are the flags describing this node itself, the summary flags
    /// are collected from the children.
    pub(crate) fn new(
        kind: SyntaxKind,
        slots: impl IntoIterator<Item = Option<GreenElement>>,
        own: GreenFlags,
    ) -> GreenNode {
        let mut full_width = TextSize::from(0);
        let mut flags = (own & GreenFlags::OWN).with_summary();
        let mut first_leading = None;
        let mut last_trailing = None;

        let children: Box<[GreenChild]> = slots
            .into_iter()
            .map(|element| {
                let rel_offset = full_width;
                if let Some(element) = &element {
                    full_width += element.full_width();
                    flags |= element.flags().inherited();
                    if let Some((leading, trailing)) = element.edge_trivia() {
                        first_leading.get_or_insert(leading);
                        last_trailing = Some(trailing);
                    }
                }
                GreenChild { rel_offset, element }
            })
            .collect();

        let edge_trivia = first_leading.zip(last_trailing);
        let data = GreenNodeData { kind, full_width, flags, edge_trivia, children };
        GreenNode { data: Arc::new(data) }
    }

    pub(crate) fn new_list(children: impl IntoIterator<Item = GreenElement>) -> GreenNode {
        GreenNode::new(SyntaxKind::LIST, children.into_iter().map(Some), GreenFlags::empty())
    }

    /// Same kind and own flags, different slots. The slots must keep the
    /// emptiness of the original ones.
    pub(crate) fn with_slots(
        &self,
        slots: impl IntoIterator<Item = Option<GreenElement>>,
    ) -> GreenNode {
        GreenNode::new(self.kind(), slots, self.flags() & GreenFlags::OWN)
    }

    /// Kind of this node.
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    /// Length of the text covered by this node, trivia included.
    #[inline]
    pub fn full_width(&self) -> TextSize {
        self.data.full_width
    }

    #[inline]
    pub fn flags(&self) -> GreenFlags {
        self.data.flags
    }

    /// A required slot of this node is empty.
    #[inline]
    pub fn is_missing(&self) -> bool {
        self.data.flags.contains(GreenFlags::IS_MISSING)
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.kind() == SyntaxKind::LIST
    }

    #[inline]
    pub(crate) fn edge_trivia(&self) -> Option<(TextSize, TextSize)> {
        self.data.edge_trivia
    }

    /// Number of slots, empty ones included.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.data.children.len()
    }

    /// The element in slot `index`, `Ok(None)` for an empty slot.
    pub fn slot(&self, index: usize) -> Result<Option<GreenElementRef<'_>>> {
        match self.data.children.get(index) {
            Some(child) => Ok(child.element()),
            None => Err(SyntaxError::IndexOutOfRange { index, len: self.slot_count() }),
        }
    }

    /// All slots, empty ones included.
    #[inline]
    pub fn slots(&self) -> Slots<'_> {
        Slots { raw: self.data.children.iter() }
    }

    /// Elements of the non-empty slots.
    #[inline]
    pub fn children(&self) -> impl DoubleEndedIterator<Item = GreenElementRef<'_>> + '_ {
        self.slots().flatten()
    }

    #[inline]
    pub(crate) fn children_raw(&self) -> slice::Iter<'_, GreenChild> {
        self.data.children.iter()
    }

    /// Returns a new node with the element in slot `index` replaced.
    ///
    /// # Panics
    ///
    /// If the slot does not exist or is empty.
    pub fn replace_child(&self, index: usize, new_child: GreenElement) -> GreenNode {
        assert!(
            matches!(self.data.children.get(index), Some(GreenChild { element: Some(_), .. })),
            "slot {} of {:?} is not occupied",
            index,
            self.kind()
        );
        let mut replacement = Some(new_child);
        let slots = self.slots().enumerate().map(|(i, slot)| {
            if i == index {
                replacement.take()
            } else {
                slot.map(GreenElementRef::to_owned)
            }
        });
        self.with_slots(slots)
    }

    /// The slot whose range contains `rel_range`, together with its index and
    /// relative offset. An empty range on a boundary goes to the left slot.
    pub(crate) fn child_at_range(
        &self,
        rel_range: TextRange,
    ) -> Option<(usize, TextSize, GreenElementRef<'_>)> {
        // Slot ends never decrease, so everything before `first` ends too early.
        let children = &self.data.children;
        let first = children.partition_point(|child| child.rel_end() < rel_range.end());
        children[first..]
            .iter()
            .zip(first..)
            .take_while(|(child, _)| child.rel_offset <= rel_range.start())
            .find_map(|(child, index)| {
                let range = child.rel_range()?;
                if !range.contains_range(rel_range) {
                    return None;
                }
                Some((index, child.rel_offset(), child.element()?))
            })
    }

    /// Whether both handles point to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &GreenNode) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.data) as usize
    }
}

impl PartialEq for GreenNode {
    fn eq(&self, other: &GreenNode) -> bool {
        self.ptr_eq(other) || self.data == other.data
    }
}

impl Eq for GreenNode {}

// Shallow on purpose: equal nodes always agree on kind and width.
impl Hash for GreenNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.kind.hash(state);
        self.data.full_width.hash(state);
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("full_width", &self.full_width())
            .field("slots", &self.slot_count())
            .field("flags", &self.flags())
            .finish()
    }
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for child in self.children() {
            match child {
                NodeOrToken::Node(it) => fmt::Display::fmt(it, f)?,
                NodeOrToken::Token(it) => fmt::Display::fmt(it, f)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Slots<'a> {
    raw: slice::Iter<'a, GreenChild>,
}

impl ExactSizeIterator for Slots<'_> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.raw.len()
    }
}

impl<'a> Iterator for Slots<'a> {
    type Item = Option<GreenElementRef<'a>>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.raw.next().map(GreenChild::element)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.raw.nth(n).map(GreenChild::element)
    }
}

impl<'a> DoubleEndedIterator for Slots<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.raw.next_back().map(GreenChild::element)
    }
}

impl FusedIterator for Slots<'_> {}
