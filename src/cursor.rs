//! Untyped red tree: positions and parent links over green nodes.
//!
//! A [`SyntaxNode`] is created on demand while walking down from the root and
//! keeps its parent alive, so walking back up is free. Nothing here is ever
//! mutated; "editing" a node produces a new green root.
use std::{
    fmt,
    hash::{Hash, Hasher},
    iter,
    sync::Arc,
};

use countme::Count;

use crate::{
    error::{Result, SyntaxError},
    green::{GreenChild, GreenElementRef, GreenTrivia, SyntaxKind},
    Bias, Direction, GreenNode, GreenToken, NodeOrToken, TextRange, TextSize, TokenAtOffset,
    WalkEvent,
};

#[derive(Clone)]
pub struct SyntaxNode {
    data: Arc<NodeData>,
}

struct NodeData {
    parent: Option<SyntaxNode>,
    index: u32,
    offset: TextSize,
    green: GreenNode,
    _c: Count<SyntaxNode>,
}

// Identity semantics for hash & eq
impl PartialEq for SyntaxNode {
    #[inline]
    fn eq(&self, other: &SyntaxNode) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxNode")
            .field("kind", &self.kind())
            .field("full_span", &self.full_span())
            .finish()
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.green(), f)
    }
}

#[derive(Clone)]
pub struct SyntaxToken {
    parent: SyntaxNode,
    index: u32,
    offset: TextSize,
    green: GreenToken,
}

impl PartialEq for SyntaxToken {
    #[inline]
    fn eq(&self, other: &SyntaxToken) -> bool {
        self.parent == other.parent && self.index == other.index
    }
}

impl Eq for SyntaxToken {}

impl Hash for SyntaxToken {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parent.hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxToken")
            .field("kind", &self.kind())
            .field("full_span", &self.full_span())
            .field("text", &self.text())
            .finish()
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.green, f)
    }
}

pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

impl From<SyntaxNode> for SyntaxElement {
    #[inline]
    fn from(node: SyntaxNode) -> SyntaxElement {
        NodeOrToken::Node(node)
    }
}

impl From<SyntaxToken> for SyntaxElement {
    #[inline]
    fn from(token: SyntaxToken) -> SyntaxElement {
        NodeOrToken::Token(token)
    }
}

impl SyntaxNode {
    fn new(
        parent: Option<SyntaxNode>,
        index: u32,
        offset: TextSize,
        green: GreenNode,
    ) -> SyntaxNode {
        let data = NodeData { parent, index, offset, green, _c: Count::new() };
        SyntaxNode { data: Arc::new(data) }
    }

    pub fn new_root(green: GreenNode) -> SyntaxNode {
        SyntaxNode::new(None, 0, 0.into(), green)
    }

    fn key(&self) -> (usize, TextSize) {
        (self.data.green.addr(), self.offset())
    }

    /// Returns the green root of a tree in which this node is replaced by
    /// `replacement`. Only the ancestors of this node are rebuilt.
    pub fn replace_with(&self, replacement: GreenNode) -> GreenNode {
        assert_eq!(self.kind(), replacement.kind());
        match &self.data.parent {
            None => replacement,
            Some(parent) => {
                let new_parent =
                    parent.green().replace_child(self.data.index as usize, replacement.into());
                parent.replace_with(new_parent)
            }
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.green().kind()
    }

    /// Start of the full span.
    #[inline]
    pub fn offset(&self) -> TextSize {
        self.data.offset
    }

    /// Slot index of this node in its parent, `0` for the root.
    #[inline]
    pub fn index(&self) -> usize {
        self.data.index as usize
    }

    /// The range covered by this node, trivia included.
    #[inline]
    pub fn full_span(&self) -> TextRange {
        TextRange::at(self.offset(), self.green().full_width())
    }

    /// The range covered by this node without the leading trivia of its
    /// first token and the trailing trivia of its last token.
    pub fn span(&self) -> TextRange {
        let full = self.full_span();
        match self.green().edge_trivia() {
            Some((leading, trailing)) => {
                TextRange::new(full.start() + leading, full.end() - trailing)
            }
            None => TextRange::empty(full.start()),
        }
    }

    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    #[inline]
    pub fn parent(&self) -> Option<SyntaxNode> {
        self.data.parent.clone()
    }

    #[inline]
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        iter::successors(Some(self.clone()), SyntaxNode::parent)
    }

    /// Number of slots, empty ones included.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.green().slot_count()
    }

    /// The element in slot `index`, `Ok(None)` if the slot is empty.
    pub fn child(&self, index: usize) -> Result<Option<SyntaxElement>> {
        let len = self.child_count();
        let child = self
            .green()
            .children_raw()
            .nth(index)
            .ok_or(SyntaxError::IndexOutOfRange { index, len })?;
        Ok(self.child_element(index, child))
    }

    fn child_element(&self, index: usize, child: &GreenChild) -> Option<SyntaxElement> {
        let green = child.element()?;
        let offset = self.offset() + child.rel_offset();
        Some(SyntaxElement::new(green, self.clone(), index as u32, offset))
    }

    #[inline]
    pub fn children(&self) -> SyntaxNodeChildren {
        SyntaxNodeChildren::new(self.clone())
    }

    #[inline]
    pub fn children_with_tokens(&self) -> SyntaxElementChildren {
        SyntaxElementChildren::new(self.clone())
    }

    pub fn first_child(&self) -> Option<SyntaxNode> {
        self.children().next()
    }
    pub fn last_child(&self) -> Option<SyntaxNode> {
        self.children_with_tokens().rev().find_map(NodeOrToken::into_node)
    }

    pub fn first_child_or_token(&self) -> Option<SyntaxElement> {
        self.children_with_tokens().next()
    }
    pub fn last_child_or_token(&self) -> Option<SyntaxElement> {
        self.children_with_tokens().rev().next()
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode> {
        self.siblings_with_tokens(Direction::Next).skip(1).find_map(NodeOrToken::into_node)
    }
    pub fn prev_sibling(&self) -> Option<SyntaxNode> {
        self.siblings_with_tokens(Direction::Prev).skip(1).find_map(NodeOrToken::into_node)
    }

    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement> {
        let parent = self.data.parent.as_ref()?;
        parent.next_child_after(self.index())
    }
    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement> {
        let parent = self.data.parent.as_ref()?;
        parent.prev_child_before(self.index())
    }

    fn next_child_after(&self, index: usize) -> Option<SyntaxElement> {
        self.green()
            .children_raw()
            .enumerate()
            .skip(index + 1)
            .find_map(|(index, child)| self.child_element(index, child))
    }
    fn prev_child_before(&self, index: usize) -> Option<SyntaxElement> {
        self.green()
            .children_raw()
            .enumerate()
            .take(index)
            .rev()
            .find_map(|(index, child)| self.child_element(index, child))
    }

    /// First token in this subtree, missing tokens included.
    pub fn first_token(&self) -> Option<SyntaxToken> {
        self.children_with_tokens().find_map(|it| it.first_token())
    }
    pub fn last_token(&self) -> Option<SyntaxToken> {
        self.children_with_tokens().rev().find_map(|it| it.last_token())
    }

    /// All tokens of this subtree in source order.
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> {
        self.descendants_with_tokens().filter_map(NodeOrToken::into_token)
    }

    #[inline]
    pub fn siblings(&self, direction: Direction) -> impl Iterator<Item = SyntaxNode> {
        iter::successors(Some(self.clone()), move |node| match direction {
            Direction::Next => node.next_sibling(),
            Direction::Prev => node.prev_sibling(),
        })
    }

    #[inline]
    pub fn siblings_with_tokens(
        &self,
        direction: Direction,
    ) -> impl Iterator<Item = SyntaxElement> {
        let me: SyntaxElement = self.clone().into();
        iter::successors(Some(me), move |el| match direction {
            Direction::Next => el.next_sibling_or_token(),
            Direction::Prev => el.prev_sibling_or_token(),
        })
    }

    #[inline]
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    #[inline]
    pub fn descendants_with_tokens(&self) -> impl Iterator<Item = SyntaxElement> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::Enter(it) => Some(it),
            WalkEvent::Leave(_) => None,
        })
    }

    #[inline]
    pub fn preorder(&self) -> Preorder {
        Preorder::new(self.clone())
    }

    pub fn preorder_with_tokens(&self) -> impl Iterator<Item = WalkEvent<SyntaxElement>> {
        let start: SyntaxElement = self.clone().into();
        iter::successors(Some(WalkEvent::Enter(start.clone())), move |pos| {
            let next = match pos {
                WalkEvent::Enter(el) => match el {
                    NodeOrToken::Node(node) => match node.first_child_or_token() {
                        Some(child) => WalkEvent::Enter(child),
                        None => WalkEvent::Leave(node.clone().into()),
                    },
                    NodeOrToken::Token(token) => WalkEvent::Leave(token.clone().into()),
                },
                WalkEvent::Leave(el) => {
                    if el == &start {
                        return None;
                    }
                    match el.next_sibling_or_token() {
                        Some(sibling) => WalkEvent::Enter(sibling),
                        None => WalkEvent::Leave(el.parent()?.into()),
                    }
                }
            };
            Some(next)
        })
    }

    /// Tokens whose full span touches `offset`. Zero-width tokens are never
    /// returned.
    ///
    /// # Panics
    ///
    /// If `offset` is outside of the full span of this node.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        let range = self.full_span();
        assert!(
            range.start() <= offset && offset <= range.end(),
            "Bad offset: range {:?} offset {:?}",
            range,
            offset
        );
        if range.is_empty() {
            return TokenAtOffset::None;
        }

        let mut children = self.children_with_tokens().filter(|child| {
            let child_range = child.full_span();
            !child_range.is_empty()
                && (child_range.start() <= offset && offset <= child_range.end())
        });

        let left = match children.next() {
            Some(it) => it,
            None => return TokenAtOffset::None,
        };
        let right = match children.next() {
            Some(it) => it,
            None => return left.token_at_offset(offset),
        };
        let left = left.token_at_offset(offset).left_biased();
        let right = right.token_at_offset(offset).right_biased();
        match (left, right) {
            (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
            (Some(it), None) | (None, Some(it)) => TokenAtOffset::Single(it),
            (None, None) => TokenAtOffset::None,
        }
    }

    /// The most specific element at `offset`. On a boundary between two
    /// tokens `bias` picks the one ending (`Left`) or starting (`Right`)
    /// there.
    pub fn find(&self, offset: TextSize, bias: Bias) -> Result<SyntaxElement> {
        let range = self.full_span();
        if !range.contains_inclusive(offset) {
            return Err(SyntaxError::OffsetOutOfRange { offset, range });
        }
        Ok(match self.token_at_offset(offset).biased(bias) {
            Some(token) => token.into(),
            None => self.clone().into(),
        })
    }

    /// The smallest element whose full span contains `range`.
    ///
    /// # Panics
    ///
    /// If `range` is not inside of this node.
    pub fn covering_element(&self, range: TextRange) -> SyntaxElement {
        let mut res: SyntaxElement = self.clone().into();
        loop {
            assert!(
                res.full_span().contains_range(range),
                "Bad range: node range {:?}, range {:?}",
                res.full_span(),
                range,
            );
            res = match &res {
                NodeOrToken::Token(_) => return res,
                NodeOrToken::Node(node) => match node.child_or_token_at_range(range) {
                    Some(it) => it,
                    None => return res,
                },
            };
        }
    }

    pub fn child_or_token_at_range(&self, range: TextRange) -> Option<SyntaxElement> {
        let rel_range = range.checked_sub(self.offset())?;
        self.green().child_at_range(rel_range).map(|(index, rel_offset, green)| {
            SyntaxElement::new(green, self.clone(), index as u32, self.offset() + rel_offset)
        })
    }
}

impl SyntaxToken {
    fn new(green: GreenToken, parent: SyntaxNode, index: u32, offset: TextSize) -> SyntaxToken {
        SyntaxToken { parent, index, offset, green }
    }

    /// Returns the green root of a tree in which this token is replaced by
    /// `replacement`.
    pub fn replace_with(&self, replacement: GreenToken) -> GreenNode {
        assert_eq!(self.kind(), replacement.kind());
        let new_parent = self.parent.green().replace_child(self.index(), replacement.into());
        self.parent.replace_with(new_parent)
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    /// Start of the full span.
    #[inline]
    pub fn offset(&self) -> TextSize {
        self.offset
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn full_span(&self) -> TextRange {
        TextRange::at(self.offset, self.green.full_width())
    }

    /// The range of the token text, without trivia.
    #[inline]
    pub fn span(&self) -> TextRange {
        TextRange::at(self.offset + self.green.leading_trivia().len(), self.green.width())
    }

    /// Token text without trivia.
    #[inline]
    pub fn text(&self) -> &str {
        self.green.text()
    }

    #[inline]
    pub fn leading_trivia(&self) -> &GreenTrivia {
        self.green.leading_trivia()
    }

    #[inline]
    pub fn trailing_trivia(&self) -> &GreenTrivia {
        self.green.trailing_trivia()
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.green.is_missing()
    }

    #[inline]
    pub fn green(&self) -> &GreenToken {
        &self.green
    }

    #[inline]
    pub fn parent(&self) -> SyntaxNode {
        self.parent.clone()
    }

    #[inline]
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        self.parent().ancestors()
    }

    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement> {
        self.parent.next_child_after(self.index())
    }
    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement> {
        self.parent.prev_child_before(self.index())
    }

    pub fn siblings_with_tokens(
        &self,
        direction: Direction,
    ) -> impl Iterator<Item = SyntaxElement> {
        let me: SyntaxElement = self.clone().into();
        iter::successors(Some(me), move |el| match direction {
            Direction::Next => el.next_sibling_or_token(),
            Direction::Prev => el.prev_sibling_or_token(),
        })
    }

    /// The next token in the whole tree, skipping nodes without tokens.
    pub fn next_token(&self) -> Option<SyntaxToken> {
        let mut el: SyntaxElement = self.clone().into();
        loop {
            match el.next_sibling_or_token() {
                Some(sibling) => {
                    if let Some(token) = sibling.first_token() {
                        return Some(token);
                    }
                    el = sibling;
                }
                None => el = el.parent()?.into(),
            }
        }
    }
    pub fn prev_token(&self) -> Option<SyntaxToken> {
        let mut el: SyntaxElement = self.clone().into();
        loop {
            match el.prev_sibling_or_token() {
                Some(sibling) => {
                    if let Some(token) = sibling.last_token() {
                        return Some(token);
                    }
                    el = sibling;
                }
                None => el = el.parent()?.into(),
            }
        }
    }
}

impl SyntaxElement {
    fn new(
        element: GreenElementRef<'_>,
        parent: SyntaxNode,
        index: u32,
        offset: TextSize,
    ) -> SyntaxElement {
        match element {
            NodeOrToken::Node(node) => {
                SyntaxNode::new(Some(parent), index, offset, node.clone()).into()
            }
            NodeOrToken::Token(token) => {
                SyntaxToken::new(token.clone(), parent, index, offset).into()
            }
        }
    }

    #[inline]
    pub fn full_span(&self) -> TextRange {
        match self {
            NodeOrToken::Node(it) => it.full_span(),
            NodeOrToken::Token(it) => it.full_span(),
        }
    }

    #[inline]
    pub fn span(&self) -> TextRange {
        match self {
            NodeOrToken::Node(it) => it.span(),
            NodeOrToken::Token(it) => it.span(),
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(it) => it.kind(),
            NodeOrToken::Token(it) => it.kind(),
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        match self {
            NodeOrToken::Node(it) => it.index(),
            NodeOrToken::Token(it) => it.index(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<SyntaxNode> {
        match self {
            NodeOrToken::Node(it) => it.parent(),
            NodeOrToken::Token(it) => Some(it.parent()),
        }
    }

    #[inline]
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        match self {
            NodeOrToken::Node(it) => it.ancestors(),
            NodeOrToken::Token(it) => it.parent().ancestors(),
        }
    }

    pub fn first_token(&self) -> Option<SyntaxToken> {
        match self {
            NodeOrToken::Node(it) => it.first_token(),
            NodeOrToken::Token(it) => Some(it.clone()),
        }
    }
    pub fn last_token(&self) -> Option<SyntaxToken> {
        match self {
            NodeOrToken::Node(it) => it.last_token(),
            NodeOrToken::Token(it) => Some(it.clone()),
        }
    }

    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement> {
        match self {
            NodeOrToken::Node(it) => it.next_sibling_or_token(),
            NodeOrToken::Token(it) => it.next_sibling_or_token(),
        }
    }
    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement> {
        match self {
            NodeOrToken::Node(it) => it.prev_sibling_or_token(),
            NodeOrToken::Token(it) => it.prev_sibling_or_token(),
        }
    }

    fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        assert!(self.full_span().start() <= offset && offset <= self.full_span().end());
        match self {
            NodeOrToken::Token(token) => TokenAtOffset::Single(token.clone()),
            NodeOrToken::Node(node) => node.token_at_offset(offset),
        }
    }
}

/// Walks the non-empty slots of a node, in either direction.
#[derive(Clone, Debug)]
struct Iter {
    parent: SyntaxNode,
    front: usize,
    back: usize,
}

impl Iter {
    fn new(parent: SyntaxNode) -> Iter {
        let back = parent.child_count();
        Iter { parent, front: 0, back }
    }
    fn next_element(&mut self) -> Option<SyntaxElement> {
        while self.front < self.back {
            let index = self.front;
            self.front += 1;
            let child = self.parent.green().children_raw().nth(index)?;
            if let Some(element) = self.parent.child_element(index, child) {
                return Some(element);
            }
        }
        None
    }
    fn next_back_element(&mut self) -> Option<SyntaxElement> {
        while self.front < self.back {
            self.back -= 1;
            let index = self.back;
            let child = self.parent.green().children_raw().nth(index)?;
            if let Some(element) = self.parent.child_element(index, child) {
                return Some(element);
            }
        }
        None
    }
    fn next_node(&mut self) -> Option<SyntaxNode> {
        loop {
            if let NodeOrToken::Node(node) = self.next_element()? {
                return Some(node);
            }
        }
    }
    fn next_back_node(&mut self) -> Option<SyntaxNode> {
        loop {
            if let NodeOrToken::Node(node) = self.next_back_element()? {
                return Some(node);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct SyntaxNodeChildren(Iter);

impl SyntaxNodeChildren {
    fn new(parent: SyntaxNode) -> SyntaxNodeChildren {
        SyntaxNodeChildren(Iter::new(parent))
    }
}

impl Iterator for SyntaxNodeChildren {
    type Item = SyntaxNode;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_node()
    }
}

impl DoubleEndedIterator for SyntaxNodeChildren {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back_node()
    }
}

#[derive(Clone, Debug)]
pub struct SyntaxElementChildren(Iter);

impl SyntaxElementChildren {
    fn new(parent: SyntaxNode) -> SyntaxElementChildren {
        SyntaxElementChildren(Iter::new(parent))
    }
}

impl Iterator for SyntaxElementChildren {
    type Item = SyntaxElement;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_element()
    }
}

impl DoubleEndedIterator for SyntaxElementChildren {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back_element()
    }
}

pub struct Preorder {
    root: SyntaxNode,
    next: Option<WalkEvent<SyntaxNode>>,
    skip_subtree: bool,
}

impl Preorder {
    fn new(root: SyntaxNode) -> Preorder {
        let next = Some(WalkEvent::Enter(root.clone()));
        Preorder { root, next, skip_subtree: false }
    }

    pub fn skip_subtree(&mut self) {
        self.skip_subtree = true;
    }
    #[cold]
    fn do_skip(&mut self) {
        self.next = self.next.take().and_then(|next| match next {
            WalkEvent::Enter(first_child) => first_child.parent().map(WalkEvent::Leave),
            WalkEvent::Leave(parent) => Some(WalkEvent::Leave(parent)),
        })
    }
}

impl Iterator for Preorder {
    type Item = WalkEvent<SyntaxNode>;

    fn next(&mut self) -> Option<WalkEvent<SyntaxNode>> {
        if self.skip_subtree {
            self.do_skip();
            self.skip_subtree = false;
        }
        let next = self.next.take();
        self.next = next.as_ref().and_then(|next| {
            Some(match next {
                WalkEvent::Enter(node) => match node.first_child() {
                    Some(child) => WalkEvent::Enter(child),
                    None => WalkEvent::Leave(node.clone()),
                },
                WalkEvent::Leave(node) => {
                    if node == &self.root {
                        return None;
                    }
                    match node.next_sibling() {
                        Some(sibling) => WalkEvent::Enter(sibling),
                        None => WalkEvent::Leave(node.parent()?),
                    }
                }
            })
        });
        next
    }
}
