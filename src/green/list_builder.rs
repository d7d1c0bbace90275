use crate::green::{GreenElement, GreenNode};

/// Staging buffer for the children of a list.
///
/// The builder is only used while a list is being parsed. Freezing it with
/// [`SyntaxListBuilder::to_list_node`] copies the children out, so the
/// builder can be cleared and reused right away.
#[derive(Debug, Default, Clone)]
pub struct SyntaxListBuilder {
    nodes: Vec<Option<GreenElement>>,
    count: usize,
}

impl SyntaxListBuilder {
    pub fn new() -> SyntaxListBuilder {
        SyntaxListBuilder::default()
    }

    pub fn with_capacity(capacity: usize) -> SyntaxListBuilder {
        SyntaxListBuilder { nodes: Vec::with_capacity(capacity), count: 0 }
    }

    #[inline]
    pub fn add(&mut self, element: impl Into<GreenElement>) -> &mut SyntaxListBuilder {
        self.add_optional(Some(element.into()))
    }

    /// Empty entries are kept in the buffer and compacted away on freeze.
    #[inline]
    pub fn add_optional(&mut self, element: Option<GreenElement>) -> &mut SyntaxListBuilder {
        if element.is_some() {
            self.count += 1;
        }
        self.nodes.push(element);
        self
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = GreenElement>) {
        for element in elements {
            self.add(element);
        }
    }

    /// Number of non-empty entries.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.count = 0;
    }

    /// The non-empty entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &GreenElement> + '_ {
        self.nodes.iter().flatten()
    }

    /// Freezes the current contents: nothing for an empty builder, the
    /// element itself for a single entry, a list node otherwise.
    pub fn to_list_node(&self) -> Option<GreenElement> {
        match self.count {
            0 => None,
            1 => self.iter().next().cloned(),
            _ => Some(GreenNode::new_list(self.iter().cloned()).into()),
        }
    }
}

/// Free list of cleared builders, so parsing many small lists does not
/// allocate a buffer for each one.
#[derive(Debug, Default)]
pub struct SyntaxListPool {
    free: Vec<SyntaxListBuilder>,
}

impl SyntaxListPool {
    const FREE_LIST_LEN: usize = 128;

    pub fn new() -> SyntaxListPool {
        SyntaxListPool::default()
    }

    pub fn allocate(&mut self) -> SyntaxListBuilder {
        self.free.pop().unwrap_or_else(|| SyntaxListBuilder::with_capacity(8))
    }

    pub fn free(&mut self, mut builder: SyntaxListBuilder) {
        if self.free.len() < Self::FREE_LIST_LEN {
            builder.clear();
            self.free.push(builder);
        }
    }
}
