bitflags::bitflags! {
    /// Facts about a green element, computed once at construction.
    ///
    /// `IS_MISSING` and `IS_ERROR` describe the element itself, the
    /// `CONTAINS_*` flags summarize the whole subtree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GreenFlags: u8 {
        /// A token synthesized by the parser without source text, or a node
        /// with an empty required slot.
        const IS_MISSING = 1 << 0;
        /// A node of an error kind, e.g. a run of skipped tokens.
        const IS_ERROR = 1 << 1;
        const CONTAINS_MISSING = 1 << 2;
        const CONTAINS_DIAGNOSTICS = 1 << 3;
    }
}

impl GreenFlags {
    pub(crate) const OWN: GreenFlags = GreenFlags::IS_MISSING.union(GreenFlags::IS_ERROR);

    /// Flags a parent picks up from a child with these flags.
    pub(crate) fn inherited(self) -> GreenFlags {
        let mut res = self & (GreenFlags::CONTAINS_MISSING | GreenFlags::CONTAINS_DIAGNOSTICS);
        if self.contains(GreenFlags::IS_MISSING) {
            res |= GreenFlags::CONTAINS_MISSING;
        }
        if self.contains(GreenFlags::IS_ERROR) {
            res |= GreenFlags::CONTAINS_DIAGNOSTICS;
        }
        res
    }

    /// Own flags of an element plus the summary of its own flags.
    pub(crate) fn with_summary(self) -> GreenFlags {
        self | self.inherited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_flags_propagate_as_summaries() {
        let missing = GreenFlags::IS_MISSING.with_summary();
        assert!(missing.contains(GreenFlags::CONTAINS_MISSING));
        assert_eq!(missing.inherited(), GreenFlags::CONTAINS_MISSING);

        let error = GreenFlags::IS_ERROR.inherited();
        assert_eq!(error, GreenFlags::CONTAINS_DIAGNOSTICS);
        assert!(!error.contains(GreenFlags::IS_ERROR));
    }
}
