use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{
    api::{Language, SyntaxNode, SyntaxToken},
    NodeOrToken,
};

impl<L: Language> Serialize for SyntaxNode<L> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let missing = self.green().is_missing();
        let mut state = serializer.serialize_map(Some(if missing { 4 } else { 3 }))?;
        state.serialize_entry("kind", format!("{:?}", self.kind()).as_str())?;
        state.serialize_entry("full_span", &self.full_span())?;
        if missing {
            state.serialize_entry("missing", &true)?;
        }
        state.serialize_entry("children", &Children(self))?;
        state.end()
    }
}

impl<L: Language> Serialize for SyntaxToken<L> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_missing() {
            let mut state = serializer.serialize_map(Some(3))?;
            state.serialize_entry("kind", format!("{:?}", self.kind()).as_str())?;
            state.serialize_entry("full_span", &self.full_span())?;
            state.serialize_entry("missing", &true)?;
            return state.end();
        }
        let mut state = serializer.serialize_map(Some(4))?;
        state.serialize_entry("kind", format!("{:?}", self.kind()).as_str())?;
        state.serialize_entry("full_span", &self.full_span())?;
        state.serialize_entry("span", &self.span())?;
        state.serialize_entry("text", self.text())?;
        state.end()
    }
}

struct Children<T>(T);

impl<L: Language> Serialize for Children<&'_ SyntaxNode<L>> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_seq(None)?;
        self.0.children_with_tokens().try_for_each(|element| match element {
            NodeOrToken::Node(it) => state.serialize_element(&it),
            NodeOrToken::Token(it) => state.serialize_element(&it),
        })?;
        state.end()
    }
}
