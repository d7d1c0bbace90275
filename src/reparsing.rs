//! Incremental reparsing.
//!
//! An edit is handled in three stages, each cheaper than the next one:
//!
//! * relex a window of tokens around the edit and, if the token kinds did not
//!   change, swap the changed tokens in place,
//! * otherwise reparse the smallest enclosing node the parser can reparse in
//!   isolation,
//! * otherwise reparse the whole file from the token stream.
//!
//! Every green node outside of the rebuilt spine is shared with the old tree.
use std::iter;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::{
    error::Result,
    green::{GreenElement, GreenElementRef},
    GreenFactory, GreenNode, GreenToken, Interner, Language, NodeCache, NodeOrToken, SyntaxNode,
    SyntaxToken, TextEdit, TextSize,
};

/// The lexer and parser of a language, as seen by the tree.
///
/// The lexer must be a pure function of the remaining text: lexing one token
/// may inspect at most [`IncrementalParser::LOOKAHEAD`] bytes past the end of
/// the token and its trivia. Parse decisions must depend on token kinds only,
/// never on token text.
pub trait IncrementalParser<L: Language> {
    /// Bytes past the end of a token the lexer may look at.
    const LOOKAHEAD: usize;

    /// Kind of the token closing every file. It takes the trailing trivia of
    /// the file as its leading trivia and may be empty.
    const EOF: L::Kind;

    /// Lexes one token, with its trivia, from the start of `text`. Any token
    /// except [`IncrementalParser::EOF`] must be non-empty.
    fn lex_token(&self, text: &str, factory: &mut GreenFactory<'_, L>) -> Result<GreenToken>;

    /// Parses a whole file. `tokens` always ends with the end-of-file token.
    fn parse(&self, tokens: Vec<GreenToken>, factory: &mut GreenFactory<'_, L>)
        -> Result<GreenNode>;

    /// Parses `tokens` as a single node of `kind`, or returns `None` if
    /// reparsing such a node in isolation could produce a different tree
    /// than a full parse.
    fn reparse(
        &self,
        kind: L::Kind,
        tokens: &[GreenToken],
        factory: &mut GreenFactory<'_, L>,
    ) -> Result<Option<GreenNode>> {
        let _ = (kind, tokens, factory);
        Ok(None)
    }
}

/// How much of the old tree an edit kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reuse {
    /// Only tokens were replaced, every node off the edited paths is shared.
    Tokens,
    /// One subtree was reparsed.
    Subtree,
    /// The file was reparsed from its tokens.
    FullReparse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditStats {
    pub reuse: Reuse,
    /// Number of tokens produced by the lexer for this edit.
    pub relexed_tokens: usize,
    /// Number of enclosing nodes whose isolated reparse was rejected.
    pub fallbacks: usize,
}

pub(crate) fn factory<'i, L: Language>(
    interner: Option<&'i mut dyn Interner>,
) -> GreenFactory<'i, L> {
    match interner {
        Some(interner) => GreenFactory::with_interner(interner),
        None => GreenFactory::without_interning(),
    }
}

/// Lexes all of `text`.
pub(crate) fn lex<L: Language, P: IncrementalParser<L>>(
    text: &str,
    parser: &P,
    factory: &mut GreenFactory<'_, L>,
) -> Result<Vec<GreenToken>> {
    let mut tokens = Vec::new();
    let mut pos = TextSize::from(0);
    loop {
        let token = lex_at(text, pos, parser, factory)?;
        pos += token.full_width();
        let eof = L::kind_from_raw(token.kind()) == P::EOF;
        tokens.push(token);
        if eof {
            break;
        }
    }
    assert_eq!(pos, TextSize::of(text), "end of file token must cover the rest of the text");
    Ok(tokens)
}

fn lex_at<L: Language, P: IncrementalParser<L>>(
    text: &str,
    pos: TextSize,
    parser: &P,
    factory: &mut GreenFactory<'_, L>,
) -> Result<GreenToken> {
    let token = parser.lex_token(&text[usize::from(pos)..], factory)?;
    let eof = L::kind_from_raw(token.kind()) == P::EOF;
    assert!(
        eof || token.full_width() > TextSize::from(0),
        "lexer made no progress at offset {:?}",
        pos
    );
    Ok(token)
}

pub(crate) fn full_reparse<L: Language, P: IncrementalParser<L>>(
    text: &str,
    parser: &P,
    interner: Option<&mut dyn Interner>,
) -> Result<(GreenNode, EditStats)> {
    let mut factory = factory(interner);
    let tokens = lex(text, parser, &mut factory)?;
    let relexed_tokens = tokens.len();
    let green = parser.parse(tokens, &mut factory)?;
    Ok((green, EditStats { reuse: Reuse::FullReparse, relexed_tokens, fallbacks: 0 }))
}

/// Old tokens replaced by an edit and the tokens replacing them.
struct Window<L: Language> {
    old: Vec<SyntaxToken<L>>,
    new: Vec<GreenToken>,
}

/// Computes the green root for `new_text`, the result of applying `edit` to
/// the text of `root`.
pub(crate) fn incremental_reparse<L: Language, P: IncrementalParser<L>>(
    root: &SyntaxNode<L>,
    edit: &TextEdit,
    new_text: &str,
    parser: &P,
    interning: bool,
) -> Result<(GreenNode, EditStats)> {
    let mut cache = NodeCache::default();
    let window = {
        let interner: Option<&mut dyn Interner> = if interning { Some(&mut cache) } else { None };
        relex(root, edit, new_text, parser, &mut factory(interner))?
    };
    let window = match window {
        Some(it) => it,
        None => {
            debug!("no tokens to relex from, reparsing everything");
            let interner = interning.then_some(&mut cache as &mut dyn Interner);
            return full_reparse(new_text, parser, interner);
        }
    };
    let relexed_tokens = window.new.len();
    trace!(
        start = ?window.old[0].full_span().start(),
        old = window.old.len(),
        new = relexed_tokens,
        "relexed window"
    );

    if let Some(green) = substitute_tokens(root, &window) {
        let stats = EditStats { reuse: Reuse::Tokens, relexed_tokens, fallbacks: 0 };
        return Ok((green, stats));
    }

    let (old, new) = trim(&window.old, &window.new);
    let first = &old[0];
    let last = &old[old.len() - 1];
    let mut fallbacks = 0;

    for candidate in lowest_common_ancestor(root, first, last).ancestors() {
        if candidate.parent().is_none() {
            break;
        }
        let mut cache = NodeCache::default();
        let mut tokens = splice_tokens(&candidate, first, last, new);
        if interning {
            cache.seed(candidate.green());
            tokens = tokens.into_iter().map(|it| cache.intern_token(it)).collect();
        }
        let interner: Option<&mut dyn Interner> = if interning { Some(&mut cache) } else { None };
        let mut candidate_factory = factory(interner);
        match parser.reparse(candidate.kind(), &tokens, &mut candidate_factory)? {
            Some(node) if node.kind() == candidate.green().kind() => {
                debug!(kind = ?candidate.kind(), fallbacks, "reparsed subtree");
                let stats = EditStats { reuse: Reuse::Subtree, relexed_tokens, fallbacks };
                return Ok((candidate.replace_with(node), stats));
            }
            _ => {
                debug!(kind = ?candidate.kind(), "isolated reparse rejected");
                fallbacks += 1;
            }
        }
    }

    debug!(fallbacks, "reparsing the whole file");
    let mut cache = NodeCache::default();
    let mut tokens = splice_tokens(root, first, last, new);
    if interning {
        cache.seed(root.green());
        tokens = tokens.into_iter().map(|it| cache.intern_token(it)).collect();
    }
    let interner: Option<&mut dyn Interner> = if interning { Some(&mut cache) } else { None };
    let green = parser.parse(tokens, &mut factory(interner))?;
    Ok((green, EditStats { reuse: Reuse::FullReparse, relexed_tokens, fallbacks }))
}

/// Relexes from the first token the edit could have affected until the new
/// tokens line up with old token boundaries again.
///
/// The window starts at the token covering `edit.start - LOOKAHEAD`: the
/// lexer never looked at the edited text while lexing the tokens before it.
/// An edit on a token boundary is therefore attributed to the token on its
/// left whenever that token was lexed with the edited text in view.
fn relex<L: Language, P: IncrementalParser<L>>(
    root: &SyntaxNode<L>,
    edit: &TextEdit,
    new_text: &str,
    parser: &P,
    factory: &mut GreenFactory<'_, L>,
) -> Result<Option<Window<L>>> {
    let lookahead = TextSize::try_from(P::LOOKAHEAD).unwrap_or(TextSize::from(u32::MAX));
    let first = edit
        .delete
        .start()
        .checked_sub(lookahead)
        .and_then(|anchor| root.token_at_offset(anchor).right_biased())
        .or_else(|| first_real_token(root));
    let first = match first {
        Some(it) => it,
        None => return Ok(None),
    };

    let mut new_pos = first.full_span().start();
    let mut old_end = first.full_span().end();
    let mut old = vec![first];
    let mut new = Vec::new();

    loop {
        let token = lex_at(new_text, new_pos, parser, factory)?;
        new_pos += token.full_width();
        let eof = L::kind_from_raw(token.kind()) == P::EOF;
        new.push(token);

        if eof {
            while let Some(next) = next_real_token(&old[old.len() - 1]) {
                old.push(next);
            }
            break;
        }

        while old_end < edit.delete.end() || edit.shift(old_end) < new_pos {
            match next_real_token(&old[old.len() - 1]) {
                Some(next) => {
                    old_end = next.full_span().end();
                    old.push(next);
                }
                None => break,
            }
        }

        let in_sync = old_end >= edit.delete.end() && edit.shift(old_end) == new_pos;
        if in_sync && old[old.len() - 1].kind() != P::EOF {
            break;
        }
    }

    Ok(Some(Window { old, new }))
}

fn first_real_token<L: Language>(root: &SyntaxNode<L>) -> Option<SyntaxToken<L>> {
    root.tokens().find(|it| !it.is_missing())
}

fn next_real_token<L: Language>(token: &SyntaxToken<L>) -> Option<SyntaxToken<L>> {
    iter::successors(token.next_token(), SyntaxToken::next_token).find(|it| !it.is_missing())
}

/// Replaces the tokens of the window in place if the token kinds did not
/// change. Tokens equal to the old ones keep the old objects.
fn substitute_tokens<L: Language>(root: &SyntaxNode<L>, window: &Window<L>) -> Option<GreenNode> {
    if window.old.len() != window.new.len()
        || window.old.iter().zip(&window.new).any(|(old, new)| old.green().kind() != new.kind())
    {
        return None;
    }
    let edits: Vec<(Vec<u32>, GreenToken)> = window
        .old
        .iter()
        .zip(&window.new)
        .filter(|(old, new)| old.green() != *new)
        .map(|(old, new)| (index_path(old), new.clone()))
        .collect();
    if edits.is_empty() {
        return Some(root.green().clone());
    }
    Some(rebuild(root.green(), 0, &edits))
}

/// Slot indices leading from the root to `token`.
fn index_path<L: Language>(token: &SyntaxToken<L>) -> Vec<u32> {
    let mut path = vec![token.index() as u32];
    path.extend(
        token.ancestors().filter(|it| it.parent().is_some()).map(|it| it.index() as u32),
    );
    path.reverse();
    path
}

/// `edits` are sorted by path, as tokens come in source order.
fn rebuild(node: &GreenNode, depth: usize, edits: &[(Vec<u32>, GreenToken)]) -> GreenNode {
    let mut slots: Vec<Option<GreenElement>> =
        node.slots().map(|it| it.map(GreenElementRef::to_owned)).collect();
    for group in edits.chunk_by(|a, b| a.0[depth] == b.0[depth]) {
        let index = group[0].0[depth] as usize;
        let replacement = match &slots[index] {
            Some(NodeOrToken::Node(child)) => NodeOrToken::Node(rebuild(child, depth + 1, group)),
            _ => NodeOrToken::Token(group[0].1.clone()),
        };
        slots[index] = Some(replacement);
    }
    node.with_slots(slots)
}

/// Drops leading and trailing tokens that did not change, keeping at least
/// one old token.
fn trim<'a, L: Language>(
    old: &'a [SyntaxToken<L>],
    new: &'a [GreenToken],
) -> (&'a [SyntaxToken<L>], &'a [GreenToken]) {
    let mut prefix = 0;
    while prefix + 1 < old.len() && prefix < new.len() && old[prefix].green() == &new[prefix] {
        prefix += 1;
    }
    let mut suffix = 0;
    while prefix + suffix + 1 < old.len()
        && prefix + suffix < new.len()
        && old[old.len() - 1 - suffix].green() == &new[new.len() - 1 - suffix]
    {
        suffix += 1;
    }
    (&old[prefix..old.len() - suffix], &new[prefix..new.len() - suffix])
}

fn lowest_common_ancestor<L: Language>(
    root: &SyntaxNode<L>,
    first: &SyntaxToken<L>,
    last: &SyntaxToken<L>,
) -> SyntaxNode<L> {
    let ancestors: FxHashSet<SyntaxNode<L>> = first.ancestors().collect();
    last.ancestors().find(|it| ancestors.contains(it)).unwrap_or_else(|| root.clone())
}

/// The real tokens of `node`, with the run from `first` to `last` replaced by
/// `new`.
fn splice_tokens<L: Language>(
    node: &SyntaxNode<L>,
    first: &SyntaxToken<L>,
    last: &SyntaxToken<L>,
    new: &[GreenToken],
) -> Vec<GreenToken> {
    let mut tokens = node.tokens().filter(|it| !it.is_missing());
    let mut res: Vec<GreenToken> =
        tokens.by_ref().take_while(|it| it != first).map(|it| it.green().clone()).collect();
    res.extend(new.iter().cloned());
    if first != last {
        for token in tokens.by_ref() {
            if &token == last {
                break;
            }
        }
    }
    res.extend(tokens.map(|it| it.green().clone()));
    res
}
