//! Calc, a toy language with blocks, `let` statements and arithmetic.
//!
//! ```text
//! let x = 1 + 2 * y; // comment
//! { x; { (x + 1) * 2; } }
//! ```
#![allow(dead_code)]

use greenwood::{
    GreenElement, GreenFactory, GreenNode, GreenToken, GreenTrivia, IncrementalParser, Language,
    ParseOptions, Result, Slot, SyntaxKind, SyntaxListPool, SyntaxTree, TextEdit, TextSize,
};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum CalcKind {
    WHITESPACE = 0,
    COMMENT,
    IDENT,
    NUMBER,
    LET_KW,
    PLUS,
    STAR,
    EQ,
    SEMI,
    L_PAREN,
    R_PAREN,
    L_CURLY,
    R_CURLY,
    UNKNOWN,
    EOF,

    ROOT,
    BLOCK,
    LET_STMT,
    EXPR_STMT,
    NAME,
    NAME_REF,
    LITERAL,
    PAREN_EXPR,
    BIN_EXPR,
    ERROR,
    LIST,
}
use CalcKind::*;

const KINDS: &[CalcKind] = &[
    WHITESPACE, COMMENT, IDENT, NUMBER, LET_KW, PLUS, STAR, EQ, SEMI, L_PAREN, R_PAREN, L_CURLY,
    R_CURLY, UNKNOWN, EOF, ROOT, BLOCK, LET_STMT, EXPR_STMT, NAME, NAME_REF, LITERAL, PAREN_EXPR,
    BIN_EXPR, ERROR,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Calc {}

impl Language for Calc {
    type Kind = CalcKind;

    fn kind_from_raw(raw: SyntaxKind) -> CalcKind {
        if raw == SyntaxKind::LIST {
            return LIST;
        }
        KINDS[usize::from(raw.0)]
    }

    fn kind_to_raw(kind: CalcKind) -> SyntaxKind {
        match kind {
            LIST => SyntaxKind::LIST,
            _ => SyntaxKind(kind as u16),
        }
    }

    fn is_token(kind: CalcKind) -> bool {
        kind <= EOF
    }

    fn slots(kind: CalcKind) -> Option<&'static [Slot]> {
        use Slot::*;
        let slots: &'static [Slot] = match kind {
            ROOT => &[Optional, Required],
            BLOCK => &[Required, Optional, Required],
            LET_STMT => &[Required, Required, Required, Required, Required],
            EXPR_STMT => &[Required, Required],
            NAME | NAME_REF | LITERAL => &[Required],
            PAREN_EXPR => &[Required, Required, Required],
            BIN_EXPR => &[Required, Required, Required],
            _ => return None,
        };
        Some(slots)
    }

    fn is_error(kind: CalcKind) -> bool {
        kind == ERROR
    }
}

pub type SyntaxNode = greenwood::SyntaxNode<Calc>;
pub type SyntaxToken = greenwood::SyntaxToken<Calc>;
pub type SyntaxElement = greenwood::SyntaxElement<Calc>;

/// Lexer and parser for Calc.
///
/// A token owns the trivia after it up to and including the end of its
/// line, everything else is leading trivia of the next token.
pub struct CalcParser;

impl IncrementalParser<Calc> for CalcParser {
    /// `//` is recognized by peeking two bytes.
    const LOOKAHEAD: usize = 2;
    const EOF: CalcKind = EOF;

    fn lex_token(&self, text: &str, factory: &mut GreenFactory<'_, Calc>) -> Result<GreenToken> {
        let (leading, rest) = leading_trivia(text);
        let leading = factory.trivia(leading);

        let first = match rest.chars().next() {
            Some(it) => it,
            None => return factory.token(EOF, "", leading, GreenTrivia::empty()),
        };
        let (kind, len) = match first {
            c if c.is_ascii_alphabetic() || c == '_' => {
                let len = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                let kind = if &rest[..len] == "let" { LET_KW } else { IDENT };
                (kind, len)
            }
            c if c.is_ascii_digit() => {
                (NUMBER, rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len()))
            }
            '+' => (PLUS, 1),
            '*' => (STAR, 1),
            '=' => (EQ, 1),
            ';' => (SEMI, 1),
            '(' => (L_PAREN, 1),
            ')' => (R_PAREN, 1),
            '{' => (L_CURLY, 1),
            '}' => (R_CURLY, 1),
            c => (UNKNOWN, c.len_utf8()),
        };
        let (token, rest) = rest.split_at(len);
        let trailing = factory.trivia(trailing_trivia(rest));
        factory.token(kind, token, leading, trailing)
    }

    fn parse(
        &self,
        tokens: Vec<GreenToken>,
        factory: &mut GreenFactory<'_, Calc>,
    ) -> Result<GreenNode> {
        let mut p = Parser::new(tokens, factory);
        let stmts = p.stmt_list(false)?;
        let eof = p.expect(EOF)?;
        p.factory.node(ROOT, vec![stmts, Some(eof.into())])
    }

    fn reparse(
        &self,
        kind: CalcKind,
        tokens: &[GreenToken],
        factory: &mut GreenFactory<'_, Calc>,
    ) -> Result<Option<GreenNode>> {
        let first = tokens.first().map(|it| Calc::kind_from_raw(it.kind()));
        if kind != BLOCK || first != Some(L_CURLY) {
            return Ok(None);
        }
        let mut p = Parser::new(tokens.to_vec(), factory);
        let (block, closed) = p.block()?;
        if !closed || p.pos != p.tokens.len() {
            return Ok(None);
        }
        Ok(Some(block))
    }
}

fn leading_trivia(text: &str) -> (Vec<(CalcKind, &str)>, &str) {
    let mut pieces = Vec::new();
    let mut rest = text;
    loop {
        if rest.starts_with("//") {
            let len = rest.find('\n').unwrap_or(rest.len());
            pieces.push((COMMENT, &rest[..len]));
            rest = &rest[len..];
        } else {
            let len = rest.len() - rest.trim_start().len();
            if len == 0 {
                return (pieces, rest);
            }
            pieces.push((WHITESPACE, &rest[..len]));
            rest = &rest[len..];
        }
    }
}

fn trailing_trivia(text: &str) -> Vec<(CalcKind, &str)> {
    let mut pieces = Vec::new();
    let mut rest = text;
    loop {
        if rest.starts_with("//") {
            let len = rest.find('\n').unwrap_or(rest.len());
            pieces.push((COMMENT, &rest[..len]));
            rest = &rest[len..];
            continue;
        }
        let mut len = 0;
        let mut newline = false;
        for c in rest.chars() {
            if !c.is_whitespace() {
                break;
            }
            len += c.len_utf8();
            if c == '\n' {
                newline = true;
                break;
            }
        }
        if len == 0 {
            return pieces;
        }
        pieces.push((WHITESPACE, &rest[..len]));
        if newline {
            return pieces;
        }
        rest = &rest[len..];
    }
}

struct Parser<'f, 'i> {
    tokens: Vec<GreenToken>,
    pos: usize,
    pool: SyntaxListPool,
    factory: &'f mut GreenFactory<'i, Calc>,
}

impl<'f, 'i> Parser<'f, 'i> {
    fn new(tokens: Vec<GreenToken>, factory: &'f mut GreenFactory<'i, Calc>) -> Self {
        Parser { tokens, pos: 0, pool: SyntaxListPool::new(), factory }
    }

    fn current(&self) -> Option<CalcKind> {
        self.tokens.get(self.pos).map(|it| Calc::kind_from_raw(it.kind()))
    }

    fn at(&self, kind: CalcKind) -> bool {
        self.current() == Some(kind)
    }

    fn at_end(&self) -> bool {
        matches!(self.current(), None | Some(EOF))
    }

    fn bump(&mut self) -> Option<GreenToken> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    /// The next token if it has the given kind, a missing token otherwise.
    fn expect(&mut self, kind: CalcKind) -> Result<GreenToken> {
        if self.at(kind) {
            if let Some(token) = self.bump() {
                return Ok(token);
            }
        }
        self.factory.missing_token(kind)
    }

    fn error(&mut self) -> Result<GreenElement> {
        let junk = self.bump().map(GreenElement::from);
        Ok(self.factory.node(ERROR, vec![junk])?.into())
    }

    /// Outside of blocks a `}` is skipped as an error.
    fn stmt_list(&mut self, in_block: bool) -> Result<Option<GreenElement>> {
        let mut builder = self.pool.allocate();
        while !self.at_end() && !(in_block && self.at(R_CURLY)) {
            let stmt = self.stmt()?;
            builder.add(stmt);
        }
        let list = self.factory.list(&builder);
        self.pool.free(builder);
        Ok(list)
    }

    fn stmt(&mut self) -> Result<GreenElement> {
        match self.current() {
            Some(L_CURLY) => Ok(self.block()?.0.into()),
            Some(LET_KW) => {
                let let_kw = self.expect(LET_KW)?;
                let name = if self.at(IDENT) { Some(self.leaf(NAME)?) } else { None };
                let eq = self.expect(EQ)?;
                let expr = self.expr()?;
                let semi = self.expect(SEMI)?;
                let node = self.factory.node(
                    LET_STMT,
                    vec![Some(let_kw.into()), name, Some(eq.into()), expr, Some(semi.into())],
                )?;
                Ok(node.into())
            }
            Some(IDENT | NUMBER | L_PAREN) => {
                let expr = self.expr()?;
                let semi = self.expect(SEMI)?;
                Ok(self.factory.node(EXPR_STMT, vec![expr, Some(semi.into())])?.into())
            }
            _ => self.error(),
        }
    }

    /// Returns the block and whether its closing brace was present.
    fn block(&mut self) -> Result<(GreenNode, bool)> {
        let l_curly = self.expect(L_CURLY)?;
        let stmts = self.stmt_list(true)?;
        let r_curly = self.expect(R_CURLY)?;
        let closed = !r_curly.is_missing();
        let slots = vec![Some(l_curly.into()), stmts, Some(r_curly.into())];
        let node = self.factory.node(BLOCK, slots)?;
        Ok((node, closed))
    }

    fn leaf(&mut self, kind: CalcKind) -> Result<GreenElement> {
        let token = self.bump().map(GreenElement::from);
        Ok(self.factory.node(kind, vec![token])?.into())
    }

    fn expr(&mut self) -> Result<Option<GreenElement>> {
        self.binary(PLUS, Self::product)
    }

    fn product(&mut self) -> Result<Option<GreenElement>> {
        self.binary(STAR, Self::atom)
    }

    fn binary(
        &mut self,
        op: CalcKind,
        operand: fn(&mut Self) -> Result<Option<GreenElement>>,
    ) -> Result<Option<GreenElement>> {
        let mut lhs = operand(self)?;
        while self.at(op) {
            let op = self.bump().map(GreenElement::from);
            let rhs = operand(self)?;
            lhs = Some(self.factory.node(BIN_EXPR, vec![lhs, op, rhs])?.into());
        }
        Ok(lhs)
    }

    fn atom(&mut self) -> Result<Option<GreenElement>> {
        match self.current() {
            Some(NUMBER) => self.leaf(LITERAL).map(Some),
            Some(IDENT) => self.leaf(NAME_REF).map(Some),
            Some(L_PAREN) => {
                let l_paren = self.expect(L_PAREN)?;
                let expr = self.expr()?;
                let r_paren = self.expect(R_PAREN)?;
                let node = self
                    .factory
                    .node(PAREN_EXPR, vec![Some(l_paren.into()), expr, Some(r_paren.into())])?;
                Ok(Some(node.into()))
            }
            _ => Ok(None),
        }
    }
}

pub fn parse(text: &str) -> SyntaxTree<Calc> {
    SyntaxTree::parse(text, &CalcParser, ParseOptions::default()).unwrap()
}

pub fn parse_with(text: &str, options: ParseOptions) -> SyntaxTree<Calc> {
    SyntaxTree::parse(text, &CalcParser, options).unwrap()
}

/// Applies `edit` and checks the result against a parse from scratch.
pub fn edit(tree: &SyntaxTree<Calc>, edit: &TextEdit) -> (SyntaxTree<Calc>, greenwood::EditStats) {
    let (new, stats) = tree.apply_edit_with_stats(edit, &CalcParser).unwrap();
    let fresh = parse_with(new.text().as_str(), ParseOptions::default().interning(false));
    assert_eq!(new.root().to_string(), new.text().as_str());
    assert_eq!(
        new.green(),
        fresh.green(),
        "incremental:\n{:#?}\nfull:\n{:#?}",
        new.root(),
        fresh.root()
    );
    (new, stats)
}

pub fn token_kinds(node: &SyntaxNode) -> Vec<CalcKind> {
    node.tokens().map(|it| it.kind()).collect()
}

/// Green nodes of `tree` that are not shared with `old`.
pub fn fresh_nodes(old: &SyntaxTree<Calc>, tree: &SyntaxTree<Calc>) -> usize {
    let mut by_shape: FxHashMap<(SyntaxKind, TextSize), Vec<GreenNode>> = FxHashMap::default();
    for node in old.root().descendants() {
        let green = node.green();
        by_shape.entry((green.kind(), green.full_width())).or_default().push(green.clone());
    }
    tree.root()
        .descendants()
        .filter(|node| {
            let green = node.green();
            let candidates = by_shape.get(&(green.kind(), green.full_width()));
            !candidates.map_or(false, |it| it.iter().any(|old| old.ptr_eq(green)))
        })
        .count()
}
