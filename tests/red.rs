mod common;

use greenwood::{
    ast::{self, AstNode, AstPtr, SyntaxNodePtr},
    Bias, Direction, Language, NodeOrToken, TextEdit, TextRange, TokenAtOffset, WalkEvent,
};

use common::{CalcKind::*, *};

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn find_at_boundary_depends_on_bias() {
    let tree = parse("ab+c;");
    let left = tree.find(2.into(), Bias::Left).unwrap();
    let right = tree.find(2.into(), Bias::Right).unwrap();
    assert_eq!(left.kind(), IDENT);
    assert_eq!(left.full_span(), range(0, 2));
    assert_eq!(right.kind(), PLUS);
    assert_eq!(right.full_span(), range(2, 3));

    let inside = tree.find(1.into(), Bias::Right).unwrap();
    assert_eq!(inside.full_span(), range(0, 2));
    assert!(tree.find(6.into(), Bias::Left).is_err());
}

#[test]
fn token_at_offset_sees_both_sides() {
    let tree = parse("ab+c;");
    match tree.root().token_at_offset(2.into()) {
        TokenAtOffset::Between(left, right) => {
            assert_eq!(left.text(), "ab");
            assert_eq!(right.text(), "+");
        }
        it => panic!("expected a boundary, got {:?}", it),
    }
    assert_eq!(tree.root().token_at_offset(1.into()).count(), 1);
}

#[test]
fn same_green_at_different_positions() {
    // Interning makes both blocks one green node.
    let tree = parse("{ a; }\n{ a; }\n");
    let blocks: Vec<_> = tree.root().first_child().unwrap().children().collect();
    assert_eq!(blocks.len(), 2);
    let (first, second) = (&blocks[0], &blocks[1]);
    assert!(first.green().ptr_eq(second.green()));
    assert_ne!(first, second);
    assert_eq!(first.full_span(), range(0, 7));
    assert_eq!(second.full_span(), range(7, 14));
    assert_eq!(first.span(), range(0, 6));

    let kinds = |node: &SyntaxNode| {
        node.descendants_with_tokens().map(|it| it.kind()).collect::<Vec<_>>()
    };
    assert_eq!(kinds(first), kinds(second));
    assert_ne!(first.first_token().unwrap(), second.first_token().unwrap());
}

#[test]
fn descend_then_ascend() {
    let tree = parse("let a = (1 + 2);");
    let root = tree.root();
    let literal = root.descendants().filter(|it| it.kind() == LITERAL).last().unwrap();
    let kinds: Vec<_> = literal.ancestors().map(|it| it.kind()).collect();
    assert_eq!(kinds, vec![LITERAL, BIN_EXPR, PAREN_EXPR, LET_STMT, ROOT]);
    assert_eq!(literal.parent().unwrap().index(), 1);
    assert_eq!(root.parent(), None);
}

#[test]
fn siblings_and_preorder() {
    let tree = parse("a; b; c;");
    let list = tree.root().first_child().unwrap();
    assert_eq!(list.kind(), LIST);
    let first = list.first_child().unwrap();
    let names: Vec<_> =
        first.siblings(Direction::Next).map(|it| it.to_string().trim().to_string()).collect();
    assert_eq!(names, vec!["a;", "b;", "c;"]);
    let last = list.last_child().unwrap();
    assert_eq!(last.prev_sibling().unwrap().to_string(), "b; ");
    assert_eq!(list.children().rev().count(), 3);

    let mut depth = 0;
    let mut max_depth = 0;
    for event in tree.root().preorder_with_tokens() {
        match event {
            WalkEvent::Enter(_) => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            WalkEvent::Leave(_) => depth -= 1,
        }
    }
    assert_eq!(depth, 0);
    assert_eq!(max_depth, 5);
}

#[test]
fn covering_element_picks_the_deepest() {
    let tree = parse("let a = 1 + 22;");
    let covering = tree.root().covering_element(range(12, 14));
    assert_eq!(covering.kind(), NUMBER);
    let covering = tree.root().covering_element(range(8, 14));
    assert_eq!(covering.kind(), BIN_EXPR);
}

#[test]
fn text_mapping() {
    let tree = parse("let a = 1;\n{\n  a;\n}\n");
    let a = tree.root().descendants().find(|it| it.kind() == NAME_REF).unwrap();
    let lc = tree.line_col(a.span().start()).unwrap();
    assert_eq!((lc.line, lc.col), (2, 2));
    assert_eq!(tree.slice(a.span()).unwrap(), "a");
    assert_eq!(tree.text().offset(lc), Some(a.span().start()));
    assert!(tree.line_col(100.into()).is_err());
}

#[test]
fn trivia_pieces_are_kept() {
    let tree = parse("a; // note\n");
    let semi = tree.root().tokens().nth(1).unwrap();
    assert_eq!(semi.text(), ";");
    let kinds: Vec<_> = semi
        .trailing_trivia()
        .pieces()
        .iter()
        .map(|it| Calc::kind_from_raw(it.kind()))
        .collect();
    assert_eq!(kinds, vec![WHITESPACE, COMMENT, WHITESPACE]);
    assert_eq!(semi.trailing_trivia().to_string(), " // note\n");
    assert_eq!(semi.span(), range(1, 2));
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LetStmt(SyntaxNode);

impl AstNode for LetStmt {
    type Language = Calc;

    fn can_cast(kind: CalcKind) -> bool {
        kind == LET_STMT
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        Self::can_cast(node.kind()).then(|| LetStmt(node))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

impl LetStmt {
    fn name(&self) -> Option<String> {
        let name = self.0.children().find(|it| it.kind() == NAME)?;
        ast::token(&name, IDENT).map(|it| it.text().to_string())
    }
}

#[test]
fn ast_pointers_survive_unrelated_edits() {
    let tree = parse("let a = 1;\nlet b = 2;\n");
    let stmts = tree.root().first_child().unwrap();
    let b = stmts.children().filter_map(LetStmt::cast).nth(1).unwrap();
    assert_eq!(b.name().as_deref(), Some("b"));
    let ptr = AstPtr::new(&b);

    let (same_width, _) = edit(&tree, &TextEdit::replace(range(8, 9), "7"));
    let resolved = ptr.to_node(&same_width.root()).unwrap();
    assert_eq!(resolved.name().as_deref(), Some("b"));

    let (shifted, _) = edit(&tree, &TextEdit::insert(0.into(), "x;"));
    assert!(ptr.to_node(&shifted.root()).is_none());

    let raw: SyntaxNodePtr<Calc> = ptr.clone().into();
    assert_eq!(raw.kind(), LET_STMT);
    assert!(raw.cast::<LetStmt>().is_some());
}

#[test]
fn first_child_of_kind() {
    let tree = parse("{ let a = 1; }");
    let block = tree.root().first_child().unwrap();
    assert!(ast::child::<LetStmt>(&block).is_some());
    let l_curly = ast::token(&block, L_CURLY).unwrap();
    assert_eq!(l_curly.text(), "{");
    assert!(matches!(block.first_child_or_token(), Some(NodeOrToken::Token(_))));
}
