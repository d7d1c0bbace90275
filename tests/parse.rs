mod common;

use std::{
    fs,
    path::{Path, PathBuf},
};

use expect_test::expect_file;
use greenwood::{TextLen, TextSize};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use common::*;

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "calc" {
                    let expected = path.with_extension("tree");
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, expected, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

#[test]
fn tree_dumps() {
    let cases = TestCase::list();
    assert!(!cases.is_empty());
    for case in cases {
        let tree = parse(&case.text);
        assert_eq!(tree.root().to_string(), case.text, "{}", case.input.display());
        let actual = format!("{:#?}", tree.root());
        expect_file![&case.expected].assert_eq(&actual);
    }
}

const FRAGMENTS: &[&str] = &[
    "a", "b1", "_c", "1", "42", "let", " ", "  ", "\n", "\t", "+", "*", "=", ";", "(", ")", "{",
    "}", "// note", "/", "?", "é",
];

fn random_text(rng: &mut Xoshiro256StarStar, len: usize) -> String {
    (0..len).map(|_| *FRAGMENTS.choose(rng).unwrap()).collect()
}

#[test]
fn random_inputs_are_lossless() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let len = rng.gen_range(0..40);
        let text = random_text(&mut rng, len);
        let tree = parse(&text);

        let mut reconstructed = String::new();
        let mut width = TextSize::from(0);
        for token in tree.root().tokens() {
            assert_eq!(token.full_span().start(), width);
            width += token.full_span().len();
            reconstructed.push_str(&token.to_string());
        }
        assert_eq!(width, text.text_len());
        assert_eq!(reconstructed, text);
        assert_eq!(tree.green().full_width(), text.text_len());
    }
}

#[test]
fn every_token_ends_where_the_next_starts() {
    let text = "let a = (1 + b) * 2; // c\n{ a; }\n";
    let tree = parse(text);
    let tokens: Vec<_> = tree.root().tokens().collect();
    for pair in tokens.windows(2) {
        assert_eq!(pair[0].full_span().end(), pair[1].full_span().start());
        assert_eq!(pair[0].next_token().as_ref(), Some(&pair[1]));
        assert_eq!(pair[1].prev_token().as_ref(), Some(&pair[0]));
    }
}

#[test]
fn precedence() {
    let tree = parse("1 + 2 * 3;");
    let stmt = tree.root().first_child().unwrap();
    assert_eq!(stmt.kind(), CalcKind::EXPR_STMT);
    let sum = stmt.first_child().unwrap();
    assert_eq!(sum.kind(), CalcKind::BIN_EXPR);
    let product = sum.last_child().unwrap();
    assert_eq!(product.kind(), CalcKind::BIN_EXPR);
    assert_eq!(product.to_string(), "2 * 3");
}

#[test]
fn missing_tokens_have_no_width() {
    let tree = parse("let = ;");
    let stmt = tree.root().first_child().unwrap();
    assert_eq!(stmt.kind(), CalcKind::LET_STMT);
    assert!(stmt.green().is_missing());
    assert_eq!(stmt.child(1).unwrap(), None);
    assert!(stmt.child(5).is_err());
    assert_eq!(stmt.full_span().len(), TextSize::of("let = ;"));
}
