#![cfg(feature = "serde1")]

mod common;

use serde_json::json;

use common::*;

#[test]
fn trees_serialize_with_spans_and_missing_tokens() {
    let tree = parse("a");
    let value = serde_json::to_value(tree.root()).unwrap();
    assert_eq!(
        value,
        json!({
            "kind": "ROOT",
            "full_span": [0, 1],
            "children": [
                {
                    "kind": "EXPR_STMT",
                    "full_span": [0, 1],
                    "children": [
                        {
                            "kind": "NAME_REF",
                            "full_span": [0, 1],
                            "children": [
                                {
                                    "kind": "IDENT",
                                    "full_span": [0, 1],
                                    "span": [0, 1],
                                    "text": "a"
                                }
                            ]
                        },
                        { "kind": "SEMI", "full_span": [1, 1], "missing": true }
                    ]
                },
                { "kind": "EOF", "full_span": [1, 1], "span": [1, 1], "text": "" }
            ]
        })
    );
}

#[test]
fn missing_nodes_are_marked() {
    let tree = parse("let = 1;");
    let stmt = tree.root().first_child().unwrap();
    let value = serde_json::to_value(&stmt).unwrap();
    assert_eq!(value["kind"], "LET_STMT");
    assert_eq!(value["missing"], true);
    assert_eq!(value["children"].as_array().unwrap().len(), 4);
}
