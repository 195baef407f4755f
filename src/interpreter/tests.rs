use std::collections::BTreeSet;

use proptest::prelude::*;

use super::{Dispatch, dispatch, modify_document};
use crate::address::{NodeId, node_to_id};
use crate::command::{EditCommand, KeyValue};
use crate::error::StructeditError;
use crate::patch::Patch;
use crate::syntax::{NodeKind, SyntaxNode, SyntaxTree, SyntaxTreeBuilder, parse_document};

fn find<'t>(tree: &'t SyntaxTree, text: &str, kind: NodeKind, snippet: &str) -> SyntaxNode<'t> {
    tree.walk()
        .find(|node| node.kind() == kind && node.text(text) == Some(snippet))
        .unwrap_or_else(|| panic!("no {kind} node with text {snippet:?}"))
}

fn run(
    text: &str,
    command: &EditCommand,
    kind: NodeKind,
    snippet: &str,
    cursor: Option<usize>,
) -> (Patch, String) {
    let tree = parse_document(text).expect("document should parse");
    let focused = find(&tree, text, kind, snippet);
    let patch = modify_document(command, focused, text, cursor);
    let patched = patch.apply(text).expect("patch should apply");
    (patch, patched)
}

fn edit(text: &str, command: &EditCommand, kind: NodeKind, snippet: &str) -> String {
    run(text, command, kind, snippet, None).1
}

fn add_key(key: &str, value: &str) -> EditCommand {
    EditCommand::AddObjectKey {
        payload: KeyValue::new(key, value),
        node_id: None,
    }
}

fn add_element(payload: &str) -> EditCommand {
    EditCommand::AddElementAsSiblingInArray {
        payload: payload.to_string(),
        node_id: None,
    }
}

const REMOVE_KEY: EditCommand = EditCommand::RemoveObjectKey { node_id: None };
const REMOVE_ELEMENT: EditCommand = EditCommand::RemoveElementFromArray { node_id: None };
const INCREASE: EditCommand = EditCommand::IncreaseItemIdx { node_id: None };
const DECREASE: EditCommand = EditCommand::DecreaseItemIdx { node_id: None };

/// `{...}` over the whole of `text` with `"k": d` shaped properties at the
/// given offsets followed by one error region.
fn object_with_error(text: &str, properties: &[usize], error: (usize, usize)) -> SyntaxTree {
    let mut builder = SyntaxTreeBuilder::new();
    builder.start_node(NodeKind::Document, 0);
    builder.start_node(NodeKind::Object, 0);
    builder.token(NodeKind::OpenBrace, 0, 1);
    for &from in properties {
        builder.start_node(NodeKind::Property, from);
        builder.token(NodeKind::PropertyName, from, from + 3);
        builder.token(NodeKind::Number, from + 5, from + 6);
        builder.finish_node(from + 6);
    }
    builder.token(NodeKind::Error, error.0, error.1);
    builder.token(NodeKind::CloseBrace, text.len() - 1, text.len());
    builder.finish_node(text.len());
    builder.finish_node(text.len());
    builder.finish().expect("hand-built tree should be well formed")
}

fn add_key_with_error(text: &str, properties: &[usize], error: (usize, usize)) -> String {
    let tree = object_with_error(text, properties, error);
    let object = tree.root().first_child().expect("object");
    let patch = modify_document(&add_key("\"x\"", "1"), object, text, None);
    assert!(!patch.is_noop(), "error recovery should still insert");
    patch.apply(text).expect("patch should apply")
}

#[test]
fn simple_swap_replaces_target_verbatim() {
    let command = EditCommand::SimpleSwap {
        payload: "[true]".to_string(),
        node_id: None,
    };
    let patched = edit(r#"{"a": 1, "b": 2}"#, &command, NodeKind::Number, "2");
    assert_eq!(patched, r#"{"a": 1, "b": [true]}"#);
}

#[test]
fn simple_swap_is_idempotent_when_retargeted_by_id() {
    let text = r#"{"a": 1, "b": 2}"#;
    let tree = parse_document(text).expect("parse");
    let id = node_to_id(find(&tree, text, NodeKind::Number, "2"));
    let command = EditCommand::SimpleSwap {
        payload: "3".to_string(),
        node_id: Some(id),
    };

    let once = modify_document(&command, tree.root(), text, None)
        .apply(text)
        .expect("first swap");
    let reparsed = parse_document(&once).expect("reparse");
    let twice = modify_document(&command, reparsed.root(), &once, None)
        .apply(&once)
        .expect("second swap");

    assert_eq!(once, r#"{"a": 1, "b": 3}"#);
    assert_eq!(twice, once);
}

#[test]
fn add_element_into_empty_array_inserts_inside_brackets() {
    let text = r#"{"example": []}"#;
    let (patch, patched) = run(text, &add_element("-9"), NodeKind::Array, "[]", None);
    assert_eq!(patch, Patch::insert(13, "-9"));
    assert_eq!(patched, r#"{"example": [-9]}"#);
}

#[test]
fn remove_first_key_swallows_following_separator() {
    let patched = edit(r#"{ "f": 4, "g": 5 }"#, &REMOVE_KEY, NodeKind::PropertyName, r#""f""#);
    assert_eq!(patched, r#"{ "g": 5 }"#);
}

#[test]
fn add_key_at_cursor_before_final_brace_appends_entry() {
    let text = r#"{ "a": { "b": [1,2,3], "c": true }, "d": null }"#;
    let cursor = text.len() - 1;
    let (_, patched) = run(
        text,
        &add_key("\"J\"", "[6,7,8]"),
        NodeKind::Object,
        text,
        Some(cursor),
    );

    assert_eq!(
        patched,
        r#"{ "a": { "b": [1,2,3], "c": true }, "d": null, "J": [6,7,8] }"#
    );
    assert!(!patched.contains(",,"));
    let value = serde_json::from_str::<serde_json::Value>(&patched).expect("result is JSON");
    assert_eq!(value["J"], serde_json::json!([6, 7, 8]));
}

#[test]
fn remove_last_key_swallows_preceding_separator() {
    let patched = edit(r#"{"a": 1, "b": 2}"#, &REMOVE_KEY, NodeKind::Number, "2");
    assert_eq!(patched, r#"{"a": 1}"#);
}

#[test]
fn remove_sole_key_empties_object() {
    assert_eq!(
        edit(r#"{ "a": 1 }"#, &REMOVE_KEY, NodeKind::Property, r#""a": 1"#),
        "{}"
    );
}

#[test]
fn remove_key_before_error_region_takes_preceding_comma() {
    let text = r#"{"a": 1, "b": 2,}"#;
    let tree = object_with_error(text, &[1, 9], (15, 16));
    let focused = find(&tree, text, NodeKind::Number, "2");

    let patch = modify_document(&REMOVE_KEY, focused, text, None);
    assert_eq!(patch, Patch::delete(crate::syntax::Span::new(7, 15)));
    let patched = patch.apply(text).expect("patch should apply");
    assert_eq!(patched, r#"{"a": 1,}"#);
    assert_eq!(
        text.matches(',').count() - patched.matches(',').count(),
        1,
        "exactly one comma should be removed"
    );
}

#[test]
fn remove_key_before_parsed_trailing_comma_removes_one_comma() {
    let text = r#"{"a": 1, "b": 2,}"#;
    let patched = edit(text, &REMOVE_KEY, NodeKind::Number, "2");
    assert_eq!(patched.matches(',').count(), 1);
    assert!(!patched.contains(", ,"), "{patched}");
}

#[test]
fn remove_interior_key_keeps_line_layout() {
    let text = "{\n  \"a\": 1,\n  \"b\": 2,\n  \"c\": 3\n}";
    let patched = edit(text, &REMOVE_KEY, NodeKind::PropertyName, "\"b\"");
    assert_eq!(patched, "{\n  \"a\": 1,\n  \"c\": 3\n}");
}

#[test]
fn remove_key_without_enclosing_property_is_not_applicable() {
    let text = "[1, 2]";
    let tree = parse_document(text).expect("parse");
    let focused = find(&tree, text, NodeKind::Number, "1");
    let outcome = dispatch(&REMOVE_KEY, focused, text, None);
    assert!(matches!(outcome, Dispatch::NotApplicable));
    assert!(outcome.into_patch().is_noop());
}

#[test]
fn remove_array_element_covers_every_position() {
    let text = "[1, 2, 3]";
    assert_eq!(edit(text, &REMOVE_ELEMENT, NodeKind::Number, "1"), "[2, 3]");
    assert_eq!(edit(text, &REMOVE_ELEMENT, NodeKind::Number, "2"), "[1, 3]");
    assert_eq!(edit(text, &REMOVE_ELEMENT, NodeKind::Number, "3"), "[1, 2]");
    assert_eq!(edit("[ 7 ]", &REMOVE_ELEMENT, NodeKind::Number, "7"), "[]");
}

#[test]
fn remove_array_element_requires_array_parent() {
    let text = r#"{"a": 1}"#;
    let tree = parse_document(text).expect("parse");
    let focused = find(&tree, text, NodeKind::Number, "1");
    assert!(matches!(
        dispatch(&REMOVE_ELEMENT, focused, text, None),
        Dispatch::NotApplicable
    ));
}

#[test]
fn move_item_swaps_with_neighbour() {
    let text = "[1, 2, 3]";
    assert_eq!(edit(text, &INCREASE, NodeKind::Number, "1"), "[2, 1, 3]");
    assert_eq!(edit(text, &DECREASE, NodeKind::Number, "3"), "[1, 3, 2]");
}

#[test]
fn move_item_at_edge_is_noop() {
    let text = "[1, 2, 3]";
    let tree = parse_document(text).expect("parse");

    let first = find(&tree, text, NodeKind::Number, "1");
    assert!(matches!(
        dispatch(&DECREASE, first, text, None),
        Dispatch::NotApplicable
    ));
    let last = find(&tree, text, NodeKind::Number, "3");
    assert!(modify_document(&INCREASE, last, text, None).is_noop());
}

#[test]
fn move_property_from_name_or_value() {
    let text = r#"{"a": 1, "b": 2}"#;
    let expected = r#"{"b": 2, "a": 1}"#;
    assert_eq!(edit(text, &DECREASE, NodeKind::PropertyName, r#""b""#), expected);
    assert_eq!(edit(text, &DECREASE, NodeKind::Number, "2"), expected);
    assert_eq!(edit(text, &INCREASE, NodeKind::Property, r#""a": 1"#), expected);
}

#[test]
fn move_item_keeps_between_text() {
    let text = "[\n  1,\n\n  2\n]";
    assert_eq!(
        edit(text, &INCREASE, NodeKind::Number, "1"),
        "[\n  2,\n\n  1\n]"
    );
}

#[test]
fn add_key_rebuilds_empty_object() {
    assert_eq!(edit("{}", &add_key("\"x\"", "1"), NodeKind::Object, "{}"), r#"{"x": 1}"#);
    assert_eq!(
        edit(r#"{"a": { }}"#, &add_key("\"x\"", "1"), NodeKind::Object, "{ }"),
        r#"{"a": {"x": 1}}"#
    );
}

#[test]
fn add_key_appends_inline_without_cursor() {
    let patched = edit(r#"{"a": 1}"#, &add_key("\"x\"", "1"), NodeKind::Number, "1");
    assert_eq!(patched, r#"{"a": 1, "x": 1}"#);
}

#[test]
fn add_key_appends_on_new_line_with_sibling_indent() {
    let text = "{\n  \"a\": 1,\n  \"b\": 2\n}";
    let patched = edit(text, &add_key("\"x\"", "true"), NodeKind::Object, text);
    assert_eq!(patched, "{\n  \"a\": 1,\n  \"b\": 2,\n  \"x\": true\n}");
}

#[test]
fn add_key_does_not_introduce_blank_lines() {
    let text = "{\n  \"a\": 1\n\n}";
    let (patch, patched) = run(text, &add_key("\"x\"", "2"), NodeKind::Object, text, None);
    assert_eq!(patch.value, ",\n  \"x\": 2");
    assert_eq!(patched, "{\n  \"a\": 1,\n  \"x\": 2\n\n}");
}

#[test]
fn add_key_after_last_member_keeps_trailing_comment() {
    let text = r#"{"a": 1 /* keep */}"#;
    let (patch, patched) = run(text, &add_key("\"x\"", "1"), NodeKind::Object, text, None);
    assert_eq!(patch, Patch::insert(7, r#", "x": 1"#));
    assert_eq!(patched, r#"{"a": 1, "x": 1 /* keep */}"#);
}

#[test]
fn add_key_between_members_keeps_comment_in_gap() {
    let text = "{\n  \"a\": 1, // first\n  \"b\": 2\n}";
    let cursor = text.find("\"b\"").expect("b offset");
    let (_, patched) = run(text, &add_key("\"x\"", "1"), NodeKind::Object, text, Some(cursor));
    assert_eq!(
        patched,
        "{\n  \"a\": 1, // first\n  \"x\": 1,\n  \"b\": 2\n}"
    );
}

#[test]
fn add_key_at_cursor_between_members() {
    let text = r#"{"a": 1, "b": 2}"#;
    let cursor = text.find(r#""b""#).expect("b offset");
    let (_, patched) = run(text, &add_key("\"x\"", "1"), NodeKind::Object, text, Some(cursor));
    assert_eq!(patched, r#"{"a": 1, "x": 1, "b": 2}"#);

    let multiline = "{\n  \"a\": 1,\n  \"b\": 2\n}";
    let cursor = multiline.find("\"b\"").expect("b offset");
    let (_, patched) = run(
        multiline,
        &add_key("\"x\"", "1"),
        NodeKind::Object,
        multiline,
        Some(cursor),
    );
    assert_eq!(patched, "{\n  \"a\": 1,\n  \"x\": 1,\n  \"b\": 2\n}");
}

#[test]
fn add_key_at_cursor_before_first_member() {
    let text = r#"{"a": 1, "b": 2}"#;
    let (_, patched) = run(text, &add_key("\"x\"", "1"), NodeKind::Object, text, Some(1));
    assert_eq!(patched, r#"{"x": 1, "a": 1, "b": 2}"#);
}

#[test]
fn add_key_with_cursor_past_end_appends() {
    let text = r#"{"a": 1}"#;
    let (_, patched) = run(
        text,
        &add_key("\"x\"", "1"),
        NodeKind::Object,
        text,
        Some(text.len()),
    );
    assert_eq!(patched, r#"{"a": 1, "x": 1}"#);
}

#[test]
fn add_key_without_object_fails_and_degrades_to_noop() {
    crate::logging::test();
    let text = "[1, 2]";
    let tree = parse_document(text).expect("parse");
    let focused = find(&tree, text, NodeKind::Number, "2");

    let outcome = dispatch(&add_key("\"x\"", "1"), focused, text, None);
    assert!(matches!(
        outcome,
        Dispatch::Failed(StructeditError::MissingAncestor {
            expected: "Object",
            found: "Number"
        })
    ));
    assert!(modify_document(&add_key("\"x\"", "1"), focused, text, None).is_noop());
}

#[test]
fn add_key_before_error_after_comma() {
    assert_eq!(
        add_key_with_error(r#"{"a": 1, @@}"#, &[1], (9, 11)),
        r#"{"a": 1, "x": 1, @@}"#
    );
}

#[test]
fn add_key_before_error_right_after_brace() {
    assert_eq!(add_key_with_error("{@@}", &[], (1, 3)), r#"{"x": 1, @@}"#);
}

#[test]
fn add_key_before_error_supplies_missing_comma() {
    assert_eq!(
        add_key_with_error(r#"{"a": 1 @@}"#, &[1], (8, 10)),
        r#"{"a": 1 , "x": 1, @@}"#
    );
    assert_eq!(
        add_key_with_error(r#"{"a": 1}"#, &[1], (7, 7)),
        r#"{"a": 1, "x": 1}"#
    );
}

#[test]
fn add_key_after_dangling_comma_error() {
    assert_eq!(
        add_key_with_error(r#"{"a": 1,}"#, &[1], (7, 8)),
        r#"{"a": 1, "x": 1}"#
    );
}

#[test]
fn add_element_appends_and_prepends() {
    let text = "[1, 2]";
    assert_eq!(edit(text, &add_element("3"), NodeKind::Array, text), "[1, 2, 3]");

    let (_, patched) = run(text, &add_element("0"), NodeKind::Array, text, Some(1));
    assert_eq!(patched, "[0, 1, 2]");

    let (_, patched) = run(text, &add_element("9"), NodeKind::Array, text, Some(4));
    assert_eq!(patched, "[1, 9, 2]");
}

#[test]
fn add_element_follows_multiline_layout() {
    let text = "[\n  1,\n  2\n]";
    assert_eq!(
        edit(text, &add_element("3"), NodeKind::Number, "2"),
        "[\n  1,\n  2,\n  3\n]"
    );

    let (_, patched) = run(text, &add_element("0"), NodeKind::Array, text, Some(0));
    assert_eq!(patched, "[\n  0,\n  1,\n  2\n]");
}

#[test]
fn add_element_from_nested_element_targets_its_array() {
    let text = r#"{"list": [true]}"#;
    assert_eq!(
        edit(text, &add_element("false"), NodeKind::True, "true"),
        r#"{"list": [true, false]}"#
    );
}

#[test]
fn add_element_outside_array_is_not_applicable() {
    let text = r#"{"a": 1}"#;
    let tree = parse_document(text).expect("parse");
    let focused = find(&tree, text, NodeKind::Number, "1");
    assert!(matches!(
        dispatch(&add_element("2"), focused, text, None),
        Dispatch::NotApplicable
    ));
}

#[test]
fn null_event_is_unsupported() {
    let text = "[1]";
    let tree = parse_document(text).expect("parse");
    let outcome = dispatch(&EditCommand::NullEvent { node_id: None }, tree.root(), text, None);
    assert!(matches!(outcome, Dispatch::Unsupported));
    assert_eq!(outcome.outcome(), "unsupported");
}

#[test]
fn explicit_node_id_overrides_focus() {
    let text = "[1, 2, 3]";
    let tree = parse_document(text).expect("parse");
    let id = node_to_id(find(&tree, text, NodeKind::Number, "3"));
    let focused = find(&tree, text, NodeKind::Number, "1");

    let command = EditCommand::RemoveElementFromArray { node_id: Some(id) };
    let patched = modify_document(&command, focused, text, None)
        .apply(text)
        .expect("apply");
    assert_eq!(patched, "[1, 2]");
}

#[test]
fn stale_node_id_falls_back_to_focus() {
    let text = "[1, 2, 3]";
    let tree = parse_document(text).expect("parse");
    let focused = find(&tree, text, NodeKind::Number, "2");

    let command = EditCommand::RemoveElementFromArray {
        node_id: Some(NodeId::from("JsonText:0/Array:0/Number:9")),
    };
    let patched = modify_document(&command, focused, text, None)
        .apply(text)
        .expect("apply");
    assert_eq!(patched, "[1, 3]");
}

#[test]
fn delimiter_focus_is_promoted_to_container() {
    let text = r#"{"a": [1]}"#;
    let (_, patched) = run(text, &add_element("2"), NodeKind::CloseBracket, "]", None);
    assert_eq!(patched, r#"{"a": [1, 2]}"#);
}

#[test]
fn text_that_does_not_match_tree_fails() {
    let tree = parse_document("[1]").expect("parse");
    let outcome = dispatch(&REMOVE_ELEMENT, tree.root(), "[1, 2]", None);
    assert!(matches!(
        outcome,
        Dispatch::Failed(StructeditError::MalformedTree { .. })
    ));
}

#[test]
fn add_then_remove_key_restores_key_set() {
    let text = r#"{"a": 1, "b": [2]}"#;
    let (_, added) = run(text, &add_key("\"x\"", "1"), NodeKind::Object, text, None);

    let (_, removed) = run(&added, &REMOVE_KEY, NodeKind::PropertyName, "\"x\"", None);
    assert_eq!(key_set(&removed), key_set(text));
}

#[test]
fn malformed_document_never_yields_out_of_bounds_patch() {
    crate::logging::test();
    let text = r#"{"a": [1, 2,, 3], "b": @@ }"#;
    let tree = parse_document(text).expect("recovering parse");
    for node in tree.walk() {
        for command in all_commands() {
            let patch = modify_document(&command, node, text, Some(node.from()));
            patch
                .validate(text)
                .unwrap_or_else(|error| panic!("{command:?} on {node:?}: {error}"));
        }
    }
}

fn all_commands() -> Vec<EditCommand> {
    vec![
        EditCommand::SimpleSwap {
            payload: "0".to_string(),
            node_id: None,
        },
        add_key("\"k\"", "0"),
        add_element("0"),
        REMOVE_KEY,
        REMOVE_ELEMENT,
        INCREASE,
        DECREASE,
        EditCommand::NullEvent { node_id: None },
    ]
}

fn key_set(text: &str) -> BTreeSet<String> {
    let value = serde_json::from_str::<serde_json::Value>(text).expect("document is JSON");
    value
        .as_object()
        .expect("document is an object")
        .keys()
        .cloned()
        .collect()
}

fn array_text(items: &[u32], multiline: bool) -> String {
    let rendered = items.iter().map(ToString::to_string).collect::<Vec<_>>();
    if multiline {
        let lines = rendered
            .iter()
            .map(|item| format!("  {item}"))
            .collect::<Vec<_>>();
        format!("[\n{}\n]", lines.join(",\n"))
    } else {
        format!("[{}]", rendered.join(", "))
    }
}

fn object_text(len: usize, multiline: bool) -> String {
    let members = (0..len)
        .map(|index| format!("\"k{index}\": {index}"))
        .collect::<Vec<_>>();
    if members.is_empty() {
        return "{}".to_string();
    }
    if multiline {
        let lines = members
            .iter()
            .map(|member| format!("  {member}"))
            .collect::<Vec<_>>();
        format!("{{\n{}\n}}", lines.join(",\n"))
    } else {
        format!("{{{}}}", members.join(", "))
    }
}

fn nth_number(tree: &SyntaxTree, index: usize) -> SyntaxNode<'_> {
    tree.walk()
        .filter(|node| node.kind() == NodeKind::Number)
        .nth(index)
        .expect("number should exist")
}

proptest! {
    #[test]
    fn increase_then_decrease_restores_text(
        items in prop::collection::vec(0u32..1000, 2..7),
        multiline in any::<bool>(),
        pick in any::<prop::sample::Index>(),
    ) {
        let text = array_text(&items, multiline);
        let index = pick.index(items.len() - 1);

        let tree = parse_document(&text).expect("parse");
        let moved = modify_document(&INCREASE, nth_number(&tree, index), &text, None)
            .apply(&text)
            .expect("increase applies");

        let reparsed = parse_document(&moved).expect("reparse");
        let restored = modify_document(&DECREASE, nth_number(&reparsed, index + 1), &moved, None)
            .apply(&moved)
            .expect("decrease applies");
        prop_assert_eq!(restored, text);
    }

    #[test]
    fn moving_past_either_edge_is_noop(
        items in prop::collection::vec(0u32..1000, 1..7),
        multiline in any::<bool>(),
    ) {
        let text = array_text(&items, multiline);
        let tree = parse_document(&text).expect("parse");

        let first = nth_number(&tree, 0);
        let last = nth_number(&tree, items.len() - 1);
        prop_assert_eq!(modify_document(&DECREASE, first, &text, None), Patch::noop());
        prop_assert_eq!(modify_document(&INCREASE, last, &text, None), Patch::noop());
    }

    #[test]
    fn add_then_remove_key_round_trips_key_set(
        len in 0usize..5,
        multiline in any::<bool>(),
        cursor_seed in any::<prop::sample::Index>(),
    ) {
        let text = object_text(len, multiline);
        let cursor = cursor_seed.index(text.len() + 1);

        let tree = parse_document(&text).expect("parse");
        let object = tree.root().first_child().expect("object");
        let added = modify_document(&add_key("\"x\"", "true"), object, &text, Some(cursor))
            .apply(&text)
            .expect("add applies");

        let mut expected = key_set(&text);
        expected.insert("x".to_string());
        prop_assert_eq!(key_set(&added), expected);

        let reparsed = parse_document(&added).expect("reparse");
        let name = find(&reparsed, &added, NodeKind::PropertyName, "\"x\"");
        let removed = modify_document(&REMOVE_KEY, name, &added, None)
            .apply(&added)
            .expect("remove applies");
        prop_assert_eq!(key_set(&removed), key_set(&text));
    }

    #[test]
    fn patches_stay_within_document(
        items in prop::collection::vec(0u32..1000, 0..5),
        multiline in any::<bool>(),
        cursor_seed in any::<prop::sample::Index>(),
    ) {
        let text = format!("{{\"list\": {}, \"obj\": {}}}", array_text(&items, multiline), object_text(items.len(), multiline));
        let tree = parse_document(&text).expect("parse");
        let cursor = cursor_seed.index(text.len() + 1);

        for node in tree.walk() {
            for command in all_commands() {
                let patch = modify_document(&command, node, &text, Some(cursor));
                prop_assert!(patch.from <= patch.to && patch.to <= text.len());
            }
        }
    }
}
