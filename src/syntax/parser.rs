use tree_sitter::{Node, Parser};

use crate::error::StructeditError;

use super::{NodeKind, SyntaxTree, SyntaxTreeBuilder};

/// Parse `text` into a fresh [`SyntaxTree`].
///
/// Malformed regions do not fail the parse: tree-sitter recovers and the
/// unparsable text is kept as `⚠` nodes. Commas, colons, comments and
/// zero-width tokens inserted by recovery are not part of the tree.
pub fn parse_document(text: &str) -> Result<SyntaxTree, StructeditError> {
    let mut parser = Parser::new();
    let language = tree_sitter_json::LANGUAGE;

    parser
        .set_language(&language.into())
        .map_err(|error| StructeditError::LanguageSetup {
            message: error.to_string(),
        })?;

    let tree = parser
        .parse(text, None)
        .ok_or_else(|| StructeditError::ParseFailure {
            message: "Tree-sitter returned no syntax tree".to_string(),
        })?;

    let mut builder = SyntaxTreeBuilder::new();
    builder.start_node(NodeKind::Document, 0);

    let root = tree.root_node();
    if root.kind() == "document" {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            convert_node(child, &mut builder);
        }
    } else {
        convert_node(root, &mut builder);
    }

    builder.finish_node(text.len());
    builder.finish()
}

fn convert_node(node: Node<'_>, builder: &mut SyntaxTreeBuilder) {
    if node.is_missing() {
        return;
    }

    let (from, to) = (node.start_byte(), node.end_byte());
    if node.is_error() {
        convert_container(node, NodeKind::Error, builder);
        return;
    }

    match node.kind() {
        "object" => convert_container(node, NodeKind::Object, builder),
        "array" => convert_container(node, NodeKind::Array, builder),
        "pair" => convert_pair(node, builder),
        "string" => builder.token(NodeKind::String, from, to),
        "number" => builder.token(NodeKind::Number, from, to),
        "true" => builder.token(NodeKind::True, from, to),
        "false" => builder.token(NodeKind::False, from, to),
        "null" => builder.token(NodeKind::Null, from, to),
        "{" => builder.token(NodeKind::OpenBrace, from, to),
        "}" => builder.token(NodeKind::CloseBrace, from, to),
        "[" => builder.token(NodeKind::OpenBracket, from, to),
        "]" => builder.token(NodeKind::CloseBracket, from, to),
        _ => {}
    }
}

fn convert_container(node: Node<'_>, kind: NodeKind, builder: &mut SyntaxTreeBuilder) {
    builder.start_node(kind, node.start_byte());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        convert_node(child, builder);
    }
    builder.finish_node(node.end_byte());
}

fn convert_pair(node: Node<'_>, builder: &mut SyntaxTreeBuilder) {
    let key_id = node.child_by_field_name("key").map(|key| key.id());

    builder.start_node(NodeKind::Property, node.start_byte());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if Some(child.id()) == key_id {
            if !child.is_missing() {
                builder.token(NodeKind::PropertyName, child.start_byte(), child.end_byte());
            }
            continue;
        }
        convert_node(child, builder);
    }
    builder.finish_node(node.end_byte());
}
