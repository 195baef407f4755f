//! Optional whole-node reformat pass.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::boundary::line_indent;
use crate::error::StructeditError;
use crate::patch::Patch;
use crate::syntax::SyntaxNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReformatOptions {
    pub indent: usize,
}

impl Default for ReformatOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Re-serialize `node`'s range with consistent indentation.
///
/// Nested lines are shifted by the indentation of the line the node starts
/// on, so the result slots back into its surroundings. Fails when the node's
/// text is not valid JSON on its own.
pub fn reformat_node(
    node: SyntaxNode<'_>,
    text: &str,
    options: ReformatOptions,
) -> Result<Patch, StructeditError> {
    let source = text
        .get(node.from()..node.to())
        .ok_or_else(|| StructeditError::invalid_span(node.from(), node.to(), text.len()))?;
    let value = serde_json::from_str::<Value>(source)
        .map_err(|source| StructeditError::DocumentNotJson { source })?;

    let indent = " ".repeat(options.indent);
    let mut rendered = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut rendered, PrettyFormatter::with_indent(indent.as_bytes()));
    value
        .serialize(&mut serializer)
        .map_err(|source| StructeditError::ResponseSerialization { source })?;
    let rendered = String::from_utf8(rendered).map_err(|error| StructeditError::InvalidRequest {
        message: format!("reformatted text is not UTF-8: {error}"),
    })?;

    let base = line_indent(node, text);
    let shifted = rendered
        .lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 || line.is_empty() {
                line.to_string()
            } else {
                format!("{base}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Patch::replace(node.span(), shifted))
}
