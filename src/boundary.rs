//! Position and punctuation analysis around a node inside its container.

use tracing::trace;

use crate::syntax::{NodeKind, SyntaxNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub is_first: bool,
    pub is_last: bool,
}

/// Whether `node` sits at either edge of its container.
///
/// A missing sibling, an opening/closing delimiter or an error region all
/// count as an edge.
pub fn bound_check(node: SyntaxNode<'_>) -> Bounds {
    let is_first = node.prev_sibling().is_none_or(|prev| {
        matches!(
            prev.kind(),
            NodeKind::Error | NodeKind::OpenBracket | NodeKind::OpenBrace
        )
    });
    let is_last = node.next_sibling().is_none_or(|next| {
        matches!(
            next.kind(),
            NodeKind::Error | NodeKind::CloseBracket | NodeKind::CloseBrace
        )
    });
    Bounds { is_first, is_last }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators {
    pub before: String,
    pub after: String,
    /// Indentation of the target's line, present only when the target starts
    /// on a new line relative to `prev`.
    pub indent: Option<String>,
}

impl Separators {
    pub fn is_multiline(&self) -> bool {
        self.indent.is_some()
    }

    pub fn line_break(&self) -> &'static str {
        if self.before.contains("\r\n") || self.after.contains("\r\n") {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Whitespace to put between a fresh comma and the next item.
    pub fn layout(&self) -> String {
        match &self.indent {
            Some(indent) => format!("{}{indent}", self.line_break()),
            None => " ".to_string(),
        }
    }
}

/// Infer the separator style around `target`.
///
/// The three gaps `prev..target`, `prev..next` and `target..next` are reduced
/// to their whitespace and the shortest one is used on both sides, so blank
/// lines never accumulate.
pub fn compute_separators(
    prev: SyntaxNode<'_>,
    target: SyntaxNode<'_>,
    next: Option<SyntaxNode<'_>>,
    text: &str,
) -> Separators {
    let gaps = [
        Some((prev.to(), target.from())),
        next.map(|next| (prev.to(), next.from())),
        next.map(|next| (target.to(), next.from())),
    ];

    let shortest = gaps
        .into_iter()
        .flatten()
        .filter_map(|(from, to)| text.get(from..to))
        .map(whitespace_only)
        .min_by_key(String::len)
        .unwrap_or_default();

    let indent = text
        .get(prev.to()..target.from())
        .filter(|gap| gap.contains('\n'))
        .map(|_| line_indent(target, text).to_string());

    trace!(?prev, ?target, ?next, separator = ?shortest, ?indent, "inferred separators");
    Separators {
        before: shortest.clone(),
        after: shortest,
        indent,
    }
}

/// Leading spaces and tabs of the line `node` starts on.
pub fn line_indent<'s>(node: SyntaxNode<'_>, text: &'s str) -> &'s str {
    let Some(before) = text.get(..node.from()) else {
        return "";
    };
    let line_start = before.rfind('\n').map_or(0, |newline| newline + 1);
    let line = &before[line_start..];
    let indent_len = line
        .bytes()
        .take_while(|byte| matches!(byte, b' ' | b'\t'))
        .count();
    &line[..indent_len]
}

fn whitespace_only(gap: &str) -> String {
    gap.chars().filter(|ch| ch.is_whitespace()).collect()
}
