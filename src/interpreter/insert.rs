use tracing::debug;

use crate::boundary::compute_separators;
use crate::command::KeyValue;
use crate::error::StructeditError;
use crate::patch::Patch;
use crate::syntax::{NodeKind, Span, SyntaxNode};

use super::{enclosing, slice};

pub(super) fn add_object_key(
    target: SyntaxNode<'_>,
    payload: &KeyValue,
    text: &str,
    cursor: Option<usize>,
) -> Result<Option<Patch>, StructeditError> {
    let object =
        enclosing(target, NodeKind::Object).ok_or_else(|| StructeditError::MissingAncestor {
            expected: NodeKind::Object.name(),
            found: target.kind().name(),
        })?;
    let close = closing_delimiter(object, NodeKind::CloseBrace)?;
    let Some(last_item) = close.prev_sibling() else {
        return Ok(None);
    };
    let entry = payload.entry();

    match last_item.kind() {
        NodeKind::OpenBrace => {
            debug!(?object, "adding first key to empty object");
            let span = Span::new(last_item.from(), close.to());
            return Ok(Some(Patch::replace(span, format!("{{{entry}}}"))));
        }
        NodeKind::Error => {
            debug!(?object, error = ?last_item, "adding key before trailing error region");
            return insert_before_error(last_item, &entry, text).map(Some);
        }
        _ => {}
    }

    let Some(anchor) = cursor_anchor(object, close, cursor) else {
        return Ok(None);
    };
    let Some(next) = anchor.next_sibling() else {
        return Ok(None);
    };
    let layout = layout_near(anchor, text);

    if anchor.kind() == NodeKind::OpenBrace {
        debug!(?object, "adding key before the first member");
        return Ok(Some(Patch::insert(
            next.from(),
            format!("{entry},{layout}"),
        )));
    }

    if next.kind() == NodeKind::CloseBrace {
        debug!(?object, ?anchor, "adding key after the last member");
        let value = strip_blank_interior_lines(&format!(",{layout}{entry}"));
        return Ok(Some(Patch::insert(anchor.to(), value)));
    }

    debug!(?object, ?anchor, ?next, "adding key between members");
    let value = strip_blank_interior_lines(&format!("{entry},{layout}"));
    Ok(Some(Patch::insert(next.from(), value)))
}

pub(super) fn add_element_as_sibling_in_array(
    target: SyntaxNode<'_>,
    payload: &str,
    text: &str,
    cursor: Option<usize>,
) -> Result<Option<Patch>, StructeditError> {
    let Some(array) = enclosing(target, NodeKind::Array) else {
        return Ok(None);
    };
    let close = closing_delimiter(array, NodeKind::CloseBracket)?;
    let Some(anchor) = cursor_anchor(array, close, cursor) else {
        return Ok(None);
    };
    let Some(next) = anchor.next_sibling() else {
        return Ok(None);
    };

    let patch = match (anchor.kind(), next.kind()) {
        (NodeKind::OpenBracket, NodeKind::CloseBracket) => {
            debug!(?array, "adding first element to empty array");
            Patch::insert(anchor.to(), payload)
        }
        (NodeKind::OpenBracket, _) => {
            debug!(?array, "adding element before the first element");
            let layout = layout_near(anchor, text);
            Patch::insert(next.from(), format!("{payload},{layout}"))
        }
        _ => {
            debug!(?array, ?anchor, ?next, "adding element after anchor element");
            let layout = layout_near(anchor, text);
            Patch::insert(anchor.to(), format!(",{layout}{payload}"))
        }
    };
    Ok(Some(patch))
}

fn closing_delimiter<'t>(
    container: SyntaxNode<'t>,
    delimiter: NodeKind,
) -> Result<SyntaxNode<'t>, StructeditError> {
    container
        .last_child()
        .filter(|last| last.kind() == delimiter)
        .ok_or_else(|| StructeditError::MissingDelimiter {
            container: container.kind().name(),
            delimiter: delimiter.name(),
        })
}

/// The child a new item goes after.
///
/// With a cursor this is the last child whose successor starts strictly
/// before the cursor; without one it is the item before `close`. The closing
/// delimiter itself is never an anchor.
fn cursor_anchor<'t>(
    container: SyntaxNode<'t>,
    close: SyntaxNode<'t>,
    cursor: Option<usize>,
) -> Option<SyntaxNode<'t>> {
    let anchor = match cursor {
        None => close.prev_sibling()?,
        Some(cursor) => {
            let mut anchor = container.first_child()?;
            while let Some(next) = anchor.next_sibling()
                && next.from() < cursor
            {
                anchor = next;
            }
            anchor
        }
    };

    if anchor == close {
        return close.prev_sibling();
    }
    Some(anchor)
}

/// Separator that follows a freshly written comma next to `anchor`.
fn layout_near(anchor: SyntaxNode<'_>, text: &str) -> String {
    let (prev, target) = if anchor.kind().is_liminal() {
        (Some(anchor), anchor.next_sibling())
    } else {
        (anchor.prev_sibling(), Some(anchor))
    };

    match (prev, target) {
        (Some(prev), Some(target)) => {
            compute_separators(prev, target, target.next_sibling(), text).layout()
        }
        _ => " ".to_string(),
    }
}

fn insert_before_error(
    error: SyntaxNode<'_>,
    entry: &str,
    text: &str,
) -> Result<Patch, StructeditError> {
    let error_text = slice(text, error.from(), error.to())?;

    let leading = error_text.len() - error_text.trim_start().len();
    if let Some(rest) = error_text.trim_start().strip_prefix(',') {
        let after_comma = error.from() + leading + 1;
        let trail = if rest.trim().is_empty() { "" } else { "," };
        return Ok(Patch::insert(after_comma, format!(" {entry}{trail}")));
    }

    let after_open = error
        .prev_sibling()
        .is_none_or(|prev| prev.kind() == NodeKind::OpenBrace);
    let has_comma = slice(text, 0, error.from())?.trim_end().ends_with(',');
    let lead = if after_open || has_comma { "" } else { ", " };
    let trail = if error_text.trim().is_empty() { "" } else { ", " };

    Ok(Patch::insert(error.from(), format!("{lead}{entry}{trail}")))
}

/// Drop whitespace-only lines strictly between the first and last line.
fn strip_blank_interior_lines(value: &str) -> String {
    let lines = value.split('\n').collect::<Vec<_>>();
    if lines.len() <= 2 {
        return value.to_string();
    }

    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .filter(|(index, line)| *index == 0 || *index == last || !line.trim().is_empty())
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n")
}
