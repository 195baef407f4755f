use tracing::debug;

use crate::error::StructeditError;
use crate::patch::Patch;
use crate::syntax::{NodeKind, Span, SyntaxNode};

use super::enclosing;

pub(super) fn remove_object_key(
    target: SyntaxNode<'_>,
) -> Result<Option<Patch>, StructeditError> {
    let Some(property) = enclosing(target, NodeKind::Property) else {
        return Ok(None);
    };
    Ok(Some(remove_item(property, NodeKind::CloseBrace)))
}

pub(super) fn remove_element_from_array(
    target: SyntaxNode<'_>,
) -> Result<Option<Patch>, StructeditError> {
    let in_array = target
        .parent()
        .is_some_and(|parent| parent.kind() == NodeKind::Array);
    if !in_array {
        return Ok(None);
    }
    Ok(Some(remove_item(target, NodeKind::CloseBracket)))
}

/// Delete `item` together with exactly one neighbouring separator.
///
/// A following item owns the separator after `item`; without one (the
/// closing delimiter or an error region comes next) the separator before
/// `item` goes instead.
fn remove_item(item: SyntaxNode<'_>, closing: NodeKind) -> Patch {
    let prev = item.prev_sibling();
    let next = item.next_sibling();

    let span = match next {
        Some(next) if next.kind() != closing && next.kind() != NodeKind::Error => {
            Span::new(item.from(), next.from())
        }
        Some(next) => Span::new(prev.map_or(item.from(), |prev| prev.to()), next.from()),
        None => Span::new(prev.map_or(item.from(), |prev| prev.to()), item.to()),
    };

    debug!(?item, ?prev, ?next, ?span, "removing container item");
    Patch::delete(span)
}
