use tracing::debug;

use crate::boundary::bound_check;
use crate::error::StructeditError;
use crate::patch::Patch;
use crate::syntax::{NodeKind, Span, SyntaxNode};

use super::slice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Direction {
    Left,
    Right,
}

/// Swap the item with its neighbour, keeping the text between them in place.
pub(super) fn move_item(
    target: SyntaxNode<'_>,
    text: &str,
    direction: Direction,
) -> Result<Option<Patch>, StructeditError> {
    let item = match target.parent() {
        Some(parent) if parent.kind() == NodeKind::Property => parent,
        _ => target,
    };

    let bounds = bound_check(item);
    let pair = match direction {
        Direction::Left if !bounds.is_first => item.prev_sibling().map(|prev| (prev, item)),
        Direction::Right if !bounds.is_last => item.next_sibling().map(|next| (item, next)),
        _ => None,
    };
    let Some((first, second)) = pair else {
        debug!(?item, ?direction, ?bounds, "item is already at the edge");
        return Ok(None);
    };

    let value = [
        slice(text, second.from(), second.to())?,
        slice(text, first.to(), second.from())?,
        slice(text, first.from(), first.to())?,
    ]
    .concat();
    Ok(Some(Patch::replace(
        Span::new(first.from(), second.to()),
        value,
    )))
}
