//! Translation of [`EditCommand`]s into single text splices.
//!
//! Every handler is a pure function of the target node, the document text and
//! an optional cursor offset. Handlers return `Ok(None)` when the command does
//! not apply to the target and `Err` for situations they cannot handle at all.
//! [`dispatch`] reports which of these happened; [`modify_document`] is the
//! host-facing entry point and turns anything but a successful edit into
//! [`Patch::noop`].

use tracing::{debug, warn};

use crate::address::retarget;
use crate::command::EditCommand;
use crate::error::StructeditError;
use crate::patch::Patch;
use crate::syntax::{NodeKind, SyntaxNode};

mod insert;
mod remove;
mod reorder;
mod swap;

#[cfg(test)]
mod tests;

#[derive(Debug)]
pub enum Dispatch {
    Applied(Patch),
    NotApplicable,
    Unsupported,
    Failed(StructeditError),
}

impl Dispatch {
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Applied(_) => "applied",
            Self::NotApplicable => "not_applicable",
            Self::Unsupported => "unsupported",
            Self::Failed(_) => "failed",
        }
    }

    pub fn patch(&self) -> Option<&Patch> {
        match self {
            Self::Applied(patch) => Some(patch),
            _ => None,
        }
    }

    pub fn into_patch(self) -> Patch {
        match self {
            Self::Applied(patch) => patch,
            _ => Patch::noop(),
        }
    }
}

/// Run `command` against the document and report what happened.
///
/// `focused` is the node the editing surface has selected; it must belong to
/// the tree parsed from `text`.
pub fn dispatch(
    command: &EditCommand,
    focused: SyntaxNode<'_>,
    text: &str,
    cursor: Option<usize>,
) -> Dispatch {
    let covered = focused.tree().root().to();
    if covered != text.len() {
        return Dispatch::Failed(StructeditError::MalformedTree {
            message: format!(
                "tree covers {covered} bytes but the document has {} bytes",
                text.len()
            ),
        });
    }

    let target = retarget(command.node_id(), focused);
    debug!(command = command.kind_name(), ?target, ?cursor, "dispatching edit command");

    let handled = match command {
        EditCommand::SimpleSwap { payload, .. } => swap::simple_swap(target, payload),
        EditCommand::AddObjectKey { payload, .. } => {
            insert::add_object_key(target, payload, text, cursor)
        }
        EditCommand::AddElementAsSiblingInArray { payload, .. } => {
            insert::add_element_as_sibling_in_array(target, payload, text, cursor)
        }
        EditCommand::RemoveObjectKey { .. } => remove::remove_object_key(target),
        EditCommand::RemoveElementFromArray { .. } => remove::remove_element_from_array(target),
        EditCommand::IncreaseItemIdx { .. } => {
            reorder::move_item(target, text, reorder::Direction::Right)
        }
        EditCommand::DecreaseItemIdx { .. } => {
            reorder::move_item(target, text, reorder::Direction::Left)
        }
        EditCommand::NullEvent { .. } => return Dispatch::Unsupported,
    };

    match handled {
        Ok(Some(patch)) => match patch.validate(text) {
            Ok(()) => Dispatch::Applied(patch),
            Err(error) => Dispatch::Failed(error),
        },
        Ok(None) => Dispatch::NotApplicable,
        Err(error) => Dispatch::Failed(error),
    }
}

/// Host entry point: always yields a patch, degrading to the no-op patch.
pub fn modify_document(
    command: &EditCommand,
    focused: SyntaxNode<'_>,
    text: &str,
    cursor: Option<usize>,
) -> Patch {
    let outcome = dispatch(command, focused, text, cursor);
    match &outcome {
        Dispatch::Applied(patch) => {
            debug!(command = command.kind_name(), ?patch, "edit command produced a patch");
        }
        Dispatch::Failed(error) => {
            warn!(command = command.kind_name(), %error, "edit command failed; returning no-op patch");
        }
        Dispatch::NotApplicable | Dispatch::Unsupported => {
            debug!(
                command = command.kind_name(),
                outcome = outcome.outcome(),
                "edit command had no effect"
            );
        }
    }
    outcome.into_patch()
}

pub(crate) fn enclosing<'t>(node: SyntaxNode<'t>, kind: NodeKind) -> Option<SyntaxNode<'t>> {
    node.ancestors_inclusive().find(|candidate| candidate.kind() == kind)
}

pub(crate) fn slice(text: &str, from: usize, to: usize) -> Result<&str, StructeditError> {
    text.get(from..to)
        .ok_or_else(|| StructeditError::invalid_span(from, to, text.len()))
}
