use crate::error::StructeditError;
use crate::patch::Patch;
use crate::syntax::SyntaxNode;

/// Replace the target's text with `payload` verbatim.
pub(super) fn simple_swap(
    target: SyntaxNode<'_>,
    payload: &str,
) -> Result<Option<Patch>, StructeditError> {
    Ok(Some(Patch::replace(target.span(), payload)))
}
