//! Positional node addressing.
//!
//! A [`NodeId`] encodes the ancestor chain of a node as `kind:index` steps,
//! where `index` counts only non-delimiter siblings. Ids are valid against a
//! single tree snapshot and are re-resolved from the root after every
//! reparse.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::syntax::{NodeKind, SyntaxNode, SyntaxTree};

const STEP_SEPARATOR: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub kind: NodeKind,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Root-first chain of `{kind, index}` steps ending at `node`.
pub fn to_absolute_path(node: SyntaxNode<'_>) -> Vec<PathStep> {
    let mut steps = node
        .ancestors_inclusive()
        .map(|current| PathStep {
            kind: current.kind(),
            index: current.sibling_index(),
        })
        .collect::<Vec<_>>();
    steps.reverse();
    steps
}

pub fn node_to_id(node: SyntaxNode<'_>) -> NodeId {
    let encoded = to_absolute_path(node)
        .iter()
        .map(|step| format!("{}:{}", step.kind.name(), step.index))
        .collect::<Vec<_>>()
        .join(STEP_SEPARATOR);
    NodeId(encoded)
}

/// Resolve `id` by descending from the root one `kind:index` step at a time.
pub fn find_node_by_id<'t>(tree: &'t SyntaxTree, id: &NodeId) -> Option<SyntaxNode<'t>> {
    let mut steps = id.as_str().split(STEP_SEPARATOR).map(parse_step);
    let root = tree.root();
    let first = steps.next()??;
    if first != (PathStep { kind: root.kind(), index: 0 }) {
        return None;
    }

    steps.try_fold(root, |node, step| {
        let step = step?;
        node.children()
            .find(|child| child.kind() == step.kind && child.sibling_index() == step.index)
    })
}

fn parse_step(raw: &str) -> Option<PathStep> {
    let (kind, index) = raw.rsplit_once(':')?;
    Some(PathStep {
        kind: NodeKind::from_name(kind)?,
        index: index.parse().ok()?,
    })
}

/// Delimiter tokens are promoted to the container they delimit.
pub fn promote_liminal(node: SyntaxNode<'_>) -> SyntaxNode<'_> {
    if node.kind().is_liminal() {
        return node.parent().unwrap_or(node);
    }
    node
}

/// Resolve the node a command should act on.
///
/// An explicit id wins when it still resolves in `focused`'s tree; otherwise
/// the focused node is used. Delimiters are then promoted to their container.
pub fn retarget<'t>(id: Option<&NodeId>, focused: SyntaxNode<'t>) -> SyntaxNode<'t> {
    let resolved = match id {
        Some(id) => match find_node_by_id(focused.tree(), id) {
            Some(node) => node,
            None => {
                debug!(%id, ?focused, "node id did not resolve; using focused node");
                focused
            }
        },
        None => focused,
    };

    let promoted = promote_liminal(resolved);
    if promoted != resolved {
        debug!(from = ?resolved, to = ?promoted, "promoted delimiter to its container");
    }
    promoted
}
