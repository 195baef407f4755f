use crate::error::StructeditError;

use super::{NodeData, NodeKind, Span, SyntaxTree};

/// Incremental pre-order construction of a [`SyntaxTree`].
///
/// Used by the JSON parser adapter and by tests that need trees the parser
/// would never produce on its own (for example hand-placed error regions).
#[derive(Debug, Default)]
pub struct SyntaxTreeBuilder {
    nodes: Vec<NodeData>,
    stack: Vec<usize>,
}

impl SyntaxTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: NodeKind, from: usize) {
        let index = self.push(kind, Span::new(from, from));
        self.stack.push(index);
    }

    pub fn finish_node(&mut self, to: usize) {
        if let Some(index) = self.stack.pop() {
            self.nodes[index].span.end = to;
        }
    }

    pub fn token(&mut self, kind: NodeKind, from: usize, to: usize) {
        self.push(kind, Span::new(from, to));
    }

    pub fn finish(self) -> Result<SyntaxTree, StructeditError> {
        if !self.stack.is_empty() {
            return Err(StructeditError::MalformedTree {
                message: format!("{} node(s) were started but never finished", self.stack.len()),
            });
        }

        let roots = self
            .nodes
            .iter()
            .filter(|node| node.parent.is_none())
            .count();
        if roots != 1 {
            return Err(StructeditError::MalformedTree {
                message: format!("expected exactly one root node, found {roots}"),
            });
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if node.span.start > node.span.end {
                return Err(StructeditError::MalformedTree {
                    message: format!(
                        "node {index} ({}) has inverted range [{}, {})",
                        node.kind, node.span.start, node.span.end
                    ),
                });
            }

            let mut previous_end = node.span.start;
            for child in &node.children {
                let child_span = self.nodes[*child].span;
                if child_span.start < previous_end || child_span.end > node.span.end {
                    return Err(StructeditError::MalformedTree {
                        message: format!(
                            "child [{}, {}) of {} [{}, {}) overlaps a sibling or escapes its parent",
                            child_span.start,
                            child_span.end,
                            node.kind,
                            node.span.start,
                            node.span.end
                        ),
                    });
                }
                previous_end = child_span.end;
            }
        }

        Ok(SyntaxTree { nodes: self.nodes })
    }

    fn push(&mut self, kind: NodeKind, span: Span) -> usize {
        let index = self.nodes.len();
        let parent = self.stack.last().copied();
        let (slot, ordinal) = match parent {
            Some(parent) => {
                let ordinal = self.nodes[parent]
                    .children
                    .last()
                    .map(|&prev| {
                        let prev = &self.nodes[prev];
                        prev.ordinal + usize::from(!prev.kind.is_liminal())
                    })
                    .unwrap_or(0);
                let siblings = &mut self.nodes[parent].children;
                siblings.push(index);
                (siblings.len() - 1, ordinal)
            }
            None => (0, 0),
        };

        self.nodes.push(NodeData {
            kind,
            span,
            parent,
            slot,
            ordinal,
            children: Vec::new(),
        });
        index
    }
}
