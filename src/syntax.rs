//! Arena-backed concrete syntax tree for JSON-like documents.
//!
//! A [`SyntaxTree`] is rebuilt from scratch after every edit. Nodes are
//! addressed through short-lived [`SyntaxNode`] handles that borrow the tree,
//! so a node reference can never outlive the snapshot it was taken from.

use std::fmt;

use serde::{Deserialize, Serialize};

mod builder;
mod parser;

pub use builder::SyntaxTreeBuilder;
pub use parser::parse_document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Object,
    Array,
    Property,
    PropertyName,
    String,
    Number,
    True,
    False,
    Null,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Error,
}

impl NodeKind {
    pub const ALL: [NodeKind; 15] = [
        NodeKind::Document,
        NodeKind::Object,
        NodeKind::Array,
        NodeKind::Property,
        NodeKind::PropertyName,
        NodeKind::String,
        NodeKind::Number,
        NodeKind::True,
        NodeKind::False,
        NodeKind::Null,
        NodeKind::OpenBrace,
        NodeKind::CloseBrace,
        NodeKind::OpenBracket,
        NodeKind::CloseBracket,
        NodeKind::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Document => "JsonText",
            NodeKind::Object => "Object",
            NodeKind::Array => "Array",
            NodeKind::Property => "Property",
            NodeKind::PropertyName => "PropertyName",
            NodeKind::String => "String",
            NodeKind::Number => "Number",
            NodeKind::True => "True",
            NodeKind::False => "False",
            NodeKind::Null => "Null",
            NodeKind::OpenBrace => "{",
            NodeKind::CloseBrace => "}",
            NodeKind::OpenBracket => "[",
            NodeKind::CloseBracket => "]",
            NodeKind::Error => "⚠",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Pure delimiter tokens. These are never edit targets themselves.
    pub fn is_liminal(self) -> bool {
        matches!(
            self,
            NodeKind::OpenBrace
                | NodeKind::CloseBrace
                | NodeKind::OpenBracket
                | NodeKind::CloseBracket
        )
    }

    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            NodeKind::String | NodeKind::Number | NodeKind::True | NodeKind::False | NodeKind::Null
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    parent: Option<usize>,
    slot: usize,
    ordinal: usize,
    children: Vec<usize>,
}

/// Nodes are stored in pre-order; index 0 is the root.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whole-tree pre-order walk.
    pub fn walk(&self) -> impl Iterator<Item = SyntaxNode<'_>> + '_ {
        (0..self.nodes.len()).map(move |index| SyntaxNode { tree: self, index })
    }

    /// Innermost node whose range contains `offset`, falling back to the root.
    pub fn node_at(&self, offset: usize) -> SyntaxNode<'_> {
        let mut node = self.root();
        'descend: loop {
            for child in node.children() {
                if child.span().contains(offset) {
                    node = child;
                    continue 'descend;
                }
            }
            return node;
        }
    }

    pub fn has_errors(&self) -> bool {
        self.nodes.iter().any(|node| node.kind == NodeKind::Error)
    }
}

#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    index: usize,
}

impl<'t> SyntaxNode<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.index]
    }

    fn at(&self, index: usize) -> SyntaxNode<'t> {
        SyntaxNode {
            tree: self.tree,
            index,
        }
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn from(&self) -> usize {
        self.data().span.start
    }

    pub fn to(&self) -> usize {
        self.data().span.end
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.data().parent.map(|index| self.at(index))
    }

    pub fn first_child(&self) -> Option<SyntaxNode<'t>> {
        self.data().children.first().map(|index| self.at(*index))
    }

    pub fn last_child(&self) -> Option<SyntaxNode<'t>> {
        self.data().children.last().map(|index| self.at(*index))
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode<'t>> {
        let parent = self.data().parent?;
        let siblings = &self.tree.nodes[parent].children;
        siblings.get(self.data().slot + 1).map(|index| self.at(*index))
    }

    pub fn prev_sibling(&self) -> Option<SyntaxNode<'t>> {
        let parent = self.data().parent?;
        let slot = self.data().slot.checked_sub(1)?;
        let siblings = &self.tree.nodes[parent].children;
        siblings.get(slot).map(|index| self.at(*index))
    }

    /// Pre-order position of the node in its tree.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Position among non-delimiter siblings; a delimiter gets the count of
    /// non-delimiters before it.
    pub fn sibling_index(&self) -> usize {
        self.data().ordinal
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |index| SyntaxNode {
                tree,
                index: *index,
            })
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    /// This node followed by its ancestors.
    pub fn ancestors_inclusive(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        std::iter::successors(Some(*self), |node| node.parent())
    }

    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.from()..self.to())
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.kind(), self.from(), self.to())
    }
}
