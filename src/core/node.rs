//! Document tree nodes with source position metadata
//!
//! A [`Node`] is one value of a parsed YAML document: a scalar, a sequence or
//! a mapping. Every node records where it starts in the source text (1-based
//! line and column) and the trailing comment written after it on the same
//! line, if any.
//!
//! Mapping nodes keep their entries as a flat list of children alternating
//! key node, value node. Keys sit at even positions and values at odd
//! positions; [`Node::entries`] walks them pairwise.
//!
//! Nodes that do not exist in the source text (placeholders manufactured
//! while resolving optional paths) carry the sentinel position
//! [`Position::SYNTHETIC`].

use crate::core::pointer::Modifier;
use serde::Serialize;
use std::fmt;

/// The structural kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "a scalar"),
            Self::Sequence => write!(f, "an array"),
            Self::Mapping => write!(f, "a map"),
        }
    }
}

/// A 1-based source position, or the synthetic sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line: i64,
    pub column: i64,
}

impl Position {
    /// Marker for nodes that have no location in the source text
    pub const SYNTHETIC: Position = Position {
        line: -1,
        column: -1,
    };

    pub fn new(line: i64, column: i64) -> Self {
        Self { line, column }
    }

    pub fn is_synthetic(&self) -> bool {
        *self == Self::SYNTHETIC
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::SYNTHETIC
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Why a concrete index could not be computed for a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The shifted index falls outside the sequence
    OutOfRange { index: i64, len: usize },
    /// An insertion modifier was applied to a read
    UnsupportedModifier(Modifier),
}

/// A node of a parsed YAML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    value: Option<String>,
    children: Vec<Node>,
    position: Position,
    trailing_comment: String,
}

impl Node {
    /// Create a scalar node positioned in the source text
    pub fn scalar(value: impl Into<String>, position: Position) -> Self {
        Self {
            kind: NodeKind::Scalar,
            value: Some(value.into()),
            children: Vec::new(),
            position,
            trailing_comment: String::new(),
        }
    }

    /// Create a sequence node from its items
    pub fn sequence(items: Vec<Node>, position: Position) -> Self {
        Self {
            kind: NodeKind::Sequence,
            value: None,
            children: items,
            position,
            trailing_comment: String::new(),
        }
    }

    /// Create a mapping node from `(key, value)` pairs
    pub fn mapping(entries: Vec<(Node, Node)>, position: Position) -> Self {
        let children = entries
            .into_iter()
            .flat_map(|(key, value)| [key, value])
            .collect();
        Self {
            kind: NodeKind::Mapping,
            value: None,
            children,
            position,
            trailing_comment: String::new(),
        }
    }

    /// Attach the comment found after this node on its line
    pub fn with_trailing_comment(mut self, comment: impl Into<String>) -> Self {
        self.trailing_comment = comment.into();
        self
    }

    /// A detached `{key: value}` mapping standing in for an absent match
    pub fn synthetic_entry(key: &str, value: &str) -> Self {
        Self::mapping(
            vec![(
                Self::scalar(key, Position::SYNTHETIC),
                Self::scalar(value, Position::SYNTHETIC),
            )],
            Position::SYNTHETIC,
        )
    }

    /// A detached empty mapping
    pub fn synthetic_mapping() -> Self {
        Self::mapping(Vec::new(), Position::SYNTHETIC)
    }

    /// A detached empty sequence
    pub fn synthetic_sequence() -> Self {
        Self::sequence(Vec::new(), Position::SYNTHETIC)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_scalar(&self) -> bool {
        self.kind == NodeKind::Scalar
    }

    pub fn is_sequence(&self) -> bool {
        self.kind == NodeKind::Sequence
    }

    pub fn is_mapping(&self) -> bool {
        self.kind == NodeKind::Mapping
    }

    /// The scalar text, for scalar nodes
    pub fn scalar_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True when this is a scalar whose text equals `expected`
    pub fn is_scalar_eq(&self, expected: &str) -> bool {
        self.is_scalar() && self.scalar_value() == Some(expected)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Key/value pairs of a mapping; empty for other kinds
    pub fn entries(&self) -> impl Iterator<Item = (&Node, &Node)> {
        let pairs = if self.is_mapping() {
            self.children.as_slice()
        } else {
            &[]
        };
        pairs.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Position of the value paired with the first scalar key equal to `key`
    pub fn value_position_of(&self, key: &str) -> Option<usize> {
        self.entries()
            .position(|(k, _)| k.is_scalar_eq(key))
            .map(|entry| entry * 2 + 1)
    }

    /// The value paired with the first scalar key equal to `key`
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.value_position_of(key).map(|idx| &self.children[idx])
    }

    /// True if this mapping has a scalar `key` whose paired value is the scalar `value`
    pub fn has_scalar_entry(&self, key: &str, value: &str) -> bool {
        self.entries()
            .any(|(k, v)| k.is_scalar_eq(key) && v.is_scalar_eq(value))
    }

    /// Resolve a relative index against this sequence's items
    ///
    /// `prev` and `next` modifiers shift the index by one before it is
    /// bounds-checked. Negative indexes count from the end, `-1` being the
    /// last item.
    pub fn concrete_index(&self, index: i64, modifiers: &[Modifier]) -> Result<usize, IndexError> {
        let mut result = index;
        for modifier in modifiers {
            match modifier {
                Modifier::Prev => result = result.saturating_sub(1),
                Modifier::Next => result = result.saturating_add(1),
                Modifier::Before | Modifier::After => {
                    return Err(IndexError::UnsupportedModifier(*modifier))
                }
            }
        }

        let len = self.children.len();
        let out_of_range = IndexError::OutOfRange { index: result, len };
        if result >= 0 {
            let idx = usize::try_from(result).map_err(|_| out_of_range.clone())?;
            if idx < len {
                return Ok(idx);
            }
            return Err(out_of_range);
        }

        let from_end = usize::try_from(result.unsigned_abs()).map_err(|_| out_of_range.clone())?;
        len.checked_sub(from_end).ok_or(out_of_range)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> i64 {
        self.position.line
    }

    pub fn column(&self) -> i64 {
        self.position.column
    }

    pub fn trailing_comment(&self) -> &str {
        &self.trailing_comment
    }

    pub fn is_synthetic(&self) -> bool {
        self.position.is_synthetic()
    }
}
