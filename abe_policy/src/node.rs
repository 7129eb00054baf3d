//! Policy expression nodes.
//!
//! A policy tree is built from four node shapes: an unresolved placeholder,
//! an attribute leaf, a binary `and`/`or` operator, and a unary `not`.
//! Children sit behind [`Arc`] so successive snapshots of a tree share every
//! subtree an edit did not touch.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Glyph for unary negation in rendered policies.
pub const NOT_GLYPH: char = '¬';

/// Glyph drawn for an unresolved placeholder in previews.
pub const PLACEHOLDER_GLYPH: char = '□';

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identity of an addressable node.
///
/// Ids are UUIDv7 values: a millisecond timestamp followed by random bits.
/// They are only a local addressing key for edits, not a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Binary connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    And,
    Or,
}

impl BinaryOp {
    /// The connective glyph used in rendered policies.
    pub fn glyph(self) -> char {
        match self {
            BinaryOp::And => '∧',
            BinaryOp::Or => '∨',
        }
    }
}

/// An operator offered by the editor's operator menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
    And,
    Or,
    Not,
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::And => write!(f, "and"),
            OperatorKind::Or => write!(f, "or"),
            OperatorKind::Not => write!(f, "not"),
        }
    }
}

impl FromStr for OperatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(OperatorKind::And),
            "or" => Ok(OperatorKind::Or),
            "not" => Ok(OperatorKind::Not),
            _ => Err(format!("unknown operator: {s:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A node in a policy expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// An empty slot the editor still has to fill.
    Placeholder { id: NodeId },
    /// A resolved reference to one attribute name.
    Attribute { content: String },
    /// `(left op right)`.
    Binary {
        id: NodeId,
        op: BinaryOp,
        left: Arc<Node>,
        right: Arc<Node>,
        /// Bracket styling hint for renderers; no semantic meaning.
        nested: bool,
    },
    /// `¬(child)`.
    Not {
        id: NodeId,
        child: Arc<Node>,
        nested: bool,
    },
}

impl Node {
    /// A fresh placeholder with a new id.
    pub fn placeholder() -> Self {
        Node::Placeholder {
            id: NodeId::generate(),
        }
    }

    /// A non-editable attribute leaf.
    pub fn attribute(name: impl Into<String>) -> Self {
        Node::Attribute {
            content: name.into(),
        }
    }

    /// A binary operator node. Omitted children become fresh placeholders.
    pub fn binary(op: BinaryOp, left: Option<Node>, right: Option<Node>) -> Self {
        Node::Binary {
            id: NodeId::generate(),
            op,
            left: Arc::new(left.unwrap_or_else(Node::placeholder)),
            right: Arc::new(right.unwrap_or_else(Node::placeholder)),
            nested: false,
        }
    }

    /// A unary `not` node. An omitted child becomes a fresh placeholder.
    pub fn not(child: Option<Node>) -> Self {
        Node::Not {
            id: NodeId::generate(),
            child: Arc::new(child.unwrap_or_else(Node::placeholder)),
            nested: true,
        }
    }

    /// The node the operator menu inserts for `kind`: an operator whose
    /// operands are all fresh placeholders.
    pub fn operator(kind: OperatorKind) -> Self {
        match kind {
            OperatorKind::And => Node::binary(BinaryOp::And, None, None),
            OperatorKind::Or => Node::binary(BinaryOp::Or, None, None),
            OperatorKind::Not => Node::not(None),
        }
    }

    /// The node's id. Attribute leaves carry none and cannot be addressed.
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Node::Placeholder { id } | Node::Binary { id, .. } | Node::Not { id, .. } => Some(*id),
            Node::Attribute { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Node::Placeholder { .. })
    }

    /// Whether the editor may act on this node. Only placeholders are editable.
    pub fn is_editable(&self) -> bool {
        self.is_placeholder()
    }

    /// Bracket styling hint for operators; `false` for leaves.
    pub fn is_nested(&self) -> bool {
        match self {
            Node::Binary { nested, .. } | Node::Not { nested, .. } => *nested,
            Node::Placeholder { .. } | Node::Attribute { .. } => false,
        }
    }

    /// Direct children in left-to-right order.
    pub fn children(&self) -> Vec<&Arc<Node>> {
        match self {
            Node::Placeholder { .. } | Node::Attribute { .. } => Vec::new(),
            Node::Binary { left, right, .. } => vec![left, right],
            Node::Not { child, .. } => vec![child],
        }
    }

    /// Find the node with `id`, searching in preorder.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children().into_iter().find_map(|c| c.find(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Ids of every placeholder reachable from this node, in preorder.
    pub fn placeholders(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_placeholders(&mut out);
        out
    }

    fn collect_placeholders(&self, out: &mut Vec<NodeId>) {
        match self {
            Node::Placeholder { id } => out.push(*id),
            Node::Attribute { .. } => {}
            Node::Binary { left, right, .. } => {
                left.collect_placeholders(out);
                right.collect_placeholders(out);
            }
            Node::Not { child, .. } => child.collect_placeholders(out),
        }
    }
}

/// Preview rendering: the canonical policy grammar with `□` standing in for
/// unresolved placeholders. Use [`crate::serialize`] for the strict form.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Placeholder { .. } => write!(f, "{PLACEHOLDER_GLYPH}"),
            Node::Attribute { content } => f.write_str(content),
            Node::Binary {
                op, left, right, ..
            } => write!(f, "({left} {} {right})", op.glyph()),
            Node::Not { child, .. } => write!(f, "{NOT_GLYPH}({child})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(n: u128) -> NodeId {
        NodeId::from(Uuid::from_u128(n))
    }

    #[test]
    fn placeholders_get_distinct_ids() {
        let a = Node::placeholder();
        let b = Node::placeholder();
        assert_ne!(a.id(), b.id());
        assert!(a.is_editable());
    }

    #[test]
    fn binary_defaults_to_two_fresh_placeholders() {
        let node = Node::binary(BinaryOp::And, None, None);
        let Node::Binary {
            left, right, nested, ..
        } = &node
        else {
            panic!("expected binary node, got {node:?}");
        };
        assert!(left.is_placeholder());
        assert!(right.is_placeholder());
        assert_ne!(left.id(), right.id());
        assert!(!nested);
        assert!(!node.is_editable());
    }

    #[test]
    fn not_is_nested_and_wraps_placeholder() {
        let node = Node::operator(OperatorKind::Not);
        assert!(node.is_nested());
        assert_eq!(node.children().len(), 1);
        assert!(node.children()[0].is_placeholder());
    }

    #[test]
    fn binary_keeps_supplied_children() {
        let node = Node::binary(BinaryOp::Or, Some(Node::attribute("age")), None);
        assert_eq!(node.to_string(), "(age ∨ □)");
    }

    #[test]
    fn attribute_has_no_id() {
        let leaf = Node::attribute("role");
        assert_eq!(leaf.id(), None);
        assert!(!leaf.is_editable());
        assert!(leaf.children().is_empty());
    }

    #[test]
    fn find_and_placeholders_walk_in_preorder() {
        let node = Node::Binary {
            id: fixed(1),
            op: BinaryOp::And,
            left: Arc::new(Node::Not {
                id: fixed(2),
                child: Arc::new(Node::Placeholder { id: fixed(3) }),
                nested: true,
            }),
            right: Arc::new(Node::Placeholder { id: fixed(4) }),
            nested: false,
        };
        assert_eq!(node.placeholders(), vec![fixed(3), fixed(4)]);
        assert!(node.find(fixed(2)).is_some_and(|n| n.is_nested()));
        assert!(node.contains(fixed(4)));
        assert!(!node.contains(fixed(5)));
    }

    #[test]
    fn operator_kind_round_trips_names() {
        for kind in [OperatorKind::And, OperatorKind::Or, OperatorKind::Not] {
            assert_eq!(kind.to_string().parse::<OperatorKind>(), Ok(kind));
        }
        assert!("xor".parse::<OperatorKind>().is_err());
    }

    #[test]
    fn node_id_parses_display_form() {
        let id = NodeId::generate();
        assert_eq!(id.to_string().parse::<NodeId>().ok(), Some(id));
    }

    #[test]
    fn json_view_of_not_node() {
        let node = Node::Not {
            id: fixed(1),
            child: Arc::new(Node::attribute("dept")),
            nested: true,
        };
        let json = serde_json::to_string_pretty(&node).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "type": "not",
          "id": "00000000-0000-0000-0000-000000000001",
          "child": {
            "type": "attribute",
            "content": "dept"
          },
          "nested": true
        }
        "#);
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
