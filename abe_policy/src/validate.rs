//! Completeness checks gating whether a policy is usable.

use crate::node::Node;

/// A tree is complete when no reachable node is an editable placeholder.
pub fn is_complete(root: &Node) -> bool {
    match root {
        Node::Placeholder { .. } => false,
        Node::Attribute { .. } => true,
        Node::Not { child, .. } => is_complete(child),
        Node::Binary { left, right, .. } => is_complete(left) && is_complete(right),
    }
}

/// Number of placeholders still waiting to be filled.
pub fn placeholder_count(root: &Node) -> usize {
    match root {
        Node::Placeholder { .. } => 1,
        Node::Attribute { .. } => 0,
        Node::Not { child, .. } => placeholder_count(child),
        Node::Binary { left, right, .. } => placeholder_count(left) + placeholder_count(right),
    }
}
