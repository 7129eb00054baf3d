//! Structural paths for addressing nodes without knowing their ids.
//!
//! A path is `root` (or empty) followed by dot-separated steps:
//! `left`, `right` for binary operands and `child` for the operand of `not`.
//! `left.child` is the operand of a `not` sitting in the left slot of the root.

use std::fmt;
use std::str::FromStr;

use crate::error::LocateError;
use crate::node::{Node, NodeId};

/// One step down the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Left,
    Right,
    Child,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Left => write!(f, "left"),
            Step::Right => write!(f, "right"),
            Step::Child => write!(f, "child"),
        }
    }
}

impl FromStr for Step {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Step::Left),
            "right" => Ok(Step::Right),
            "child" => Ok(Step::Child),
            other => Err(LocateError::InvalidStep(other.to_string())),
        }
    }
}

/// Parse a path into steps. `root` and the empty string are the root itself.
pub fn parse_path(path: &str) -> Result<Vec<Step>, LocateError> {
    let path = path.trim();
    let path = path
        .strip_prefix("root")
        .map(|rest| rest.trim_start_matches('.'))
        .unwrap_or(path);
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split('.').map(str::parse).collect()
}

/// Walk `path` from `root`.
pub fn resolve<'a>(root: &'a Node, path: &str) -> Result<&'a Node, LocateError> {
    let mut node = root;
    let mut walked = String::from("root");
    for step in parse_path(path)? {
        let next = match (node, step) {
            (Node::Binary { left, .. }, Step::Left) => Some(left.as_ref()),
            (Node::Binary { right, .. }, Step::Right) => Some(right.as_ref()),
            (Node::Not { child, .. }, Step::Child) => Some(child.as_ref()),
            _ => None,
        };
        node = next.ok_or_else(|| LocateError::NoSuchStep {
            path: walked.clone(),
            step: step.to_string(),
        })?;
        walked.push('.');
        walked.push_str(&step.to_string());
    }
    Ok(node)
}

/// Every placeholder with its path, in preorder.
pub fn placeholder_paths(root: &Node) -> Vec<(String, NodeId)> {
    let mut out = Vec::new();
    walk(root, "root".to_string(), &mut out);
    out
}

fn walk(node: &Node, path: String, out: &mut Vec<(String, NodeId)>) {
    match node {
        Node::Placeholder { id } => out.push((path, *id)),
        Node::Attribute { .. } => {}
        Node::Binary { left, right, .. } => {
            walk(left, format!("{path}.left"), out);
            walk(right, format!("{path}.right"), out);
        }
        Node::Not { child, .. } => walk(child, format!("{path}.child"), out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BinaryOp, OperatorKind};

    fn sample() -> Node {
        Node::binary(
            BinaryOp::And,
            Some(Node::not(None)),
            Some(Node::attribute("role")),
        )
    }

    #[test]
    fn root_spellings() {
        let tree = sample();
        assert!(parse_path("").unwrap().is_empty());
        assert!(parse_path("root").unwrap().is_empty());
        assert_eq!(parse_path("root.left").unwrap(), vec![Step::Left]);
        assert!(std::ptr::eq(resolve(&tree, "root").unwrap(), &tree));
    }

    #[test]
    fn resolves_nested_steps() {
        let tree = sample();
        assert!(resolve(&tree, "left.child").unwrap().is_placeholder());
        assert_eq!(resolve(&tree, "right").unwrap(), &Node::attribute("role"));
    }

    #[test]
    fn wrong_step_for_shape() {
        let tree = sample();
        let err = resolve(&tree, "left.left").unwrap_err();
        assert_eq!(
            err,
            LocateError::NoSuchStep {
                path: "root.left".into(),
                step: "left".into()
            }
        );
        assert!(matches!(
            resolve(&tree, "up").unwrap_err(),
            LocateError::InvalidStep(s) if s == "up"
        ));
    }

    #[test]
    fn lists_placeholder_paths() {
        let tree = Node::binary(
            BinaryOp::Or,
            Some(Node::operator(OperatorKind::Not)),
            None,
        );
        let paths: Vec<String> = placeholder_paths(&tree).into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["root.left.child", "root.right"]);
    }
}
