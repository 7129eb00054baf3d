//! Copy-on-write replacement by node id.
//!
//! Only the path from the root down to the target is rebuilt; every other
//! subtree is shared with the input tree through its [`Arc`].

use std::sync::Arc;

use tracing::{Level, debug, instrument};

use crate::node::{Node, NodeId};

/// Return a tree identical to `root` except that the node with id `target`
/// is substituted by `replacement`.
///
/// The replacement is adopted verbatim, including its own id and subtree.
/// An unknown `target` is not an error: the input tree is returned as is.
#[instrument(level = Level::TRACE, skip(root, replacement))]
pub fn replace(root: &Arc<Node>, target: NodeId, replacement: Node) -> Arc<Node> {
    let mut replacement = Some(replacement);
    match rebuild(root, target, &mut replacement) {
        Some(new_root) => new_root,
        None => {
            debug!(%target, "replace target not in tree; tree unchanged");
            Arc::clone(root)
        }
    }
}

/// Rebuild `node` with the target substituted. `None` means the target is not
/// below `node`, so the caller keeps sharing the original.
fn rebuild(node: &Arc<Node>, target: NodeId, replacement: &mut Option<Node>) -> Option<Arc<Node>> {
    if node.id() == Some(target) {
        return replacement.take().map(Arc::new);
    }

    match node.as_ref() {
        Node::Placeholder { .. } | Node::Attribute { .. } => None,
        Node::Not { id, child, nested } => {
            let child = rebuild(child, target, replacement)?;
            Some(Arc::new(Node::Not {
                id: *id,
                child,
                nested: *nested,
            }))
        }
        Node::Binary {
            id,
            op,
            left,
            right,
            nested,
        } => {
            let (left, right) = match rebuild(left, target, replacement) {
                Some(new_left) => (new_left, Arc::clone(right)),
                None => (Arc::clone(left), rebuild(right, target, replacement)?),
            };
            Some(Arc::new(Node::Binary {
                id: *id,
                op: *op,
                left,
                right,
                nested: *nested,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BinaryOp, OperatorKind};
    use proptest::prelude::*;

    fn child_ids(node: &Node) -> Vec<NodeId> {
        node.children().iter().filter_map(|c| c.id()).collect()
    }

    #[test]
    fn replacing_root_adopts_replacement() {
        let root = Arc::new(Node::placeholder());
        let target = root.id().unwrap();
        let op = Node::operator(OperatorKind::And);
        let op_id = op.id();

        let new_root = replace(&root, target, op);
        assert_eq!(new_root.id(), op_id);
        assert_eq!(new_root.to_string(), "(□ ∧ □)");
    }

    #[test]
    fn replacing_child_rebuilds_only_the_path() {
        let root = Arc::new(Node::binary(
            BinaryOp::And,
            Some(Node::not(None)),
            Some(Node::attribute("role")),
        ));
        let Node::Binary { left, right, .. } = root.as_ref() else {
            unreachable!()
        };
        let target = left.placeholders()[0];

        let new_root = replace(&root, target, Node::attribute("dept"));
        assert_eq!(new_root.to_string(), "(¬(dept) ∧ role)");
        assert_eq!(new_root.id(), root.id());

        let Node::Binary {
            left: new_left,
            right: new_right,
            ..
        } = new_root.as_ref()
        else {
            unreachable!()
        };
        assert_eq!(new_left.id(), left.id());
        assert!(!Arc::ptr_eq(new_left, left));
        assert!(Arc::ptr_eq(new_right, right));
        // Input snapshot is untouched.
        assert_eq!(root.to_string(), "(¬(□) ∧ role)");
    }

    #[test]
    fn unknown_target_returns_same_tree() {
        let root = Arc::new(Node::operator(OperatorKind::Or));
        let new_root = replace(&root, NodeId::generate(), Node::attribute("x"));
        assert!(Arc::ptr_eq(&root, &new_root));
    }

    #[test]
    fn operator_children_keep_their_ids() {
        let root = Arc::new(Node::placeholder());
        let op = Node::operator(OperatorKind::And);
        let expected = child_ids(&op);
        let new_root = replace(&root, root.id().unwrap(), op);
        assert_eq!(child_ids(&new_root), expected);
    }

    // -----------------------------------------------------------------------
    // Property-based tests
    // -----------------------------------------------------------------------

    fn arb_tree() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![
            any::<u8>().prop_map(|_| Node::placeholder()),
            "[a-z]{1,6}".prop_map(Node::attribute),
        ];
        leaf.prop_recursive(5, 48, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone(), any::<bool>()).prop_map(|(l, r, and)| {
                    let op = if and { BinaryOp::And } else { BinaryOp::Or };
                    Node::binary(op, Some(l), Some(r))
                }),
                inner.prop_map(|c| Node::not(Some(c))),
            ]
        })
    }

    fn all_ids(node: &Node, out: &mut Vec<NodeId>) {
        if let Some(id) = node.id() {
            out.push(id);
        }
        for child in node.children() {
            all_ids(child, out);
        }
    }

    proptest! {
        /// Every subtree that does not contain the target survives the edit
        /// unchanged and shared; ancestors of the target keep their ids.
        #[test]
        fn untouched_subtrees_are_preserved(tree in arb_tree(), pick in any::<prop::sample::Index>()) {
            let slots = tree.placeholders();
            prop_assume!(!slots.is_empty());
            let target = slots[pick.index(slots.len())];
            let root = Arc::new(tree);

            let new_root = replace(&root, target, Node::attribute("zz"));

            let mut ids = Vec::new();
            all_ids(&root, &mut ids);
            for id in ids.into_iter().filter(|id| *id != target) {
                let old = root.find(id).unwrap();
                let new = new_root.find(id);
                prop_assert!(new.is_some(), "node {} vanished", id);
                let new = new.unwrap();
                if !old.contains(target) {
                    prop_assert_eq!(old, new);
                    prop_assert!(std::ptr::eq(old, new), "subtree {} was copied", id);
                }
            }
        }

        /// Exactly the targeted placeholder is consumed.
        #[test]
        fn only_the_target_placeholder_changes(tree in arb_tree(), pick in any::<prop::sample::Index>()) {
            let slots = tree.placeholders();
            prop_assume!(!slots.is_empty());
            let target = slots[pick.index(slots.len())];
            let root = Arc::new(tree);

            let new_root = replace(&root, target, Node::attribute("zz"));

            let expected: Vec<NodeId> = slots.iter().copied().filter(|id| *id != target).collect();
            prop_assert_eq!(new_root.placeholders(), expected);
            prop_assert!(!new_root.contains(target));
        }
    }
}
