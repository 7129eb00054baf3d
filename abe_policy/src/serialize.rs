//! Canonical policy strings.
//!
//! Grammar of the output:
//!
//! ```text
//! Policy    := Attribute | Not | And | Or
//! Not       := '¬(' Policy ')'
//! And       := '(' Policy ' ∧ ' Policy ')'
//! Or        := '(' Policy ' ∨ ' Policy ')'
//! ```
//!
//! Every binary operator is parenthesized regardless of depth. The form is
//! canonical, not minimal.

use crate::error::SerializeError;
use crate::node::Node;

/// Render a complete tree to its canonical policy string.
///
/// Fails on the first placeholder reached in preorder; callers should check
/// [`crate::is_complete`] first.
pub fn serialize(root: &Node) -> Result<String, SerializeError> {
    if let Some(id) = root.placeholders().first() {
        return Err(SerializeError::Placeholder { id: *id });
    }
    Ok(root.to_string())
}

/// Render a possibly incomplete tree, drawing placeholders as `□`.
pub fn preview(root: &Node) -> String {
    root.to_string()
}
