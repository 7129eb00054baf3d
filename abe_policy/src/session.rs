//! The policy editing session: one tree plus the editor's selection.
//!
//! A UI adapter forwards clicks and menu choices to a [`Session`]:
//!
//! ```text
//! Idle --select_target(id)--> TargetSelected(id)
//! TargetSelected(id) --choose_operator(kind)--> Idle
//! TargetSelected(id) --open_attribute_picker()--> AttributePickerOpen(id)
//! TargetSelected(id) | AttributePickerOpen(id) --choose_attribute(name)--> Idle
//! any --cancel_selection()--> Idle
//! Idle --confirm()--> Policy
//! ```
//!
//! Every edit publishes a new tree snapshot; previously handed-out snapshots
//! are never modified.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{Level, debug, info, instrument};

use crate::attributes::AttributeUniverse;
use crate::error::{SelectionError, SessionError};
use crate::mutate::replace;
use crate::node::{Node, NodeId, OperatorKind};
use crate::serialize::serialize;
use crate::validate::{is_complete, placeholder_count};

/// Where the editor's selection currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "target", rename_all = "snake_case")]
pub enum SelectionState {
    Idle,
    TargetSelected(NodeId),
    AttributePickerOpen(NodeId),
}

impl SelectionState {
    /// The selected placeholder, if any.
    pub fn target(self) -> Option<NodeId> {
        match self {
            SelectionState::Idle => None,
            SelectionState::TargetSelected(id) | SelectionState::AttributePickerOpen(id) => {
                Some(id)
            }
        }
    }
}

/// A confirmed policy in canonical form, ready for the encryption step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policy(String);

impl Policy {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An editing session over a single policy tree.
#[derive(Debug, Clone)]
pub struct Session {
    tree: Arc<Node>,
    state: SelectionState,
    universe: AttributeUniverse,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Open a session whose tree is a single placeholder, with the default
    /// numbered attribute universe.
    pub fn new() -> Self {
        Self::with_universe(AttributeUniverse::default())
    }

    pub fn with_universe(universe: AttributeUniverse) -> Self {
        Self {
            tree: Arc::new(Node::placeholder()),
            state: SelectionState::Idle,
            universe,
        }
    }

    /// The current tree, for rendering.
    pub fn tree(&self) -> &Arc<Node> {
        &self.tree
    }

    /// An owned handle to the current tree that later edits will not touch.
    pub fn snapshot(&self) -> Arc<Node> {
        Arc::clone(&self.tree)
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn universe(&self) -> &AttributeUniverse {
        &self.universe
    }

    pub fn is_complete(&self) -> bool {
        is_complete(&self.tree)
    }

    /// Make the placeholder `id` the active edit target.
    ///
    /// Replaces any pending selection. On error the previous selection is kept.
    #[instrument(level = Level::TRACE, skip(self))]
    pub fn select_target(&mut self, id: NodeId) -> Result<(), SessionError> {
        match self.tree.find(id) {
            Some(node) if node.is_placeholder() => {
                if let Some(previous) = self.state.target()
                    && previous != id
                {
                    debug!(%previous, "dropping pending selection");
                }
                self.state = SelectionState::TargetSelected(id);
                debug!(%id, "target selected");
                Ok(())
            }
            Some(_) => Err(SelectionError::NotAPlaceholder(id).into()),
            None => Err(SelectionError::UnknownNode(id).into()),
        }
    }

    /// Drop the selection without touching the tree.
    pub fn cancel_selection(&mut self) {
        if self.state != SelectionState::Idle {
            debug!(state = ?self.state, "selection cancelled");
        }
        self.state = SelectionState::Idle;
    }

    /// Replace the selected placeholder with a fresh `kind` operator whose
    /// operands are new placeholders.
    #[instrument(level = Level::TRACE, skip(self))]
    pub fn choose_operator(&mut self, kind: OperatorKind) -> Result<(), SessionError> {
        let target = match self.state {
            SelectionState::TargetSelected(id) => id,
            SelectionState::AttributePickerOpen(_) => return Err(SelectionError::PickerOpen.into()),
            SelectionState::Idle => return Err(SelectionError::NothingSelected.into()),
        };
        self.commit(target, Node::operator(kind))?;
        debug!(%target, %kind, "operator inserted");
        Ok(())
    }

    /// Open the attribute picker for the selected placeholder and return the
    /// candidate names in display order.
    pub fn open_attribute_picker(&mut self) -> Result<&[String], SessionError> {
        let target = match self.state {
            SelectionState::TargetSelected(id) | SelectionState::AttributePickerOpen(id) => id,
            SelectionState::Idle => return Err(SelectionError::NothingSelected.into()),
        };
        self.state = SelectionState::AttributePickerOpen(target);
        debug!(%target, "attribute picker opened");
        Ok(self.universe.names())
    }

    /// Replace the selected placeholder with an attribute leaf for `name`.
    ///
    /// Surrounding whitespace is trimmed. A blank name is rejected and the
    /// selection is kept.
    #[instrument(level = Level::TRACE, skip_all)]
    pub fn choose_attribute(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        let name = name.into();
        let target = self.state.target().ok_or(SelectionError::NothingSelected)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyAttribute);
        }
        debug!(%target, %name, "inserting attribute");
        self.commit(target, Node::attribute(name))?;
        Ok(())
    }

    /// Choose the picker entry at `index` in the attribute universe.
    pub fn pick_attribute(&mut self, index: usize) -> Result<(), SessionError> {
        let name = self
            .universe
            .get(index)
            .ok_or(SessionError::UnknownAttribute {
                index,
                available: self.universe.len(),
            })?
            .to_string();
        self.choose_attribute(name)
    }

    /// Validate and serialize the tree. Only legal with nothing selected.
    #[instrument(level = Level::TRACE, skip(self))]
    pub fn confirm(&self) -> Result<Policy, SessionError> {
        if self.state != SelectionState::Idle {
            return Err(SelectionError::PendingSelection.into());
        }
        if !is_complete(&self.tree) {
            let remaining = placeholder_count(&self.tree);
            debug!(remaining, "confirm rejected: tree incomplete");
            return Err(SessionError::IncompleteTree { remaining });
        }
        let policy = Policy(serialize(&self.tree)?);
        info!(policy = %policy, "policy confirmed");
        Ok(policy)
    }

    /// Swap `target` for `node`, returning to Idle. The target must still be
    /// a placeholder in the current tree.
    fn commit(&mut self, target: NodeId, node: Node) -> Result<(), SessionError> {
        let current = self.tree.find(target).map(Node::is_placeholder);
        self.state = SelectionState::Idle;
        match current {
            Some(true) => {
                self.tree = replace(&self.tree, target, node);
                Ok(())
            }
            Some(false) => Err(SelectionError::NotAPlaceholder(target).into()),
            None => Err(SelectionError::UnknownNode(target).into()),
        }
    }
}
