//! Error types for policy editing.

use std::path::PathBuf;

use crate::node::NodeId;

/// A serializer reached a placeholder. Callers must validate first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
    #[error("cannot serialize incomplete policy: placeholder {id} is unresolved")]
    Placeholder { id: NodeId },
}

/// An editor action that does not fit the current selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no placeholder is selected")]
    NothingSelected,

    #[error("node {0} is not a placeholder")]
    NotAPlaceholder(NodeId),

    #[error("node {0} is not in the current tree")]
    UnknownNode(NodeId),

    #[error("the attribute picker is open")]
    PickerOpen,

    #[error("a placeholder is still selected")]
    PendingSelection,
}

/// Errors reported by a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),

    #[error("policy is incomplete: {remaining} placeholder(s) left to fill")]
    IncompleteTree { remaining: usize },

    #[error("no attribute at index {index} (universe has {available})")]
    UnknownAttribute { index: usize, available: usize },

    #[error("attribute name is empty")]
    EmptyAttribute,

    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

impl SessionError {
    /// Return a help message suggesting how to fix this error, if applicable.
    pub fn help(&self) -> Option<String> {
        match self {
            SessionError::InvalidSelection(SelectionError::NothingSelected) => {
                Some("select a placeholder before choosing an operator or attribute".into())
            }
            SessionError::InvalidSelection(SelectionError::NotAPlaceholder(_)) => {
                Some("only empty slots can be edited; pick one of the remaining placeholders".into())
            }
            SessionError::InvalidSelection(SelectionError::PickerOpen) => {
                Some("choose an attribute from the picker or cancel the selection".into())
            }
            SessionError::InvalidSelection(SelectionError::PendingSelection) => {
                Some("finish or cancel the current selection before confirming".into())
            }
            SessionError::IncompleteTree { .. } => {
                Some("fill every placeholder with an operator or attribute, then confirm again".into())
            }
            SessionError::UnknownAttribute { available, .. } => Some(format!(
                "pick an index between 0 and {}",
                available.saturating_sub(1)
            )),
            SessionError::EmptyAttribute => {
                Some("attribute names need at least one non-whitespace character".into())
            }
            _ => None,
        }
    }
}

/// A structural path that does not lead to a node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("invalid path step '{0}'")]
    InvalidStep(String),

    #[error("path '{path}' has no '{step}' child")]
    NoSuchStep { path: String, step: String },
}

impl LocateError {
    pub fn help(&self) -> Option<String> {
        match self {
            LocateError::InvalidStep(_) => Some(
                "paths are 'root' or dot-separated steps: left, right, child (e.g. left.child)"
                    .into(),
            ),
            LocateError::NoSuchStep { .. } => Some(
                "binary operators have left/right, `not` has child, leaves have none".into(),
            ),
        }
    }
}

/// Errors loading the attribute universe.
#[derive(Debug, thiserror::Error)]
pub enum AttributeError {
    #[error("failed to read attribute file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
