//! # ABE Policy
//!
//! Access-control policy expressions for attribute-based encryption, built
//! interactively one placeholder at a time.
//!
//! ## Overview
//!
//! A policy is a boolean formula over attribute names using `and`, `or` and
//! `not`. An editor starts from a single placeholder and repeatedly replaces
//! one placeholder with either an operator (whose operands are new
//! placeholders) or an attribute leaf. Once no placeholder remains the tree
//! renders to a fully parenthesized canonical string:
//!
//! ```text
//! (age ∧ (role ∨ ¬(dept)))
//! ```
//!
//! This crate provides:
//! - [`Node`], the tree data model with stable per-node ids
//! - [`replace`], copy-on-write replacement by id
//! - [`is_complete`] and [`serialize`], the completeness gate and renderer
//! - [`Session`], the editor state machine a UI drives
//! - [`AttributeUniverse`], the candidate attribute names for the picker
//!
//! ## Quick Start
//!
//! ```rust
//! use abe_policy::{OperatorKind, Session};
//!
//! let mut session = Session::new();
//! let root = session.tree().id().unwrap();
//! session.select_target(root).unwrap();
//! session.choose_operator(OperatorKind::And).unwrap();
//!
//! let slots = session.tree().placeholders();
//! session.select_target(slots[0]).unwrap();
//! session.choose_attribute("age").unwrap();
//! session.select_target(slots[1]).unwrap();
//! session.choose_attribute("role").unwrap();
//!
//! assert_eq!(session.confirm().unwrap().as_str(), "(age ∧ role)");
//! ```

pub mod attributes;
pub mod error;
pub mod locate;
pub mod mutate;
pub mod node;
pub mod serialize;
pub mod session;
pub mod validate;

pub use attributes::{AttributeUniverse, DEFAULT_POOL_SIZE};
pub use error::{AttributeError, LocateError, SelectionError, SerializeError, SessionError};
pub use mutate::replace;
pub use node::{BinaryOp, Node, NodeId, OperatorKind};
pub use serialize::{preview, serialize};
pub use session::{Policy, SelectionState, Session};
pub use validate::{is_complete, placeholder_count};
