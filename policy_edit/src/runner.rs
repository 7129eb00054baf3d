//! Script runner.
//!
//! Replays each step of an [`EditorScript`] against a fresh [`Session`], the
//! way a UI adapter forwards clicks, and records what happened.

use abe_policy::locate::resolve;
use abe_policy::{AttributeUniverse, Policy, Session};
use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::assertions::{AssertionResult, check};
use crate::script::{Action, EditorScript};

/// What a single step produced.
#[derive(Debug, Default)]
pub struct StepOutcome {
    /// Policy returned by a successful confirm.
    pub policy: Option<Policy>,

    /// Error the action failed with, if any.
    pub error: Option<anyhow::Error>,
}

/// Result of one step.
#[derive(Debug)]
pub struct StepReport {
    pub label: String,
    pub outcome: StepOutcome,
    pub assertion: AssertionResult,
    /// Preview of the tree after the step.
    pub preview: String,
}

/// Result of a whole script.
#[derive(Debug)]
pub struct ScriptReport {
    pub name: String,
    pub steps: Vec<StepReport>,
}

impl ScriptReport {
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.assertion.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.assertion.passed).count()
    }
}

/// Open a session using the script's own attributes, or `base` when the script
/// declares none.
pub fn new_session(script: &EditorScript, base: &AttributeUniverse) -> Session {
    let universe = match script.attributes {
        Some(ref names) => AttributeUniverse::from_names(names.iter().cloned()),
        None => base.clone(),
    };
    Session::with_universe(universe)
}

/// Perform one action on the session.
pub fn apply(session: &mut Session, action: &Action) -> Result<Option<Policy>> {
    match action {
        Action::Select(path) => {
            let id = resolve(session.tree(), path)?.id().with_context(|| {
                format!("node at '{path}' is an attribute leaf and cannot be selected")
            })?;
            session.select_target(id)?;
        }
        Action::Operator(kind) => session.choose_operator(*kind)?,
        Action::OpenPicker => {
            let choices = session.open_attribute_picker()?;
            debug!(choices = choices.len(), "picker opened");
        }
        Action::Attribute(name) => session.choose_attribute(name.as_str())?,
        Action::Pick(index) => session.pick_attribute(*index)?,
        Action::Cancel => session.cancel_selection(),
        Action::Confirm => return Ok(Some(session.confirm()?)),
    }
    Ok(None)
}

/// Run every step of `script` and check its expectations.
pub fn run_script(script: &EditorScript, base: &AttributeUniverse) -> Result<ScriptReport> {
    let mut session = new_session(script, base);
    let mut steps = Vec::with_capacity(script.steps.len());

    for (i, step) in script.steps.iter().enumerate() {
        let action = step
            .action()
            .with_context(|| format!("step {} of '{}'", i + 1, script.meta.name))?;

        let outcome = match apply(&mut session, &action) {
            Ok(policy) => StepOutcome {
                policy,
                error: None,
            },
            Err(e) => StepOutcome {
                policy: None,
                error: Some(e),
            },
        };
        let assertion = check(&step.expect, &outcome, &session);
        debug!(step = i + 1, %action, passed = assertion.passed, "step finished");

        steps.push(StepReport {
            label: step.label(),
            outcome,
            assertion,
            preview: session.tree().to_string(),
        });
    }

    Ok(ScriptReport {
        name: script.meta.name.clone(),
        steps,
    })
}

/// Replay a script ignoring expectations and return the final session.
///
/// Failing actions are logged and skipped.
pub fn replay(script: &EditorScript, base: &AttributeUniverse) -> Result<Session> {
    let mut session = new_session(script, base);
    for (i, step) in script.steps.iter().enumerate() {
        let action = step
            .action()
            .with_context(|| format!("step {} of '{}'", i + 1, script.meta.name))?;
        if let Err(e) = apply(&mut session, &action) {
            warn!(step = i + 1, %action, error = %e, "action failed during replay");
        }
    }
    Ok(session)
}
