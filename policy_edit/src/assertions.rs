//! Assertion engine.
//!
//! Validates step outcomes and the session afterwards against the
//! expectations in a script.

use abe_policy::{SelectionState, Session};

use crate::runner::StepOutcome;
use crate::script::Expectation;

/// Result of checking assertions for a single step.
#[derive(Debug)]
pub struct AssertionResult {
    pub passed: bool,
    pub failures: Vec<String>,
}

/// Short name of a selection state, as written in scripts.
pub fn state_name(state: SelectionState) -> &'static str {
    match state {
        SelectionState::Idle => "idle",
        SelectionState::TargetSelected(_) => "selected",
        SelectionState::AttributePickerOpen(_) => "picker",
    }
}

/// Check all assertions for a step.
pub fn check(expect: &Expectation, outcome: &StepOutcome, session: &Session) -> AssertionResult {
    let mut failures = Vec::new();

    // Errors: expected substring, or none at all
    match (&expect.error, &outcome.error) {
        (Some(expected), Some(actual)) => {
            let actual = format!("{actual:#}");
            if !actual.contains(expected.as_str()) {
                failures.push(format!(
                    "error: expected to contain \"{expected}\", got \"{actual}\""
                ));
            }
        }
        (Some(expected), None) => {
            failures.push(format!(
                "error: expected \"{expected}\", but the step succeeded"
            ));
        }
        (None, Some(actual)) => {
            failures.push(format!("unexpected error: {actual:#}"));
        }
        (None, None) => {}
    }

    if let Some(ref expected) = expect.policy {
        match &outcome.policy {
            Some(actual) if actual.as_str() == expected => {}
            Some(actual) => failures.push(format!(
                "policy: expected \"{expected}\", got \"{actual}\""
            )),
            None => failures.push(format!(
                "policy: expected \"{expected}\", but no policy was produced"
            )),
        }
    }

    if let Some(expected) = expect.complete {
        let actual = session.is_complete();
        if actual != expected {
            failures.push(format!("complete: expected {expected}, got {actual}"));
        }
    }

    if let Some(ref expected) = expect.preview {
        let actual = session.tree().to_string();
        if actual != *expected {
            failures.push(format!(
                "preview: expected \"{expected}\", got \"{actual}\""
            ));
        }
    }

    if let Some(ref expected) = expect.state {
        let actual = state_name(session.state());
        if actual != expected.as_str() {
            failures.push(format!("state: expected {expected}, got {actual}"));
        }
    }

    AssertionResult {
        passed: failures.is_empty(),
        failures,
    }
}
