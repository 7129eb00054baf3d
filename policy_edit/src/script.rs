//! Editor script parsing.
//!
//! A script is a YAML document describing the clicks and menu choices a user
//! makes in the policy editor, each optionally followed by expectations:
//!
//! ```yaml
//! meta:
//!   name: conjunction
//! attributes: [age, role]
//! steps:
//!   - select: root
//!   - operator: and
//!   - select: left
//!   - attribute: age
//!   - select: right
//!   - attribute: role
//!   - confirm: true
//!     expect:
//!       policy: "(age ∧ role)"
//! ```

use std::fmt;
use std::path::Path;

use abe_policy::OperatorKind;
use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Selection states an expectation may name.
pub const STATE_NAMES: [&str; 3] = ["idle", "selected", "picker"];

/// A complete editor script.
#[derive(Debug, Clone, Deserialize)]
pub struct EditorScript {
    /// Metadata about the script.
    pub meta: Meta,

    /// Attribute universe for this script. Replaces the configured one.
    #[serde(default)]
    pub attributes: Option<Vec<String>>,

    /// Ordered editor actions.
    pub steps: Vec<Step>,
}

/// Script metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    /// Human-readable name of the script.
    pub name: String,

    /// Optional description.
    #[serde(default)]
    #[allow(dead_code)]
    pub description: Option<String>,
}

/// A single editor action plus what should hold afterwards.
///
/// Exactly one action field must be set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Label shown in reports. Defaults to the action.
    #[serde(default)]
    pub name: Option<String>,

    /// Select the placeholder at this path (`root`, `left.child`, ...).
    #[serde(default)]
    pub select: Option<String>,

    /// Insert an operator: `and`, `or`, `not`.
    #[serde(default)]
    pub operator: Option<String>,

    /// Open the attribute picker.
    #[serde(default)]
    pub open_picker: bool,

    /// Insert an attribute by name.
    #[serde(default)]
    pub attribute: Option<String>,

    /// Insert the picker entry at this index.
    #[serde(default)]
    pub pick: Option<usize>,

    /// Cancel the current selection.
    #[serde(default)]
    pub cancel: bool,

    /// Confirm the policy.
    #[serde(default)]
    pub confirm: bool,

    /// Expected outcome.
    #[serde(default)]
    pub expect: Expectation,
}

/// Expected outcome of a step.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// Whether the tree should be complete afterwards.
    #[serde(default)]
    pub complete: Option<bool>,

    /// Canonical policy string the step should produce (confirm steps).
    #[serde(default)]
    pub policy: Option<String>,

    /// Substring of the error the step should fail with.
    #[serde(default)]
    pub error: Option<String>,

    /// Preview rendering of the tree afterwards, placeholders as `□`.
    #[serde(default)]
    pub preview: Option<String>,

    /// Selection state afterwards: `idle`, `selected` or `picker`.
    #[serde(default)]
    pub state: Option<String>,
}

/// The resolved action of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Select(String),
    Operator(OperatorKind),
    OpenPicker,
    Attribute(String),
    Pick(usize),
    Cancel,
    Confirm,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Select(path) => write!(f, "select {path}"),
            Action::Operator(kind) => write!(f, "operator {kind}"),
            Action::OpenPicker => write!(f, "open picker"),
            Action::Attribute(name) => write!(f, "attribute {name}"),
            Action::Pick(index) => write!(f, "pick #{index}"),
            Action::Cancel => write!(f, "cancel"),
            Action::Confirm => write!(f, "confirm"),
        }
    }
}

impl Step {
    /// Resolve the single action this step performs.
    pub fn action(&self) -> Result<Action> {
        let mut actions = Vec::new();
        if let Some(ref path) = self.select {
            actions.push(Action::Select(path.clone()));
        }
        if let Some(ref op) = self.operator {
            let kind = op.parse::<OperatorKind>().map_err(anyhow::Error::msg)?;
            actions.push(Action::Operator(kind));
        }
        if self.open_picker {
            actions.push(Action::OpenPicker);
        }
        if let Some(ref name) = self.attribute {
            actions.push(Action::Attribute(name.clone()));
        }
        if let Some(index) = self.pick {
            actions.push(Action::Pick(index));
        }
        if self.cancel {
            actions.push(Action::Cancel);
        }
        if self.confirm {
            actions.push(Action::Confirm);
        }

        match actions.len() {
            1 => Ok(actions.remove(0)),
            0 => bail!("step has no action"),
            n => bail!("step has {n} actions; expected exactly one"),
        }
    }

    /// Label for reports.
    pub fn label(&self) -> String {
        match (&self.name, self.action()) {
            (Some(name), _) => name.clone(),
            (None, Ok(action)) => action.to_string(),
            (None, Err(_)) => "<invalid step>".into(),
        }
    }
}

impl EditorScript {
    /// Parse a script from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse a script from a YAML string.
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Structural problems that would make the script fail regardless of the
    /// editor's behavior.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.steps.is_empty() {
            problems.push("script has no steps".to_string());
        }
        if self.attributes.as_ref().is_some_and(|a| a.is_empty()) {
            problems.push("attributes list is empty; the picker will offer nothing".to_string());
        }
        for (i, step) in self.steps.iter().enumerate() {
            let n = i + 1;
            match step.action() {
                Ok(action) => {
                    if step.expect.policy.is_some() && action != Action::Confirm {
                        problems.push(format!(
                            "step {n} ({action}) expects a policy but only confirm produces one"
                        ));
                    }
                }
                Err(e) => problems.push(format!("step {n}: {e}")),
            }
            if let Some(ref state) = step.expect.state
                && !STATE_NAMES.contains(&state.as_str())
            {
                problems.push(format!(
                    "step {n}: unknown state '{state}' (expected one of {})",
                    STATE_NAMES.join(", ")
                ));
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_script() {
        let yaml = r#"
meta:
  name: conjunction
  description: two attributes joined by and

attributes: [age, role]

steps:
  - select: root
  - name: make it an and
    operator: and
    expect:
      preview: "(□ ∧ □)"
      complete: false
  - select: left
  - pick: 0
  - select: right
  - attribute: role
  - confirm: true
    expect:
      policy: "(age ∧ role)"
"#;

        let script = EditorScript::from_str(yaml).unwrap();
        assert_eq!(script.meta.name, "conjunction");
        assert_eq!(script.attributes.as_deref(), Some(&["age".to_string(), "role".to_string()][..]));
        assert_eq!(script.steps.len(), 7);
        assert_eq!(script.steps[0].action().unwrap(), Action::Select("root".into()));
        assert_eq!(
            script.steps[1].action().unwrap(),
            Action::Operator(OperatorKind::And)
        );
        assert_eq!(script.steps[1].label(), "make it an and");
        assert_eq!(script.steps[3].label(), "pick #0");
        assert_eq!(script.steps[6].expect.policy.as_deref(), Some("(age ∧ role)"));
        assert!(script.validate().is_empty());
    }

    #[test]
    fn test_step_needs_exactly_one_action() {
        let yaml = r#"
meta:
  name: broken
steps:
  - cancel: true
    confirm: true
  - expect:
      complete: false
"#;
        let script = EditorScript::from_str(yaml).unwrap();
        assert!(script.steps[0].action().is_err());
        assert!(script.steps[1].action().is_err());
        let problems = script.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("2 actions"));
        assert!(problems[1].contains("no action"));
    }

    #[test]
    fn test_unknown_operator() {
        let step = Step {
            operator: Some("xor".into()),
            ..Step::default()
        };
        let err = step.action().unwrap_err();
        assert!(err.to_string().contains("xor"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
meta:
  name: typo
steps:
  - selct: root
"#;
        assert!(EditorScript::from_str(yaml).is_err());
    }

    #[test]
    fn test_validate_flags_misplaced_expectations() {
        let yaml = r#"
meta:
  name: misplaced
steps:
  - select: root
    expect:
      policy: "a"
      state: busy
"#;
        let script = EditorScript::from_str(yaml).unwrap();
        let problems = script.validate();
        assert_eq!(problems.len(), 2, "{problems:?}");
        assert!(problems[0].contains("only confirm"));
        assert!(problems[1].contains("unknown state 'busy'"));
    }
}
