//! Per-turn game input and the action an agent answers with.
//!
//! These are plain values owned by the harness. The planner only reads them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Game rules as handed to the agent every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub title: String,
    pub summary: String,
    /// Long-form explanations keyed by rule heading. The model may ask
    /// for any of these with `rule(<heading>)`.
    #[serde(default)]
    pub additional_details: BTreeMap<String, String>,
}

impl Rules {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            additional_details: BTreeMap::new(),
        }
    }

    /// Builder pattern: add an expandable rule heading.
    pub fn with_detail(mut self, heading: impl Into<String>, text: impl Into<String>) -> Self {
        self.additional_details.insert(heading.into(), text.into());
        self
    }

    /// Headings that can be expanded, in sorted order.
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.additional_details.keys().map(String::as_str)
    }

    /// Look up the explanation for a heading.
    pub fn detail(&self, heading: &str) -> Option<&str> {
        self.additional_details.get(heading).map(String::as_str)
    }
}

/// What the agent sees this turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub text: String,
    /// Opaque image handle. Passed through verbatim, never interpreted.
    #[serde(default)]
    pub image: Option<String>,
}

impl Observation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }
}

/// Legal moves for this turn.
///
/// Predefined actions are picked verbatim. Openended actions ask the agent
/// to write a free-form response for the given prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableActions {
    #[serde(default)]
    pub instructions: String,
    /// action id -> description
    #[serde(default)]
    pub predefined: BTreeMap<String, String>,
    /// prompt id -> description
    #[serde(default)]
    pub openended: BTreeMap<String, String>,
}

impl AvailableActions {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ..Self::default()
        }
    }

    pub fn with_predefined(mut self, id: impl Into<String>, description: impl Into<String>) -> Self {
        self.predefined.insert(id.into(), description.into());
        self
    }

    pub fn with_openended(mut self, id: impl Into<String>, description: impl Into<String>) -> Self {
        self.openended.insert(id.into(), description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predefined.is_empty() && self.openended.is_empty()
    }
}

/// An agent's move.
///
/// Two actions are equal iff both the id and the response are equal.
/// `action_id == None` is the null action returned when the agent fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Action {
    pub action_id: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
}

impl Action {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            action_id: Some(id.into()),
            response: None,
        }
    }

    pub fn with_response(id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            action_id: Some(id.into()),
            response: Some(response.into()),
        }
    }

    /// The null action.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.action_id.is_none()
    }

    pub fn id(&self) -> Option<&str> {
        self.action_id.as_deref()
    }
}

/// Renders as `id` or `id: response`, which is how actions appear in prompts.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.action_id.as_deref().unwrap_or("none");
        match &self.response {
            Some(response) => write!(f, "{id}: {response}"),
            None => f.write_str(id),
        }
    }
}
