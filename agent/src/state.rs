//! Planning states.
//!
//! A state is an immutable value: the observation text the model predicted,
//! how many transitions led here, and (for the root only) the legal actions.
//! States are shared as `Rc` so cache hits hand back the very same object.

use engine_core::Action;
use std::rc::Rc;

/// Observation used when the model's `<state>` answer cannot be parsed.
pub const NO_STATE_INFO: &str = "no information about current state";

/// Prediction used when the model's `<others>` answer cannot be parsed.
pub const NO_OTHERS_INFO: &str = "no information about others' actions";

/// Single action offered when the model's `<actions>` answer cannot be parsed.
pub const FALLBACK_ACTION: &str = "do a random action";

pub type StateRef = Rc<PlanState>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanState {
    pub observation: String,
    pub depth: u32,
    /// Legal actions, known only at the root. Deeper states ask the model.
    pub actions: Option<Vec<Action>>,
}

impl PlanState {
    pub fn root(observation: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            observation: observation.into(),
            depth: 0,
            actions: Some(actions),
        }
    }

    /// State one transition below `self`.
    pub fn successor(&self, observation: impl Into<String>) -> Self {
        Self {
            observation: observation.into(),
            depth: self.depth + 1,
            actions: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.observation == NO_STATE_INFO
    }
}

/// Text between `<tag>` and `</tag>`, trimmed. None when either tag is
/// missing or nothing is inside.
pub fn extract_tag<'t>(text: &'t str, tag: &str) -> Option<&'t str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");

    let start = text.find(&open)? + open.len();
    let len = text[start..].find(&close)?;
    let inner = text[start..start + len].trim();
    (!inner.is_empty()).then_some(inner)
}
