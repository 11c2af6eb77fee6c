//! Prompt templates and the composer that renders them.
//!
//! Templates are loaded once from TOML. A [`PromptComposer`] binds them to
//! the current game's [`Rules`] and turns `(template, slots)` into a
//! [`ChatContext`].

use engine_core::{ChatContext, Rules};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// The embedded default templates (loaded at compile time)
const DEFAULT_PROMPTS_TOML: &str = include_str!("../prompts.defaults.toml");

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read prompt templates from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid prompt templates: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The templates the planner renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    Actions,
    State,
    Others,
    Goal,
    ActionSelect,
    SelfEval,
    Openended,
}

impl Template {
    /// Key of this template in the TOML document.
    pub fn name(self) -> &'static str {
        match self {
            Template::Actions => "actions",
            Template::State => "state",
            Template::Others => "others",
            Template::Goal => "goal",
            Template::ActionSelect => "action_select",
            Template::SelfEval => "self_eval",
            Template::Openended => "openended",
        }
    }
}

/// Prompt template set. Every key is mandatory; a missing one fails at load.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplates {
    /// Alternating user/assistant messages prepended to every context.
    pub prefix: Vec<String>,
    /// Fragment describing expandable rule headings; rendered with `{topics}`.
    pub additional_topics: String,
    pub actions: Vec<String>,
    pub state: Vec<String>,
    pub others: Vec<String>,
    pub goal: Vec<String>,
    pub action_select: Vec<String>,
    pub self_eval: Vec<String>,
    pub openended: Vec<String>,
}

impl PromptTemplates {
    /// The templates shipped with the crate.
    pub fn builtin() -> Result<Self, PromptError> {
        Self::from_toml_str(DEFAULT_PROMPTS_TOML)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PromptError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, PromptError> {
        let content = std::fs::read_to_string(path).map_err(|source| PromptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when given, otherwise use the built-in set.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, PromptError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn messages(&self, template: Template) -> &[String] {
        match template {
            Template::Actions => &self.actions,
            Template::State => &self.state,
            Template::Others => &self.others,
            Template::Goal => &self.goal,
            Template::ActionSelect => &self.action_select,
            Template::SelfEval => &self.self_eval,
            Template::Openended => &self.openended,
        }
    }
}

/// Templates bound to one game's rules.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    templates: Arc<PromptTemplates>,
    rules: Arc<Rules>,
}

impl PromptComposer {
    pub fn new(templates: Arc<PromptTemplates>, rules: Arc<Rules>) -> Self {
        Self { templates, rules }
    }

    pub fn rules(&self) -> &Arc<Rules> {
        &self.rules
    }

    /// Comma-separated rule headings, or `none`.
    pub fn topics(&self) -> String {
        let headings: Vec<&str> = self.rules.headings().collect();
        if headings.is_empty() {
            "none".to_string()
        } else {
            headings.join(", ")
        }
    }

    /// Render `template` into a context: prefix messages, then the template's
    /// own, with roles alternating from user.
    ///
    /// `slots` take precedence over the rule-derived slots (`title`,
    /// `summary`, `topics`, `additional_topics`).
    pub fn compose(&self, template: Template, slots: &[(&str, &str)]) -> ChatContext {
        let topics = self.topics();
        let additional_topics = fill(&self.templates.additional_topics, &[("topics", &topics)]);
        let common: [(&str, &str); 4] = [
            ("title", &self.rules.title),
            ("summary", &self.rules.summary),
            ("topics", &topics),
            ("additional_topics", &additional_topics),
        ];
        let all: Vec<(&str, &str)> = slots.iter().chain(common.iter()).copied().collect();

        ChatContext::from_turns(
            self.templates
                .prefix
                .iter()
                .chain(self.templates.messages(template))
                .map(|message| fill(message, &all)),
        )
    }
}

/// Substitute `{name}` markers in one pass. Unknown markers stay as written,
/// and substituted values are never rescanned.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let slot = after.find('}').and_then(|close| {
            let name = &after[..close];
            slots
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match slot {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
