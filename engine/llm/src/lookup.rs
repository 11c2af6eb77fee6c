//! Rules-lookup decorator.
//!
//! The prompt prefix tells the model it may reply with `rule(<heading>)` to
//! read a rule in full. [`RuleLookup`] answers such requests itself and
//! reissues the completion, so callers only ever see a real answer.

use engine_core::{ChatContext, Rules};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::gateway::{LanguageModel, LlmError, TokenProbs};

const RULE_OPEN: &str = "rule(";

/// Heading named by the first `rule(<heading>)` in `response`, trimmed.
pub fn requested_rule(response: &str) -> Option<&str> {
    let start = response.find(RULE_OPEN)? + RULE_OPEN.len();
    let len = response[start..].find(')')?;
    let heading = response[start..start + len].trim();
    (!heading.is_empty()).then_some(heading)
}

/// Wraps a backend, resolving rule lookups before returning a completion.
#[derive(Debug, Clone)]
pub struct RuleLookup<M> {
    inner: M,
    rules: Arc<Rules>,
    max_lookups: u32,
}

impl<M: LanguageModel> RuleLookup<M> {
    pub fn new(inner: M, rules: Arc<Rules>, max_lookups: u32) -> Self {
        Self {
            inner,
            rules,
            max_lookups,
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: LanguageModel> LanguageModel for RuleLookup<M> {
    fn complete(&self, context: &ChatContext) -> Result<String, LlmError> {
        let mut context = context.clone();
        let mut response = self.inner.complete(&context)?;

        for lookup in 0..self.max_lookups {
            let Some(heading) = requested_rule(&response) else {
                return Ok(response);
            };
            let Some(detail) = self.rules.detail(heading) else {
                debug!(heading, "Model asked for an unknown rule heading");
                return Ok(response);
            };

            debug!(heading, lookup, "Expanding rule heading");
            context = context.with_turn(response.as_str()).with_turn(detail);
            response = self.inner.complete(&context)?;
        }

        if requested_rule(&response).is_some() {
            warn!(
                max_lookups = self.max_lookups,
                "Rule lookup cap reached, returning last response"
            );
        }
        Ok(response)
    }

    fn probabilities(
        &self,
        context: &ChatContext,
        tokens: &[&str],
    ) -> Result<TokenProbs, LlmError> {
        self.inner.probabilities(context, tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Role;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned completions and records every context it receives.
    #[derive(Default)]
    struct Recorder {
        responses: RefCell<VecDeque<String>>,
        repeat: Option<String>,
        seen: RefCell<Vec<ChatContext>>,
    }

    impl Recorder {
        fn replaying(responses: &[&str]) -> Self {
            Self {
                responses: RefCell::new(responses.iter().map(|s| s.to_string()).collect()),
                ..Self::default()
            }
        }

        fn repeating(response: &str) -> Self {
            Self {
                repeat: Some(response.to_string()),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.seen.borrow().len()
        }
    }

    impl LanguageModel for Recorder {
        fn complete(&self, context: &ChatContext) -> Result<String, LlmError> {
            self.seen.borrow_mut().push(context.clone());
            let next = self.responses.borrow_mut().pop_front();
            Ok(next.or_else(|| self.repeat.clone()).unwrap_or_default())
        }

        fn probabilities(
            &self,
            _context: &ChatContext,
            tokens: &[&str],
        ) -> Result<TokenProbs, LlmError> {
            Ok(TokenProbs::uniform(tokens))
        }
    }

    fn rules() -> Arc<Rules> {
        Arc::new(
            Rules::new("Pit", "Corner the market")
                .with_detail("H1", "Heading one explained")
                .with_detail("bell", "Ringing the bell ends the round"),
        )
    }

    #[test]
    fn test_requested_rule() {
        assert_eq!(requested_rule("rule(H1)"), Some("H1"));
        assert_eq!(requested_rule("  I need rule( bell ) please"), Some("bell"));
        assert_eq!(requested_rule("rule()"), None);
        assert_eq!(requested_rule("rule(unclosed"), None);
        assert_eq!(requested_rule("<state>fine</state>"), None);
    }

    #[test]
    fn test_lookup_expands_heading_then_returns_answer() {
        let lookup = RuleLookup::new(
            Recorder::replaying(&["rule(H1)", "<state>done</state>"]),
            rules(),
            4,
        );
        let ctx = ChatContext::from_turns(["what next?"]);

        let answer = lookup.complete(&ctx).unwrap();
        assert_eq!(answer, "<state>done</state>");

        let seen = lookup.inner().seen.borrow();
        assert_eq!(seen.len(), 2);
        let last = &seen[1];
        assert_eq!(last.len(), 3);
        assert_eq!(last.messages()[1].role, Role::Assistant);
        assert_eq!(last.messages()[1].content, "rule(H1)");
        assert_eq!(last.messages()[2].role, Role::User);
        assert_eq!(last.messages()[2].content, "Heading one explained");
    }

    #[test]
    fn test_unknown_heading_is_returned_verbatim() {
        let lookup = RuleLookup::new(Recorder::replaying(&["rule(nope)"]), rules(), 4);
        let answer = lookup.complete(&ChatContext::from_turns(["q"])).unwrap();
        assert_eq!(answer, "rule(nope)");
        assert_eq!(lookup.inner().calls(), 1);
    }

    #[test]
    fn test_lookup_halts_at_cap() {
        let lookup = RuleLookup::new(Recorder::repeating("rule(bell)"), rules(), 4);
        let answer = lookup.complete(&ChatContext::from_turns(["q"])).unwrap();

        assert_eq!(answer, "rule(bell)");
        // One initial completion plus one per expansion.
        assert_eq!(lookup.inner().calls(), 5);
    }

    #[test]
    fn test_zero_cap_never_expands() {
        let lookup = RuleLookup::new(Recorder::repeating("rule(bell)"), rules(), 0);
        lookup.complete(&ChatContext::from_turns(["q"])).unwrap();
        assert_eq!(lookup.inner().calls(), 1);
    }
}
