//! Scripted backend for tests and offline runs.
//!
//! Completions come from a queue of canned responses first; once the queue is
//! empty the backend invents placeholder content carrying every tag the world
//! model parses. Distributions are random weights, normalized. Everything is
//! driven by a seeded RNG so identical seeds give identical runs.

use engine_core::ChatContext;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::gateway::{LanguageModel, LlmError, TokenProbs};

/// Seeded placeholder backend.
#[derive(Debug)]
pub struct ScriptedBackend {
    rng: RefCell<ChaCha20Rng>,
    responses: RefCell<VecDeque<String>>,
    placeholders: Cell<u32>,
}

impl ScriptedBackend {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(ChaCha20Rng::seed_from_u64(seed)),
            responses: RefCell::new(VecDeque::new()),
            placeholders: Cell::new(0),
        }
    }

    /// Builder pattern: queue canned completions, returned in order.
    pub fn with_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses
            .borrow_mut()
            .extend(responses.into_iter().map(Into::into));
        self
    }

    /// Canned completions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }

    fn placeholder(&self) -> String {
        let id = self.placeholders.get();
        self.placeholders.set(id + 1);

        let num_actions = self.rng.borrow_mut().gen_range(1..=3);
        let actions: Vec<String> = (0..num_actions)
            .map(|k| format!("placeholder action {id}.{k}"))
            .collect();

        format!(
            "<state>placeholder state {id}</state>\n<actions>\n{}\n</actions>\n<others>placeholder others {id}</others>",
            actions.join("\n")
        )
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new(0)
    }
}

impl LanguageModel for ScriptedBackend {
    fn complete(&self, _context: &ChatContext) -> Result<String, LlmError> {
        let canned = self.responses.borrow_mut().pop_front();
        Ok(canned.unwrap_or_else(|| self.placeholder()))
    }

    fn probabilities(
        &self,
        _context: &ChatContext,
        tokens: &[&str],
    ) -> Result<TokenProbs, LlmError> {
        let mut rng = self.rng.borrow_mut();
        let weights: Vec<f64> = tokens.iter().map(|_| rng.gen_range(0.0..1.0)).collect();
        Ok(TokenProbs::from_weights(tokens, &weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ChatContext {
        ChatContext::from_turns(["hello"])
    }

    #[test]
    fn test_canned_responses_come_first() {
        let backend = ScriptedBackend::new(1).with_responses(["first", "second"]);
        assert_eq!(backend.remaining(), 2);

        assert_eq!(backend.complete(&ctx()).unwrap(), "first");
        assert_eq!(backend.complete(&ctx()).unwrap(), "second");
        assert_eq!(backend.remaining(), 0);

        let placeholder = backend.complete(&ctx()).unwrap();
        assert!(placeholder.contains("<state>"));
        assert!(placeholder.contains("</actions>"));
        assert!(placeholder.contains("<others>"));
    }

    #[test]
    fn test_probabilities_normalized() {
        let backend = ScriptedBackend::new(7);
        let probs = backend.probabilities(&ctx(), &["0", "1", "2"]).unwrap();

        assert_eq!(probs.len(), 3);
        let total: f64 = probs.values().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_outputs() {
        let a = ScriptedBackend::new(99);
        let b = ScriptedBackend::new(99);

        for _ in 0..5 {
            assert_eq!(a.complete(&ctx()).unwrap(), b.complete(&ctx()).unwrap());
            assert_eq!(
                a.probabilities(&ctx(), &["yes", "no"]).unwrap(),
                b.probabilities(&ctx(), &["yes", "no"]).unwrap()
            );
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = ScriptedBackend::new(1);
        let b = ScriptedBackend::new(2);

        let differs = (0..10).any(|_| {
            a.probabilities(&ctx(), &["yes", "no"]).unwrap()
                != b.probabilities(&ctx(), &["yes", "no"]).unwrap()
        });
        assert!(differs, "different seeds should produce different distributions");
    }
}
