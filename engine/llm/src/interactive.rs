//! Operator-driven backend.
//!
//! The context is printed and a human types the model's answer. An empty
//! line (or end of input) hands the call to a scripted fallback so a session
//! can be fast-forwarded.

use engine_core::{ChatContext, Role};
use std::cell::RefCell;
use std::io::{self, BufRead, Stdout, Write};
use tracing::debug;

use crate::gateway::{LanguageModel, LlmError, TokenProbs, MISSING_TOKEN_MASS};
use crate::scripted::ScriptedBackend;

pub struct InteractiveBackend<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
    fallback: ScriptedBackend,
}

impl InteractiveBackend<io::StdinLock<'static>, Stdout> {
    /// Operator on the process's stdin/stdout.
    pub fn stdio(seed: u64) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), ScriptedBackend::new(seed))
    }
}

impl<R: BufRead, W: Write> InteractiveBackend<R, W> {
    pub fn new(input: R, output: W, fallback: ScriptedBackend) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
            fallback,
        }
    }

    /// Consume the backend, returning whatever was written to the operator.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn show(&self, context: &ChatContext, question: &str) -> Result<(), LlmError> {
        let mut out = self.output.borrow_mut();
        for message in context.messages() {
            let speaker = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            writeln!(out, "[{speaker}] {}", message.content)?;
        }
        write!(out, "{question}> ")?;
        out.flush()?;
        Ok(())
    }

    /// Read one trimmed line; `None` for an empty line or end of input.
    fn read_answer(&self) -> Result<Option<String>, LlmError> {
        let mut line = String::new();
        self.input.borrow_mut().read_line(&mut line)?;
        let answer = line.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }
}

impl<R: BufRead, W: Write> LanguageModel for InteractiveBackend<R, W> {
    fn complete(&self, context: &ChatContext) -> Result<String, LlmError> {
        self.show(context, "response")?;
        match self.read_answer()? {
            Some(answer) => Ok(answer),
            None => {
                debug!("Empty operator input, using scripted completion");
                self.fallback.complete(context)
            }
        }
    }

    fn probabilities(
        &self,
        context: &ChatContext,
        tokens: &[&str],
    ) -> Result<TokenProbs, LlmError> {
        self.show(context, &format!("one of [{}]", tokens.join(", ")))?;
        let Some(answer) = self.read_answer()? else {
            debug!("Empty operator input, using scripted distribution");
            return self.fallback.probabilities(context, tokens);
        };

        let weights: Vec<f64> = tokens
            .iter()
            .map(|t| {
                if t.eq_ignore_ascii_case(&answer) {
                    1.0
                } else {
                    MISSING_TOKEN_MASS
                }
            })
            .collect();
        Ok(TokenProbs::from_weights(tokens, &weights))
    }
}
