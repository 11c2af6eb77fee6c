//! Chat transcripts fed to a language model.

use serde::{Deserialize, Serialize};

/// Speaker of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role of the message at `index` in a transcript that starts with the user.
    pub fn at(index: usize) -> Self {
        if index % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// An ordered transcript whose roles alternate user/assistant, starting with user.
///
/// Contexts are values: extending one returns a new context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatContext {
    messages: Vec<Message>,
}

impl ChatContext {
    /// Build a context from message bodies, assigning alternating roles.
    pub fn from_turns<I, S>(turns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages = turns
            .into_iter()
            .enumerate()
            .map(|(i, content)| Message {
                role: Role::at(i),
                content: content.into(),
            })
            .collect();
        Self { messages }
    }

    /// Return a copy with one more message, taking the next role in turn.
    pub fn with_turn(&self, content: impl Into<String>) -> Self {
        let mut messages = self.messages.clone();
        messages.push(Message {
            role: self.next_role(),
            content: content.into(),
        });
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Role the next appended message will take.
    pub fn next_role(&self) -> Role {
        Role::at(self.messages.len())
    }
}
