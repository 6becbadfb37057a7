//! Session transcript storage.
//!
//! The store is the single writer for the transcript: an ordered,
//! append-only sequence of messages, seeded once from backend history at
//! startup and only appended to afterwards. Every mutation notifies the
//! presentation collaborator so the visible transcript stays in sync; that
//! notification is a side effect, not part of the data contract.

use crate::view::HudView;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message author.
    pub sender: Sender,
    /// Message text.
    pub text: String,
    /// Wall-clock time of day the message was recorded, as a display string.
    pub timestamp: String,
}

/// Ordered, append-only transcript of the session.
pub struct SessionHistoryStore {
    messages: Mutex<Vec<Message>>,
    view: Arc<dyn HudView>,
}

impl std::fmt::Debug for SessionHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHistoryStore")
            .field("len", &self.len())
            .finish()
    }
}

impl SessionHistoryStore {
    /// Create an empty store that notifies the given view on mutation.
    pub fn new(view: Arc<dyn HudView>) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            view,
        }
    }

    /// Append a message, stamping it with the current time of day.
    pub fn append(&self, sender: Sender, text: &str) {
        let message = Message {
            sender,
            text: text.to_owned(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        };
        self.guard().push(message.clone());
        self.view.show_message(&message.text);
    }

    /// Replace the whole transcript with backend-fetched history.
    ///
    /// Used only for startup hydration; never called again afterwards. The
    /// hydrated messages are replayed to the view in order.
    pub fn replace_all(&self, history: Vec<Message>) {
        let replay = {
            let mut messages = self.guard();
            *messages = history;
            messages.clone()
        };
        for message in &replay {
            self.view.show_message(&message.text);
        }
    }

    /// A point-in-time copy of the transcript, in display order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Message> {
        self.guard().clone()
    }

    /// Number of messages recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Whether the transcript is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
