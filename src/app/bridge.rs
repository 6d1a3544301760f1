//! Decoupled delivery of text into the chat input
//!
//! The popup and the practice-question list need to put text into the chat
//! input without holding a reference to it. The input registers itself here
//! and receives edits over a channel. There is one slot: a later
//! registration silently replaces an earlier one.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// An edit for the chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEdit {
    /// New input text
    pub text: String,
    /// Keep the active message type (preset prefix) when applying
    pub preserve_message_type: bool,
}

/// Proof of registration, needed to unregister
#[derive(Debug, PartialEq, Eq)]
pub struct Registration(u64);

/// Single-slot registry for the chat input's edit channel
#[derive(Debug, Default)]
pub struct ChatInputBridge {
    slot: Option<(u64, UnboundedSender<InputEdit>)>,
    next_id: u64,
}

impl ChatInputBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer, replacing any previous one
    pub fn register(&mut self) -> (Registration, UnboundedReceiver<InputEdit>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.next_id += 1;
        if self.slot.is_some() {
            tracing::debug!("Replacing chat input registration");
        }
        self.slot = Some((self.next_id, tx));
        (Registration(self.next_id), rx)
    }

    /// Remove a registration. Stale registrations are ignored.
    pub fn unregister(&mut self, registration: &Registration) {
        if self.slot.as_ref().is_some_and(|(id, _)| *id == registration.0) {
            self.slot = None;
        }
    }

    pub fn is_registered(&self) -> bool {
        self.slot.as_ref().is_some_and(|(_, tx)| !tx.is_closed())
    }

    /// Send text to the registered input.
    ///
    /// Returns false when nothing is registered; the text is dropped.
    pub fn insert(&self, text: impl Into<String>, preserve_message_type: bool) -> bool {
        let Some((_, tx)) = &self.slot else {
            tracing::debug!("No chat input registered, dropping insert");
            return false;
        };

        let edit = InputEdit { text: text.into(), preserve_message_type };
        match tx.send(edit) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Chat input went away, dropping insert");
                false
            }
        }
    }
}
