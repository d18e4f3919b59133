//! Relay engine
//!
//! Forwards a user message, together with the conversation's accumulated
//! history, to the upstream chat endpoint and records the reply.
//!
//! A conversation's turn lock is held for the whole append-send-append
//! sequence, so concurrent requests on one conversation id run one after
//! another and each sees the history left by the previous one. History reads
//! do not take the turn lock. The model travels with
//! the request; nothing about it is shared between requests.

use std::sync::Arc;

use crate::conversation::Message;
use crate::providers::{BlackboxClient, ProviderError};

use super::memory::MemoryStore;

/// Errors from the relay engine
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to communicate with Blackbox.ai")]
    Upstream(#[source] ProviderError),

    #[error("Malformed response from Blackbox.ai")]
    MalformedResponse(#[source] ProviderError),
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MalformedResponse(_) => RelayError::MalformedResponse(err),
            _ => RelayError::Upstream(err),
        }
    }
}

pub struct RelayEngine {
    client: BlackboxClient,
    memory: Arc<MemoryStore>,
}

impl RelayEngine {
    pub fn new(client: BlackboxClient, memory: Arc<MemoryStore>) -> Self {
        Self { client, memory }
    }

    /// Append `text` to the conversation, relay the full history and return
    /// the assistant reply.
    ///
    /// The conversation is created on first use. When the upstream call fails
    /// the user message stays in the history and no assistant entry is added.
    pub async fn send(
        &self,
        conversation_id: &str,
        text: &str,
        model: &str,
    ) -> Result<String, RelayError> {
        let handle = self.memory.get_or_create(conversation_id).await;
        let _turn = handle.begin_turn().await;

        handle.push(Message::user(conversation_id, text)).await;
        let messages = handle.snapshot().await;

        let result = self.client.chat(conversation_id, &messages, model).await;
        // Idle time counts from the end of the turn
        self.memory.touch(conversation_id).await;

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(
                    conversation_id,
                    model,
                    "Error communicating with Blackbox.ai: {}",
                    e
                );
                return Err(e.into());
            }
        };

        handle.push(Message::assistant(reply.clone())).await;
        tracing::debug!(
            conversation_id,
            model,
            history_len = messages.len() + 1,
            "Relayed message"
        );

        Ok(reply)
    }

    /// Snapshot of a conversation's history
    pub async fn history(&self, conversation_id: &str) -> Option<Vec<Message>> {
        self.memory.history(conversation_id).await
    }

    /// Number of live conversations
    pub async fn conversation_count(&self) -> usize {
        self.memory.len().await
    }
}
