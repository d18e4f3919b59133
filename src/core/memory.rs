//! In-memory conversation storage
//!
//! Histories live for the lifetime of the process. The store is bounded by an
//! optional conversation cap (least recently used goes first) and an optional
//! idle TTL, purged lazily whenever the map is touched.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::time::Instant;

use crate::conversation::Message;

/// One conversation's message sequence plus the lock that orders relay turns.
///
/// The turn lock is held for a whole relay call, the message list only for
/// the duration of a push or a copy, so readers never wait on the upstream.
#[derive(Default)]
pub struct Conversation {
    turn: Mutex<()>,
    messages: RwLock<Vec<Message>>,
}

impl Conversation {
    /// Wait for earlier turns on this conversation to finish
    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    pub async fn push(&self, message: Message) {
        self.messages.write().await.push(message);
    }

    pub async fn snapshot(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    /// Whether a relay turn is in progress
    fn is_busy(&self) -> bool {
        self.turn.try_lock().is_err()
    }
}

pub type ConversationHandle = Arc<Conversation>;

struct Entry {
    messages: ConversationHandle,
    last_used: Instant,
    // Monotonic use counter, orders entries for LRU eviction
    tick: u64,
}

struct Inner {
    entries: HashMap<String, Entry>,
    tick: u64,
}

/// Memory store for conversation histories
pub struct MemoryStore {
    inner: Mutex<Inner>,
    max_conversations: Option<usize>,
    ttl: Option<Duration>,
}

impl MemoryStore {
    /// Create a store with the given conversation cap and idle TTL
    pub fn new(max_conversations: Option<usize>, ttl: Option<Duration>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                tick: 0,
            }),
            max_conversations: max_conversations.filter(|max| *max > 0),
            ttl,
        }
    }

    /// Create a store with no cap and no expiry
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// Return the conversation's handle, creating an empty history if absent
    pub async fn get_or_create(&self, conversation_id: &str) -> ConversationHandle {
        let mut inner = self.inner.lock().await;
        self.purge_expired(&mut inner);

        inner.tick += 1;
        let tick = inner.tick;

        if let Some(entry) = inner.entries.get_mut(conversation_id) {
            entry.last_used = Instant::now();
            entry.tick = tick;
            return entry.messages.clone();
        }

        if let Some(max) = self.max_conversations {
            while inner.entries.len() >= max {
                let Some(oldest) = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.tick)
                    .map(|(id, _)| id.clone())
                else {
                    break;
                };
                inner.entries.remove(&oldest);
                tracing::debug!(conversation_id = %oldest, "Evicted least recently used conversation");
            }
        }

        let messages = ConversationHandle::default();
        inner.entries.insert(
            conversation_id.to_string(),
            Entry {
                messages: messages.clone(),
                last_used: Instant::now(),
                tick,
            },
        );
        tracing::debug!(conversation_id, "Created conversation");
        messages
    }

    /// Mark a conversation as used now, without creating it
    pub async fn touch(&self, conversation_id: &str) {
        let mut inner = self.inner.lock().await;
        inner.tick += 1;
        let tick = inner.tick;

        if let Some(entry) = inner.entries.get_mut(conversation_id) {
            entry.last_used = Instant::now();
            entry.tick = tick;
        }
    }

    /// Snapshot of a conversation's messages, `None` if it does not exist.
    ///
    /// Messages of a turn still in progress are included as far as they have
    /// been recorded.
    pub async fn history(&self, conversation_id: &str) -> Option<Vec<Message>> {
        let handle = {
            let mut inner = self.inner.lock().await;
            self.purge_expired(&mut inner);
            inner.entries.get(conversation_id)?.messages.clone()
        };
        Some(handle.snapshot().await)
    }

    /// Number of live conversations
    pub async fn len(&self) -> usize {
        let mut inner = self.inner.lock().await;
        self.purge_expired(&mut inner);
        inner.entries.len()
    }

    fn purge_expired(&self, inner: &mut Inner) {
        let Some(ttl) = self.ttl else {
            return;
        };
        let now = Instant::now();
        inner.entries.retain(|id, entry| {
            // Conversations in the middle of a turn are never idle
            let alive = entry.messages.is_busy() || now.duration_since(entry.last_used) < ttl;
            if !alive {
                tracing::debug!(conversation_id = %id, "Expired idle conversation");
            }
            alive
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::unbounded()
    }
}
