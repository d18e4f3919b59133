//! Core relay components
//!
//! Conversation storage and the engine that relays messages upstream.

mod memory;
mod relay;

pub use memory::MemoryStore;
pub use relay::{RelayEngine, RelayError};
