//! Chat history
//!
//! A bounded, append-only log of conversation turns kept in memory for the
//! lifetime of the process.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  ChatLog                                      │
//! │  VecDeque<ChatMessage>  (oldest first)        │
//! │  capacity: 100 (configurable)                 │
//! │  ↓ overflow → drop the single oldest turn     │
//! │  next_id: never reset, never reused           │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! [`SharedChatLog`] wraps the log in a mutex so request handlers can share it.

mod chat_log;
mod shared;

pub use chat_log::{ChatLog, ChatMessage, ChatSummary, DEFAULT_CAPACITY};
pub use shared::SharedChatLog;
