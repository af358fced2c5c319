//! Bounded chat log with FIFO eviction

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default maximum number of turns retained
pub const DEFAULT_CAPACITY: usize = 100;

/// One recorded turn. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    /// Empty when no reply could be produced
    pub assistant: String,
    /// Seconds spent producing the reply, 0 when unknown
    pub duration: f64,
}

impl ChatMessage {
    fn matches(&self, needle: &str) -> bool {
        self.user.to_lowercase().contains(needle) || self.assistant.to_lowercase().contains(needle)
    }
}

/// Aggregate view of the retained turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChatSummary {
    pub total: usize,
    /// Mean reply length in characters, truncated
    pub avg_response_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<DateTime<Utc>>,
}

/// Append-only log of turns, oldest first.
///
/// Once `capacity` is exceeded the single oldest turn is dropped. Ids come
/// from a counter that survives [`ChatLog::delete_by_id`] and
/// [`ChatLog::clear`], so an id is never handed out twice.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
    next_id: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChatLog {
    /// Create an empty log. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        tracing::info!(capacity, "Chat history initialized");
        Self {
            messages: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
            next_id: 0,
            last_timestamp: None,
        }
    }

    /// Record a turn and return a copy of it.
    pub fn append(&mut self, user: impl Into<String>, assistant: impl Into<String>) -> ChatMessage {
        self.append_with_duration(user, assistant, 0.0)
    }

    /// Record a turn with a producer-measured duration in seconds.
    ///
    /// Negative or NaN durations are stored as zero.
    pub fn append_with_duration(
        &mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
        duration: f64,
    ) -> ChatMessage {
        self.next_id += 1;

        let message = ChatMessage {
            id: self.next_id,
            timestamp: self.stamp(),
            user: user.into(),
            assistant: assistant.into(),
            duration: if duration.is_nan() { 0.0 } else { duration.max(0.0) },
        };

        self.messages.push_back(message.clone());

        if self.messages.len() > self.capacity {
            if let Some(evicted) = self.messages.pop_front() {
                tracing::debug!(id = evicted.id, "Evicted oldest chat message");
            }
        }

        tracing::info!(total = self.messages.len(), "Message added");
        message
    }

    /// Wall clock, held back so timestamps never go backwards
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_timestamp {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        self.last_timestamp = Some(stamp);
        stamp
    }

    pub fn last(&self) -> Option<ChatMessage> {
        self.messages.back().cloned()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.back().map(|message| message.timestamp)
    }

    /// All retained turns, oldest to newest
    pub fn all(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    /// Up to `limit` turns starting at index `offset`.
    pub fn page(&self, limit: usize, offset: usize) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over both sides of each turn.
    ///
    /// An empty query matches every turn.
    pub fn search(&self, query: &str) -> Vec<ChatMessage> {
        let needle = query.to_lowercase();
        let results: Vec<ChatMessage> = self
            .messages
            .iter()
            .filter(|message| message.matches(&needle))
            .cloned()
            .collect();

        tracing::info!(count = results.len(), query, "Searched chat history");
        results
    }

    pub fn delete_by_id(&mut self, id: u64) -> bool {
        match self.messages.iter().position(|message| message.id == id) {
            Some(index) => {
                self.messages.remove(index);
                tracing::info!(id, "Message deleted");
                true
            }
            None => false,
        }
    }

    /// Drop every turn. The id counter keeps counting.
    pub fn clear(&mut self) {
        let count = self.messages.len();
        self.messages.clear();
        tracing::info!(count, "Chat history cleared");
    }

    pub fn summary(&self) -> ChatSummary {
        let total = self.messages.len();
        if total == 0 {
            return ChatSummary::default();
        }

        let reply_chars: usize = self
            .messages
            .iter()
            .map(|message| message.assistant.chars().count())
            .sum();

        ChatSummary {
            total,
            avg_response_length: reply_chars / total,
            first_timestamp: self.messages.front().map(|message| message.timestamp),
            last_timestamp: self.last_timestamp(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.messages.len() >= self.capacity
    }
}
