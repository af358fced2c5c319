use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::chat_log::{ChatLog, ChatMessage, ChatSummary};

/// Cloneable handle to one [`ChatLog`] shared across request handlers.
///
/// Each call takes the lock once, so readers never see a half-applied
/// append or eviction. The lock is never held across an await point.
#[derive(Debug, Clone, Default)]
pub struct SharedChatLog {
    inner: Arc<Mutex<ChatLog>>,
}

impl From<ChatLog> for SharedChatLog {
    fn from(log: ChatLog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(log)),
        }
    }
}

impl SharedChatLog {
    pub fn new(capacity: usize) -> Self {
        ChatLog::new(capacity).into()
    }

    pub fn append(&self, user: impl Into<String>, assistant: impl Into<String>) -> ChatMessage {
        self.inner.lock().append(user, assistant)
    }

    pub fn append_with_duration(
        &self,
        user: impl Into<String>,
        assistant: impl Into<String>,
        duration: f64,
    ) -> ChatMessage {
        self.inner
            .lock()
            .append_with_duration(user, assistant, duration)
    }

    pub fn last(&self) -> Option<ChatMessage> {
        self.inner.lock().last()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().last_timestamp()
    }

    pub fn all(&self) -> Vec<ChatMessage> {
        self.inner.lock().all()
    }

    pub fn page(&self, limit: usize, offset: usize) -> Vec<ChatMessage> {
        self.inner.lock().page(limit, offset)
    }

    pub fn search(&self, query: &str) -> Vec<ChatMessage> {
        self.inner.lock().search(query)
    }

    pub fn delete_by_id(&self, id: u64) -> bool {
        self.inner.lock().delete_by_id(id)
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    pub fn summary(&self) -> ChatSummary {
        self.inner.lock().summary()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}
