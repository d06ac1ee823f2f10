//! Bookkeeping message store.
//!
//! Stages leave short notes ("Parsed paper_1.pdf") under a thread id as a run
//! progresses. The store is write-mostly: the pipeline never reads it to make
//! a decision. It exists so an embedder can inspect what happened in a run.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::{ThreadId, Timestamp};

/// One note in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMessage {
    pub sender: String,
    pub content: String,
    pub stored_at: Timestamp,
}

/// Thread-keyed message store.
pub trait MessageStore: Send + Sync {
    fn store_message(&self, thread: &ThreadId, sender: &str, content: &str);

    /// Every message of `thread`, oldest first.
    fn messages(&self, thread: &ThreadId) -> Vec<StoredMessage>;

    /// One line per message as `sender: content`.
    fn thread_summary(&self, thread: &ThreadId) -> String {
        self.messages(thread)
            .iter()
            .map(|m| format!("{}: {}", m.sender, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Process-local [`MessageStore`]; contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    threads: Mutex<HashMap<ThreadId, Vec<StoredMessage>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageStore for InMemoryMessageStore {
    fn store_message(&self, thread: &ThreadId, sender: &str, content: &str) {
        let message = StoredMessage {
            sender: sender.to_string(),
            content: content.to_string(),
            stored_at: Timestamp::now(),
        };
        let mut threads = match self.threads.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        threads.entry(thread.clone()).or_default().push(message);
    }

    fn messages(&self, thread: &ThreadId) -> Vec<StoredMessage> {
        let threads = match self.threads.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        threads.get(thread).cloned().unwrap_or_default()
    }
}
