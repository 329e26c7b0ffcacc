//! Short-term conversational memory.
//!
//! A bounded log of the most recent `(user, message)` pairs, oldest
//! evicted first. Lives only in process memory.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub user: String,
    pub message: String,
}

impl MemoryEntry {
    pub fn as_pair(&self) -> (String, String) {
        (self.user.clone(), self.message.clone())
    }
}

/// Cloning shares the underlying log.
#[derive(Debug, Clone)]
pub struct ShortTermMemory {
    inner: Arc<Mutex<VecDeque<MemoryEntry>>>,
    max_length: usize,
}

impl ShortTermMemory {
    pub fn new(max_length: usize) -> Self {
        let max_length = max_length.max(1);
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(max_length))),
            max_length,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn add(&self, user: impl Into<String>, message: impl Into<String>) {
        // a panicked writer cannot leave the deque half-updated
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.push_back(MemoryEntry {
            user: user.into(),
            message: message.into(),
        });
        while guard.len() > self.max_length {
            guard.pop_front();
        }
    }

    /// Entries oldest to newest.
    pub fn get_history(&self) -> Vec<MemoryEntry> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ShortTermMemory {
    fn default() -> Self {
        Self::new(crate::core::config::defaults::MEMORY_MAX_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let memory = ShortTermMemory::new(10);
        for i in 1..=11 {
            memory.add(format!("user{}", i), format!("message {}", i));
        }

        let history = memory.get_history();
        assert_eq!(history.len(), 10);
        assert_eq!(history.first().unwrap().message, "message 2");
        assert_eq!(history.last().unwrap().message, "message 11");
        let users: Vec<String> = history.iter().map(|e| e.user.clone()).collect();
        let expected: Vec<String> = (2..=11).map(|i| format!("user{}", i)).collect();
        assert_eq!(users, expected);
    }

    #[test]
    fn history_is_oldest_to_newest_below_capacity() {
        let memory = ShortTermMemory::new(3);
        memory.add("alice", "first");
        memory.add("bob", "second");

        assert_eq!(
            memory.get_history(),
            vec![
                MemoryEntry {
                    user: "alice".to_string(),
                    message: "first".to_string()
                },
                MemoryEntry {
                    user: "bob".to_string(),
                    message: "second".to_string()
                },
            ]
        );
    }

    #[test]
    fn default_capacity_is_ten() {
        let memory = ShortTermMemory::default();
        assert_eq!(memory.max_length(), 10);
        assert!(memory.is_empty());
    }

    #[test]
    fn clones_share_the_same_log() {
        let memory = ShortTermMemory::new(5);
        let handle = memory.clone();
        handle.add("u", "m");
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn concurrent_writers_never_exceed_capacity() {
        let memory = ShortTermMemory::new(10);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let memory = memory.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        memory.add(format!("t{}", t), format!("{}", i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(memory.len(), 10);
    }
}
