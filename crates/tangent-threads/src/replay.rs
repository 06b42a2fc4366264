//! Idempotency for re-delivered messages.
//!
//! A caller that attaches a request id to a message gets at-most-once
//! mutation for that `(owner, text, request_id)` triple: the first delivery
//! is routed and its result remembered, later deliveries get the remembered
//! result back. Keys are evicted first-in first-out once the cache is full.

use std::collections::{HashMap, VecDeque};

use sha2::{Digest, Sha256};
use tangent_core::ids::OwnerId;

/// Stable key for one delivery of a message.
pub fn replay_key(owner_id: &OwnerId, text: &str, request_id: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [owner_id.as_str(), text, request_id] {
        hasher.update(part.len().to_le_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Bounded FIFO map from replay key to a remembered value.
#[derive(Debug)]
pub struct ReplayCache<V> {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, V>,
}

impl<V: Clone> ReplayCache<V> {
    /// Create a cache holding at most `capacity` entries. Zero disables it.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    /// Remembered value for `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).cloned()
    }

    /// Remember `value` under `key`, evicting the oldest entry when full.
    pub fn insert(&mut self, key: String, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.contains_key(&key) {
            let _ = self.entries.insert(key, value);
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                let _ = self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        let _ = self.entries.insert(key, value);
    }

    /// Number of remembered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
