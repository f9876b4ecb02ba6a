use std::sync::atomic::{AtomicU64, Ordering};

use super::transaction::TransactionId;

/// Source of identifiers for newly created transactions. Passed in by the
/// caller so imports never depend on process-wide counters.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> TransactionId;
}

/// Random `<prefix>-<uuid v4>` identifiers.
#[derive(Debug, Clone)]
pub struct UuidIdGenerator {
    prefix: String,
}

impl UuidIdGenerator {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl Default for UuidIdGenerator {
    fn default() -> Self {
        Self::new("txn")
    }
}

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> TransactionId {
        TransactionId(format!("{}-{}", self.prefix, uuid::Uuid::new_v4()))
    }
}

/// Monotonic `<prefix>-<n>` identifiers, starting at 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: &str) -> Self {
        Self::starting_at(prefix, 1)
    }

    pub fn starting_at(prefix: &str, first: u64) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: AtomicU64::new(first),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> TransactionId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        TransactionId(format!("{}-{}", self.prefix, n))
    }
}
