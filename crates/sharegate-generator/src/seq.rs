use crate::Generator;
use sharegate_core::LinkId;
use std::sync::atomic::{AtomicU64, Ordering};

/// A link id generator using a sequential counter.
///
/// This generator produces sequential ids like "sg000000", "sg000001", etc.
/// Ids are predictable, so it is meant for tests and local development only.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    /// Creates a new sequential generator with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a new sequential generator starting from a specific counter value.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> LinkId {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        LinkId::new_unchecked(format!("{}{:06}", self.prefix, count))
    }
}
