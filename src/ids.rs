//! Identifier generation for cloned entities.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of globally unique identifiers for clones.
///
/// Implementations must be collision-free across the process lifetime; a
/// collision is a programming error, not a recoverable condition.
pub trait IdGenerator: Send + Sync {
    /// Produce a fresh identifier.
    fn new_id(&self) -> String;
}

/// Production generator: random UUIDv4 strings, matching the identifiers the
/// surrounding editor assigns to user-created entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator for tests and demos: `clone-1`, `clone-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Create a generator starting at `clone-1`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("clone-{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_ids_are_distinct() {
        let gen = UuidIdGenerator;
        let ids: HashSet<String> = (0..100).map(|_| gen.new_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn sequential_ids_are_predictable() {
        let gen = SequentialIdGenerator::new();
        assert_eq!(gen.new_id(), "clone-1");
        assert_eq!(gen.new_id(), "clone-2");
    }
}
