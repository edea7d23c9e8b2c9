//! Remap table: remote factor id to clone id, for one merge call.

use std::collections::BTreeMap;

use super::factor::FactorId;

/// Mapping from a remote factor id to the id of the local clone created for
/// it during one merge invocation.
///
/// Scoped to a single merge call and discarded afterwards; never persisted.
/// Backed by a `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable(BTreeMap<FactorId, FactorId>);

impl RemapTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `remote` was cloned as `clone`.
    pub fn insert(&mut self, remote: FactorId, clone: FactorId) {
        self.0.insert(remote, clone);
    }

    /// Look up the clone id for a remote id, if one was created.
    pub fn get(&self, remote: &FactorId) -> Option<&FactorId> {
        self.0.get(remote)
    }

    /// Whether a clone exists for this remote id.
    pub fn contains(&self, remote: &FactorId) -> bool {
        self.0.contains_key(remote)
    }

    /// Number of clones recorded.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no clones were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (remote, clone) pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&FactorId, &FactorId)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_resolves_clones() {
        let mut remap = RemapTable::new();
        assert!(remap.is_empty());

        remap.insert(FactorId::from("n1"), FactorId::from("c1"));
        assert_eq!(remap.get(&FactorId::from("n1")), Some(&FactorId::from("c1")));
        assert!(remap.contains(&FactorId::from("n1")));
        assert!(!remap.contains(&FactorId::from("n2")));
        assert_eq!(remap.len(), 1);
    }
}
