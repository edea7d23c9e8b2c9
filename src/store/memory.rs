//! In-memory graph store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::GraphStore;
use crate::types::{Factor, FactorId, Link, LinkId};

/// Error type for the in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// A factor with this id already exists.
    #[error("Factor already exists: {0}")]
    DuplicateFactor(FactorId),
    /// A link with this id already exists.
    #[error("Link already exists: {0}")]
    DuplicateLink(LinkId),
    /// Update target does not exist.
    #[error("Factor not found: {0}")]
    FactorNotFound(FactorId),
    /// Update target does not exist.
    #[error("Link not found: {0}")]
    LinkNotFound(LinkId),
    /// A link endpoint does not resolve to a factor in this store.
    #[error("Link {link} references missing factor {endpoint}")]
    DanglingEndpoint {
        /// The offending link.
        link: LinkId,
        /// The endpoint that does not resolve.
        endpoint: FactorId,
    },
}

#[derive(Debug, Default)]
struct Inner {
    factors: BTreeMap<FactorId, Factor>,
    links: BTreeMap<LinkId, Link>,
}

impl Inner {
    fn check_endpoints(&self, link: &Link) -> Result<(), InMemoryError> {
        for endpoint in [&link.from, &link.to] {
            if !self.factors.contains_key(endpoint) {
                return Err(InMemoryError::DanglingEndpoint {
                    link: link.id.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }
        Ok(())
    }
}

/// In-memory graph store.
///
/// Uses `BTreeMap` for deterministic iteration order and enforces the
/// referential-integrity invariant on every link write.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    inner: RwLock<Inner>,
}

impl InMemoryGraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing factors and links, validating endpoints.
    pub fn from_graph(
        factors: impl IntoIterator<Item = Factor>,
        links: impl IntoIterator<Item = Link>,
    ) -> Result<Self, InMemoryError> {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for factor in factors {
                if inner.factors.contains_key(&factor.id) {
                    return Err(InMemoryError::DuplicateFactor(factor.id));
                }
                inner.factors.insert(factor.id.clone(), factor);
            }
            for link in links {
                if inner.links.contains_key(&link.id) {
                    return Err(InMemoryError::DuplicateLink(link.id));
                }
                inner.check_endpoints(&link)?;
                inner.links.insert(link.id.clone(), link);
            }
        }
        Ok(store)
    }

    /// Number of factors.
    pub fn num_factors(&self) -> usize {
        self.inner.read().factors.len()
    }

    /// Number of links.
    pub fn num_links(&self) -> usize {
        self.inner.read().links.len()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    type Error = InMemoryError;

    async fn get_factor(&self, id: &FactorId) -> Result<Option<Factor>, Self::Error> {
        Ok(self.inner.read().factors.get(id).cloned())
    }

    async fn factors(&self) -> Result<Vec<Factor>, Self::Error> {
        Ok(self.inner.read().factors.values().cloned().collect())
    }

    async fn add_factor(&self, factor: Factor) -> Result<(), Self::Error> {
        let mut inner = self.inner.write();
        if inner.factors.contains_key(&factor.id) {
            return Err(InMemoryError::DuplicateFactor(factor.id));
        }
        inner.factors.insert(factor.id.clone(), factor);
        Ok(())
    }

    async fn update_factor(&self, factor: Factor) -> Result<(), Self::Error> {
        let mut inner = self.inner.write();
        if !inner.factors.contains_key(&factor.id) {
            return Err(InMemoryError::FactorNotFound(factor.id));
        }
        inner.factors.insert(factor.id.clone(), factor);
        Ok(())
    }

    async fn get_link(&self, id: &LinkId) -> Result<Option<Link>, Self::Error> {
        Ok(self.inner.read().links.get(id).cloned())
    }

    async fn links(&self) -> Result<Vec<Link>, Self::Error> {
        Ok(self.inner.read().links.values().cloned().collect())
    }

    async fn add_link(&self, link: Link) -> Result<(), Self::Error> {
        let mut inner = self.inner.write();
        if inner.links.contains_key(&link.id) {
            return Err(InMemoryError::DuplicateLink(link.id));
        }
        inner.check_endpoints(&link)?;
        inner.links.insert(link.id.clone(), link);
        Ok(())
    }

    async fn update_link(&self, link: Link) -> Result<(), Self::Error> {
        let mut inner = self.inner.write();
        if !inner.links.contains_key(&link.id) {
            return Err(InMemoryError::LinkNotFound(link.id));
        }
        inner.check_endpoints(&link)?;
        inner.links.insert(link.id.clone(), link);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_and_get_factor() {
        let store = InMemoryGraphStore::new();
        store.add_factor(Factor::new("n1", "Cost", "g1")).await.unwrap();

        let retrieved = store.get_factor(&FactorId::from("n1")).await.unwrap();
        assert_eq!(retrieved.unwrap().label, "Cost");
        assert!(store.get_factor(&FactorId::from("n2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_factor_is_rejected() {
        let store = InMemoryGraphStore::new();
        store.add_factor(Factor::new("n1", "Cost", "g1")).await.unwrap();

        let err = store.add_factor(Factor::new("n1", "Other", "g1")).await;
        assert!(matches!(err, Err(InMemoryError::DuplicateFactor(_))));
    }

    #[tokio::test]
    async fn add_link_requires_resolvable_endpoints() {
        let store = InMemoryGraphStore::new();
        store.add_factor(Factor::new("n1", "Cost", "g1")).await.unwrap();

        let err = store.add_link(Link::new("e1", "n1", "n2")).await;
        assert!(matches!(
            err,
            Err(InMemoryError::DanglingEndpoint { .. })
        ));

        store.add_factor(Factor::new("n2", "Price", "g1")).await.unwrap();
        store.add_link(Link::new("e1", "n1", "n2")).await.unwrap();
        assert_eq!(store.num_links(), 1);
    }

    #[tokio::test]
    async fn update_replaces_existing_entity_only() {
        let store = InMemoryGraphStore::new();
        store.add_factor(Factor::new("n1", "Cost", "g1")).await.unwrap();

        store.update_factor(Factor::new("n1", "Budget", "g2")).await.unwrap();
        let updated = store.get_factor(&FactorId::from("n1")).await.unwrap().unwrap();
        assert_eq!(updated.label, "Budget");

        let err = store.update_factor(Factor::new("n9", "Ghost", "g1")).await;
        assert!(matches!(err, Err(InMemoryError::FactorNotFound(_))));
    }

    #[tokio::test]
    async fn iteration_is_ordered_by_id() {
        let store = InMemoryGraphStore::new();
        store.add_factor(Factor::new("b", "B", "g1")).await.unwrap();
        store.add_factor(Factor::new("a", "A", "g1")).await.unwrap();
        store.add_factor(Factor::new("c", "C", "g1")).await.unwrap();

        let ids: Vec<String> = store
            .factors()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
