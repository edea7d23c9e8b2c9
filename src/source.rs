//! Remote graph source.
//!
//! The second map of a reconciliation pass arrives as a [`RemoteSnapshot`]:
//! the full node and edge sets of the remote map, taken once, treated as
//! immutable input. A [`RemoteGraphSource`] produces that snapshot after its
//! transport layer has reached a synchronized state; the kernel waits on
//! [`RemoteGraphSource::ready`] and never retries on its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Factor, FactorId, Link, LinkId};

/// A malformed remote snapshot: a link references an endpoint that is not in
/// the snapshot's own factor set.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Remote link {link} references missing factor {endpoint}")]
pub struct DanglingReference {
    /// The offending link.
    pub link: LinkId,
    /// The endpoint absent from the snapshot.
    pub endpoint: FactorId,
}

/// Full contents of the remote map at one point in time.
///
/// Must be causally complete: every link endpoint resolves within
/// `factors`. [`RemoteSnapshot::validate`] checks this and both `merge` and
/// `diff` run it before touching anything, so a malformed snapshot never
/// leaves partial effects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    /// All factors in the remote map.
    #[serde(default)]
    pub factors: Vec<Factor>,
    /// All links in the remote map.
    #[serde(default)]
    pub links: Vec<Link>,
}

impl RemoteSnapshot {
    /// Build a snapshot from factor and link collections.
    pub fn new(
        factors: impl IntoIterator<Item = Factor>,
        links: impl IntoIterator<Item = Link>,
    ) -> Self {
        Self {
            factors: factors.into_iter().collect(),
            links: links.into_iter().collect(),
        }
    }

    /// Check internal consistency: every link endpoint resolves within this
    /// snapshot's factor set. Fails fast on the first dangling reference.
    pub fn validate(&self) -> Result<(), DanglingReference> {
        let ids: std::collections::BTreeSet<&FactorId> =
            self.factors.iter().map(|f| &f.id).collect();
        for link in &self.links {
            for endpoint in [&link.from, &link.to] {
                if !ids.contains(endpoint) {
                    return Err(DanglingReference {
                        link: link.id.clone(),
                        endpoint: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Lookup table from factor id to label, for link name resolution.
    pub fn factor_labels(&self) -> BTreeMap<&FactorId, &str> {
        self.factors
            .iter()
            .map(|f| (&f.id, f.label.as_str()))
            .collect()
    }
}

/// Supplier of remote map snapshots.
///
/// Passed explicitly into each reconciliation call; there is no shared
/// module-level session. Implementations own their transport (for the
/// collaborative editor this is the shared-document layer) and signal
/// readiness once a causally-complete snapshot can be taken.
#[async_trait]
pub trait RemoteGraphSource: Send + Sync {
    /// Error type for source operations.
    type Error: std::error::Error + Send + Sync;

    /// Resolve once the source holds a causally-complete snapshot.
    async fn ready(&self) -> Result<(), Self::Error>;

    /// Take the full current snapshot of the remote map.
    async fn snapshot(&self) -> Result<RemoteSnapshot, Self::Error>;
}

/// Error type for [`StaticRemoteSource`]. The source itself cannot fail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StaticSourceError {}

/// A source wrapping a prebuilt snapshot; always ready.
///
/// Used in tests and demos, and as the adapter for callers that already hold
/// both maps in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticRemoteSource {
    snapshot: RemoteSnapshot,
}

impl StaticRemoteSource {
    /// Wrap a snapshot.
    pub fn new(snapshot: RemoteSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl RemoteGraphSource for StaticRemoteSource {
    type Error = StaticSourceError;

    async fn ready(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn snapshot(&self) -> Result<RemoteSnapshot, Self::Error> {
        Ok(self.snapshot.clone())
    }
}
