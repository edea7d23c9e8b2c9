//! Read-only diff of a remote map against the local map.
//!
//! Structurally parallel to the merge pipeline but performs no mutation:
//! the same classifier runs over the same snapshot, and every finding
//! becomes a [`DiffEntry`] instead of a graph change. Factors are checked in
//! both directions; links only remote-to-local, mirroring the merge path.
//! That asymmetry is deliberate and pinned by tests.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::{classify_factor, classify_link, Classification};
use crate::merge::{link_name, Reconciler};
use crate::source::{DanglingReference, RemoteGraphSource, RemoteSnapshot};
use crate::store::GraphStore;
use crate::types::{FactorId, LinkId};

/// Log category for diff events.
pub const DIFF_CATEGORY: &str = "Diff";

/// Error type for diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The remote snapshot is internally inconsistent.
    #[error(transparent)]
    DanglingReference(#[from] DanglingReference),
    /// Local graph store error.
    #[error("Store error: {0}")]
    Store(String),
    /// Remote graph source error.
    #[error("Source error: {0}")]
    Source(String),
}

impl DiffError {
    /// Create a store error from any error type.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::Store(e.to_string())
    }

    /// Create a source error from any error type.
    pub fn from_source<E: std::error::Error>(e: E) -> Self {
        Self::Source(e.to_string())
    }
}

/// One discrepancy between the two maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffEntry {
    /// Same factor id, different labels.
    FactorLabelConflict {
        /// Shared identifier.
        id: FactorId,
        /// Label in the local map.
        local_label: String,
        /// Label in the remote map.
        remote_label: String,
    },
    /// Same factor id and label, different style classes.
    FactorStyleConflict {
        /// Shared identifier.
        id: FactorId,
        /// The factor's label.
        label: String,
        /// Style class in the local map.
        local_grp: String,
        /// Style class in the remote map.
        remote_grp: String,
    },
    /// Remote factor with no local counterpart.
    FactorMissingLocally {
        /// Remote identifier.
        id: FactorId,
        /// The factor's label.
        label: String,
    },
    /// Local factor with no remote counterpart (reverse scan, factors only).
    FactorMissingRemotely {
        /// Local identifier.
        id: FactorId,
        /// The factor's label.
        label: String,
    },
    /// Same link id, different labels.
    LinkLabelConflict {
        /// Shared identifier.
        id: LinkId,
        /// Label in the local map (empty if unlabeled).
        local_label: String,
        /// Label in the remote map (empty if unlabeled).
        remote_label: String,
    },
    /// Same link id and label, different style classes.
    LinkStyleConflict {
        /// Shared identifier.
        id: LinkId,
        /// Display name of the link.
        name: String,
        /// Style class in the local map.
        local_grp: String,
        /// Style class in the remote map.
        remote_grp: String,
    },
    /// Remote link with no local counterpart.
    LinkMissingLocally {
        /// Remote identifier.
        id: LinkId,
        /// Display name of the link.
        name: String,
    },
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FactorLabelConflict {
                local_label,
                remote_label,
                ..
            } => write!(
                f,
                "Existing Factor label: {local_label} does not match new label: \
                 {remote_label}."
            ),
            Self::FactorStyleConflict {
                label,
                local_grp,
                remote_grp,
                ..
            } => write!(
                f,
                "Existing style: {local_grp} does not match new style: {remote_grp} \
                 for Factor: {label}."
            ),
            Self::FactorMissingLocally { label, .. } => {
                write!(f, "New Factor: {label} not in existing map")
            }
            Self::FactorMissingRemotely { label, .. } => {
                write!(f, "Existing factor: {label} not in other map")
            }
            Self::LinkLabelConflict {
                local_label,
                remote_label,
                ..
            } => write!(
                f,
                "Existing Link label: {local_label} does not match new label: \
                 {remote_label}."
            ),
            Self::LinkStyleConflict {
                name,
                local_grp,
                remote_grp,
                ..
            } => write!(
                f,
                "Existing Link style: '{local_grp}' does not match new style: '{remote_grp}' \
                 for link '{name}'."
            ),
            Self::LinkMissingLocally { name, .. } => {
                write!(f, "Existing map does not include Link: '{name}'")
            }
        }
    }
}

/// All discrepancies found by one diff call, in scan order: remote factors,
/// reverse factor scan, remote links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// The discrepancies, in the order they were found.
    pub entries: Vec<DiffEntry>,
}

impl DiffReport {
    /// Whether the two maps agree everywhere this diff looks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of discrepancies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter()
    }
}

impl<S: GraphStore> Reconciler<S> {
    /// Diff the remote snapshot against the local graph.
    ///
    /// Strictly read-only: classification and reporting only, no graph
    /// mutation, no clone or bridge creation. Each entry is also emitted to
    /// the event log under the `Diff` category.
    pub async fn diff(&self, snapshot: &RemoteSnapshot) -> Result<DiffReport, DiffError> {
        snapshot.validate()?;

        let mut report = DiffReport::default();
        let remote_labels = snapshot.factor_labels();

        // Remote factors against the local map.
        for remote in &snapshot.factors {
            let local = self
                .store()
                .get_factor(&remote.id)
                .await
                .map_err(DiffError::from_store)?;

            let entry = match (classify_factor(local.as_ref(), remote), local.as_ref()) {
                (Classification::Absent, _) => Some(DiffEntry::FactorMissingLocally {
                    id: remote.id.clone(),
                    label: remote.label.clone(),
                }),
                (Classification::LabelConflict, Some(local)) => {
                    Some(DiffEntry::FactorLabelConflict {
                        id: remote.id.clone(),
                        local_label: local.label.clone(),
                        remote_label: remote.label.clone(),
                    })
                }
                (Classification::StyleConflict, Some(local)) => {
                    Some(DiffEntry::FactorStyleConflict {
                        id: remote.id.clone(),
                        label: local.label.clone(),
                        local_grp: local.grp.clone(),
                        remote_grp: remote.grp.clone(),
                    })
                }
                _ => None,
            };
            if let Some(entry) = entry {
                self.push(&mut report, entry);
            }
        }

        // Reverse scan: local factors absent from the remote set. Links are
        // deliberately not scanned in this direction.
        let remote_ids: std::collections::BTreeSet<&FactorId> = remote_labels.keys().copied().collect();
        for local in self.store().factors().await.map_err(DiffError::from_store)? {
            if !remote_ids.contains(&local.id) {
                let entry = DiffEntry::FactorMissingRemotely {
                    id: local.id.clone(),
                    label: local.label.clone(),
                };
                self.push(&mut report, entry);
            }
        }

        // Remote links against the local map.
        for remote in &snapshot.links {
            let local = self
                .store()
                .get_link(&remote.id)
                .await
                .map_err(DiffError::from_store)?;

            let entry = match (classify_link(local.as_ref(), remote), local.as_ref()) {
                (Classification::Absent, _) => Some(DiffEntry::LinkMissingLocally {
                    id: remote.id.clone(),
                    name: link_name(remote, &remote_labels),
                }),
                (Classification::LabelConflict, Some(local)) => {
                    Some(DiffEntry::LinkLabelConflict {
                        id: remote.id.clone(),
                        local_label: local.label_or_empty().to_string(),
                        remote_label: remote.label_or_empty().to_string(),
                    })
                }
                (Classification::StyleConflict, Some(local)) => {
                    Some(DiffEntry::LinkStyleConflict {
                        id: remote.id.clone(),
                        name: link_name(remote, &remote_labels),
                        local_grp: local.grp.clone(),
                        remote_grp: remote.grp.clone(),
                    })
                }
                _ => None,
            };
            if let Some(entry) = entry {
                self.push(&mut report, entry);
            }
        }

        Ok(report)
    }

    /// Wait for the source to reach a synchronized state, take one snapshot
    /// and diff it.
    pub async fn diff_from_source<R: RemoteGraphSource>(
        &self,
        source: &R,
    ) -> Result<DiffReport, DiffError> {
        source.ready().await.map_err(DiffError::from_source)?;
        let snapshot = source.snapshot().await.map_err(DiffError::from_source)?;
        self.diff(&snapshot).await
    }

    fn push(&self, report: &mut DiffReport, entry: DiffEntry) {
        self.sink().log(&entry.to_string(), DIFF_CATEGORY);
        report.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdGenerator;
    use crate::log::CapturingEventLog;
    use crate::store::InMemoryGraphStore;
    use crate::types::{Factor, Link};
    use std::sync::Arc;

    fn reconciler(
        store: InMemoryGraphStore,
    ) -> (Reconciler<InMemoryGraphStore>, Arc<CapturingEventLog>) {
        let log = Arc::new(CapturingEventLog::new());
        let engine = Reconciler::new(
            Arc::new(store),
            Arc::new(SequentialIdGenerator::new()),
            log.clone(),
        );
        (engine, log)
    }

    #[tokio::test]
    async fn identical_maps_produce_empty_report() {
        let store = InMemoryGraphStore::from_graph(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g1"),
            ],
            [Link::new("e1", "n1", "n2")],
        )
        .unwrap();
        let (engine, log) = reconciler(store);
        let snapshot = RemoteSnapshot::new(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g1"),
            ],
            [Link::new("e1", "n1", "n2")],
        );

        let report = engine.diff(&snapshot).await.unwrap();
        assert!(report.is_empty());
        assert!(log.messages().is_empty());
    }

    #[tokio::test]
    async fn diff_never_mutates_the_store() {
        let store =
            InMemoryGraphStore::from_graph([Factor::new("n1", "Cost", "g1")], []).unwrap();
        let (engine, _log) = reconciler(store);
        let snapshot = RemoteSnapshot::new(
            [
                Factor::new("n1", "Price", "g1"),
                Factor::new("n3", "Delay", "g2"),
            ],
            [Link::new("e1", "n1", "n3")],
        );

        let report = engine.diff(&snapshot).await.unwrap();
        assert_eq!(report.len(), 3);
        assert_eq!(engine.store().num_factors(), 1);
        assert_eq!(engine.store().num_links(), 0);
    }

    #[tokio::test]
    async fn reverse_scan_reports_factors_missing_remotely() {
        let store = InMemoryGraphStore::from_graph(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g1"),
            ],
            [],
        )
        .unwrap();
        let (engine, log) = reconciler(store);
        let snapshot = RemoteSnapshot::new([Factor::new("n1", "Cost", "g1")], []);

        let report = engine.diff(&snapshot).await.unwrap();
        assert_eq!(
            report.entries,
            vec![DiffEntry::FactorMissingRemotely {
                id: "n2".into(),
                label: "Quality".to_string(),
            }]
        );
        assert_eq!(
            log.messages(),
            vec!["Existing factor: Quality not in other map"]
        );
        assert_eq!(log.entries()[0].category, DIFF_CATEGORY);
    }

    #[tokio::test]
    async fn reverse_scan_is_nodes_only() {
        // A local link absent from the remote map is not reported; only the
        // factor scan is bidirectional.
        let store = InMemoryGraphStore::from_graph(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g1"),
            ],
            [Link::new("e1", "n1", "n2")],
        )
        .unwrap();
        let (engine, _log) = reconciler(store);
        let snapshot = RemoteSnapshot::new(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g1"),
            ],
            [],
        );

        let report = engine.diff(&snapshot).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn missing_link_uses_fallback_name() {
        let store = InMemoryGraphStore::from_graph(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g1"),
            ],
            [],
        )
        .unwrap();
        let (engine, log) = reconciler(store);
        let snapshot = RemoteSnapshot::new(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g1"),
            ],
            [Link::new("e1", "n1", "n2")],
        );

        let report = engine.diff(&snapshot).await.unwrap();
        assert_eq!(
            report.entries,
            vec![DiffEntry::LinkMissingLocally {
                id: "e1".into(),
                name: "from Cost to Quality".to_string(),
            }]
        );
        assert_eq!(
            log.messages(),
            vec!["Existing map does not include Link: 'from Cost to Quality'"]
        );
    }

    #[tokio::test]
    async fn factor_conflict_wording_is_unquoted() {
        let store = InMemoryGraphStore::from_graph(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g3"),
            ],
            [],
        )
        .unwrap();
        let (engine, log) = reconciler(store);
        let snapshot = RemoteSnapshot::new(
            [
                Factor::new("n1", "Price", "g1"),
                Factor::new("n2", "Quality", "g4"),
            ],
            [],
        );

        let report = engine.diff(&snapshot).await.unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(
            log.messages(),
            vec![
                "Existing Factor label: Cost does not match new label: Price.",
                "Existing style: g3 does not match new style: g4 for Factor: Quality.",
            ]
        );
    }

    #[tokio::test]
    async fn link_style_conflict_reports_without_mutation() {
        let store = InMemoryGraphStore::from_graph(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g1"),
            ],
            [Link::new("e1", "n1", "n2").labeled("causes").grouped("edge0")],
        )
        .unwrap();
        let (engine, log) = reconciler(store);
        let snapshot = RemoteSnapshot::new(
            [
                Factor::new("n1", "Cost", "g1"),
                Factor::new("n2", "Quality", "g1"),
                Factor::new("n3", "Delay", "g2"),
            ],
            [Link::new("e1", "n1", "n2").labeled("causes").grouped("edge1")],
        );

        let report = engine.diff(&snapshot).await.unwrap();
        assert_eq!(
            report.entries,
            vec![
                DiffEntry::FactorMissingLocally {
                    id: "n3".into(),
                    label: "Delay".to_string(),
                },
                DiffEntry::LinkStyleConflict {
                    id: "e1".into(),
                    name: "causes".to_string(),
                    local_grp: "edge0".to_string(),
                    remote_grp: "edge1".to_string(),
                },
            ]
        );
        assert_eq!(
            log.messages(),
            vec![
                "New Factor: Delay not in existing map",
                "Existing Link style: 'edge0' does not match new style: 'edge1' for link \
                 'causes'.",
            ]
        );

        // Read-only: the local link keeps its style class.
        let local = engine
            .store()
            .get_link(&LinkId::from("e1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(local.grp, "edge0");
        assert_eq!(engine.store().num_links(), 1);
    }

    #[tokio::test]
    async fn dangling_snapshot_fails_fast() {
        let (engine, _log) = reconciler(InMemoryGraphStore::new());
        let snapshot = RemoteSnapshot::new(
            [Factor::new("n1", "Cost", "g1")],
            [Link::new("e1", "n1", "ghost")],
        );

        let err = engine.diff(&snapshot).await.unwrap_err();
        assert!(matches!(err, DiffError::DanglingReference(_)));
    }
}
