//! Additive merge of a remote map into the local map.
//!
//! The merge is conflict-aware but never destructive: pre-existing local
//! entities are never mutated or deleted. Where the remote map disagrees
//! with the local one, the remote version is added as a visually flagged
//! clone ("prefer local, clone-and-flag on mismatch").
//!
//! ## Pipeline
//!
//! ```text
//! RemoteSnapshot → validate → reconcile_factors → RemapTable
//!                                                     ↓
//!                                            reconcile_links → GraphStore
//! ```
//!
//! The factor pass builds the remap table (remote id → clone id); the link
//! pass consumes it to rewrite endpoints so no link is ever left pointing
//! past a clone.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classify::{classify_factor, classify_link, Classification};
use crate::ids::{IdGenerator, UuidIdGenerator};
use crate::log::{EventLog, TracingEventLog};
use crate::source::{DanglingReference, RemoteGraphSource, RemoteSnapshot};
use crate::store::GraphStore;
use crate::types::{Factor, FactorId, Link, LinkId, RemapTable};

/// Horizontal and vertical offset of a conflict clone from the local factor
/// it conflicts with, to avoid visual overlap.
pub const CLONE_OFFSET: f64 = 30.0;

/// Border width applied to conflict clones, normal and selected.
pub const CONFLICT_BORDER_WIDTH: u32 = 4;

/// Border color applied to conflict clones, normal and highlighted.
pub const CONFLICT_BORDER_COLOR: &str = "#ff0000";

/// Log category for merge events.
pub const MERGE_CATEGORY: &str = "Merge";

/// Error type for merge operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
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

impl MergeError {
    /// Create a store error from any error type.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::Store(e.to_string())
    }

    /// Create a source error from any error type.
    pub fn from_source<E: std::error::Error>(e: E) -> Self {
        Self::Source(e.to_string())
    }
}

/// Counts of the actions one merge call took.
///
/// `links_bridged` and `links_added` are counted separately: a remote link
/// whose endpoint was cloned *and* whose original id is absent locally
/// produces one of each (see the crate docs on the inherited double-add).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Remote factors added unchanged (absent locally).
    pub factors_added: usize,
    /// Conflict clones created for label-conflicting factors.
    pub factors_cloned: usize,
    /// Factor style mismatches reported with the existing style retained.
    pub factor_style_conflicts: usize,
    /// Remote links added unchanged (absent locally).
    pub links_added: usize,
    /// Bridge links created by endpoint rewriting into clones.
    pub links_bridged: usize,
    /// Link label mismatches reported with the existing label retained.
    pub link_label_conflicts: usize,
    /// Link style mismatches reported with the existing style retained.
    pub link_style_conflicts: usize,
}

impl MergeReport {
    /// Total entities added to the local graph by this merge.
    pub fn total_additions(&self) -> usize {
        self.factors_added + self.factors_cloned + self.links_added + self.links_bridged
    }
}

/// The reconciliation engine.
///
/// Holds the local [`GraphStore`], an [`IdGenerator`] for clone identifiers
/// and an [`EventLog`] narrating every action. One `merge` or `diff` call
/// runs to completion over a single snapshot; callers must serialize
/// concurrent merges into the same store.
pub struct Reconciler<S: GraphStore> {
    store: Arc<S>,
    ids: Arc<dyn IdGenerator>,
    log: Arc<dyn EventLog>,
}

impl<S: GraphStore> Reconciler<S> {
    /// Create a reconciler with explicit collaborators.
    pub fn new(store: Arc<S>, ids: Arc<dyn IdGenerator>, log: Arc<dyn EventLog>) -> Self {
        Self { store, ids, log }
    }

    /// Create a reconciler with UUID clone ids and tracing-backed logging.
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, Arc::new(UuidIdGenerator), Arc::new(TracingEventLog))
    }

    /// The local graph store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn sink(&self) -> &dyn EventLog {
        self.log.as_ref()
    }

    /// Merge the remote snapshot into the local graph.
    ///
    /// Validates the snapshot first, then runs the factor pass and the link
    /// pass. Strictly additive: no pre-existing local entity is mutated.
    pub async fn merge(&self, snapshot: &RemoteSnapshot) -> Result<MergeReport, MergeError> {
        snapshot.validate()?;

        let mut report = MergeReport::default();
        let remap = self.reconcile_factors(&snapshot.factors, &mut report).await?;
        self.reconcile_links(snapshot, &remap, &mut report).await?;
        Ok(report)
    }

    /// Wait for the source to reach a synchronized state, take one snapshot
    /// and merge it.
    pub async fn merge_from_source<R: RemoteGraphSource>(
        &self,
        source: &R,
    ) -> Result<MergeReport, MergeError> {
        source.ready().await.map_err(MergeError::from_source)?;
        let snapshot = source.snapshot().await.map_err(MergeError::from_source)?;
        self.merge(&snapshot).await
    }

    /// Walk the remote factors, adding absent ones and cloning label
    /// conflicts. Returns the remap table covering exactly the factors
    /// cloned in this call.
    async fn reconcile_factors(
        &self,
        remote_factors: &[Factor],
        report: &mut MergeReport,
    ) -> Result<RemapTable, MergeError> {
        let mut remap = RemapTable::new();

        for remote in remote_factors {
            let local = self
                .store
                .get_factor(&remote.id)
                .await
                .map_err(MergeError::from_store)?;

            match (classify_factor(local.as_ref(), remote), local.as_ref()) {
                (Classification::Absent, _) => {
                    self.store
                        .add_factor(remote.clone())
                        .await
                        .map_err(MergeError::from_store)?;
                    self.log.log(
                        &format!("Added new Factor: '{}'", remote.label),
                        MERGE_CATEGORY,
                    );
                    report.factors_added += 1;
                }
                (Classification::LabelConflict, Some(local)) => {
                    let clone = conflict_clone(remote, local, FactorId::new(self.ids.new_id()));
                    remap.insert(remote.id.clone(), clone.id.clone());
                    self.store
                        .add_factor(clone)
                        .await
                        .map_err(MergeError::from_store)?;
                    self.log.log(
                        &format!(
                            "Existing Factor label: '{}' does not match new label: '{}'. \
                             Factor with new label added.",
                            local.label, remote.label
                        ),
                        MERGE_CATEGORY,
                    );
                    report.factors_cloned += 1;
                }
                (Classification::StyleConflict, Some(local)) => {
                    self.log.log(
                        &format!(
                            "Existing style: '{}' does not match new style: '{}' for Factor: \
                             '{}'. Existing style retained.",
                            local.grp, remote.grp, local.label
                        ),
                        MERGE_CATEGORY,
                    );
                    report.factor_style_conflicts += 1;
                }
                _ => {}
            }
        }

        Ok(remap)
    }

    /// Walk the remote links: bridge links into cloned endpoints, then
    /// handle each link's original identifier against the local graph.
    ///
    /// The two steps are independent and may both fire for one remote link.
    async fn reconcile_links(
        &self,
        snapshot: &RemoteSnapshot,
        remap: &RemapTable,
        report: &mut MergeReport,
    ) -> Result<(), MergeError> {
        let remote_labels = snapshot.factor_labels();

        for remote in &snapshot.links {
            // Step 1: endpoint rewriting. A link touching a cloned factor is
            // itself a new entity: fresh id, dashed, added unconditionally.
            if let Some(bridge) = rewrite_endpoints(remote, remap) {
                let bridge = Link {
                    id: LinkId::new(self.ids.new_id()),
                    dashes: true,
                    ..bridge
                };
                let from_label = self.local_label(&bridge.from).await?;
                let to_label = self.local_label(&bridge.to).await?;
                self.store
                    .add_link(bridge)
                    .await
                    .map_err(MergeError::from_store)?;
                self.log.log(
                    &format!("Added Link between new Factor(s): {from_label} to {to_label}"),
                    MERGE_CATEGORY,
                );
                report.links_bridged += 1;
            }

            // Step 2: the original identifier, classified as-is.
            let local = self
                .store
                .get_link(&remote.id)
                .await
                .map_err(MergeError::from_store)?;

            match (classify_link(local.as_ref(), remote), local.as_ref()) {
                (Classification::Absent, _) => {
                    let name = link_name(remote, &remote_labels);
                    self.store
                        .add_link(remote.clone())
                        .await
                        .map_err(MergeError::from_store)?;
                    self.log
                        .log(&format!("Added new Link: '{name}'"), MERGE_CATEGORY);
                    report.links_added += 1;
                }
                (Classification::LabelConflict, Some(local)) => {
                    self.log.log(
                        &format!(
                            "Existing Link label: '{}' does not match new label: '{}'. \
                             Existing label retained.",
                            local.label_or_empty(),
                            remote.label_or_empty()
                        ),
                        MERGE_CATEGORY,
                    );
                    report.link_label_conflicts += 1;
                }
                (Classification::StyleConflict, Some(local)) => {
                    let name = link_name(remote, &remote_labels);
                    self.log.log(
                        &format!(
                            "Existing Link style: '{}' does not match new style: '{}' for link \
                             '{}'. Existing style retained.",
                            local.grp, remote.grp, name
                        ),
                        MERGE_CATEGORY,
                    );
                    report.link_style_conflicts += 1;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Label of a factor in the local graph; by the time bridge links are
    /// logged the factor pass has made every endpoint resolvable.
    async fn local_label(&self, id: &FactorId) -> Result<String, MergeError> {
        Ok(self
            .store
            .get_factor(id)
            .await
            .map_err(MergeError::from_store)?
            .map(|f| f.label)
            .unwrap_or_else(|| id.to_string()))
    }
}

/// Build the conflict clone of a remote factor: fresh id, offset position,
/// dashed red border on both normal and highlighted states.
fn conflict_clone(remote: &Factor, local: &Factor, id: FactorId) -> Factor {
    let mut clone = remote.clone();
    clone.id = id;
    clone.shape_properties.border_dashes = true;
    clone.border_width = CONFLICT_BORDER_WIDTH;
    clone.border_width_selected = CONFLICT_BORDER_WIDTH;
    clone.color.border = Some(CONFLICT_BORDER_COLOR.to_string());
    clone.color.highlight.border = Some(CONFLICT_BORDER_COLOR.to_string());
    clone.x = local.x + CLONE_OFFSET;
    clone.y = local.y + CLONE_OFFSET;
    clone
}

/// Rewrite a remote link's endpoints through the remap table. Returns `None`
/// when neither endpoint was cloned. Both endpoints are checked
/// independently, so a link between two clones is rewritten on both ends.
fn rewrite_endpoints(link: &Link, remap: &RemapTable) -> Option<Link> {
    let from = remap.get(&link.from);
    let to = remap.get(&link.to);
    if from.is_none() && to.is_none() {
        return None;
    }
    let mut rewritten = link.clone();
    if let Some(clone_id) = from {
        rewritten.from = clone_id.clone();
    }
    if let Some(clone_id) = to {
        rewritten.to = clone_id.clone();
    }
    Some(rewritten)
}

/// Display name for a link: its label, or `from X to Y` resolved against the
/// given factor labels when unlabeled.
pub(crate) fn link_name(link: &Link, labels: &BTreeMap<&FactorId, &str>) -> String {
    match link.label.as_deref() {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => {
            let from = labels.get(&link.from).copied().unwrap_or("");
            let to = labels.get(&link.to).copied().unwrap_or("");
            format!("from {from} to {to}")
        }
    }
}
