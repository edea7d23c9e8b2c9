//! # reconcile-kernel
//!
//! Conflict-aware reconciliation of two independently-evolved maps of
//! Factors (nodes) and Links (directed labeled edges).
//!
//! The kernel answers one question:
//!
//! > Given a local map and a snapshot of a remote map, what do they disagree
//! > on, and how is the remote map folded into the local one without losing
//! > anything?
//!
//! ## Core Contract
//!
//! 1. `merge` is strictly additive: pre-existing local entities are never
//!    mutated or deleted; conflicts resolve as "prefer local, clone-and-flag
//!    on mismatch"
//! 2. `diff` is the read-only mirror of `merge`: same classifier, same
//!    findings, zero mutation
//! 3. Every action and discrepancy is narrated to an [`EventLog`]
//!
//! ## Architecture
//!
//! ```text
//! RemoteGraphSource → RemoteSnapshot → reconcile factors → RemapTable
//!                                                              ↓
//!                                       reconcile links → GraphStore
//! ```
//!
//! The factor pass clones label-conflicting factors (fresh id, +30/+30
//! offset, dashed red border) and records remote-id → clone-id in the remap
//! table; the link pass rewrites endpoints through that table so no link
//! ever points past a clone.
//!
//! ## Determinism
//!
//! Same local graph + same snapshot + same id generator → identical
//! additions, identical log, identical report. The classifier is pure, and
//! both pipelines visit entities in snapshot order.
//!
//! ## Known asymmetries (inherited, deliberate)
//!
//! - Diff checks factors in both directions but links only remote-to-local.
//! - A remote link whose endpoint was cloned *and* whose original id is
//!   absent locally is added twice: once rewritten as a dashed bridge, once
//!   unchanged. [`MergeReport`] counts the two separately.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod diff;
pub mod ids;
pub mod log;
pub mod merge;
pub mod source;
pub mod store;
pub mod types;

// Re-exports
pub use classify::{classify_factor, classify_link, Classification};
pub use diff::{DiffEntry, DiffError, DiffReport, DIFF_CATEGORY};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use log::{CapturingEventLog, EventLog, LogEntry, TracingEventLog};
pub use merge::{
    MergeError, MergeReport, Reconciler, CLONE_OFFSET, CONFLICT_BORDER_COLOR,
    CONFLICT_BORDER_WIDTH, MERGE_CATEGORY,
};
pub use source::{
    DanglingReference, RemoteGraphSource, RemoteSnapshot, StaticRemoteSource, StaticSourceError,
};
pub use store::{GraphStore, InMemoryGraphStore};
pub use types::{
    ColorSet, Factor, FactorId, HighlightColor, Link, LinkId, RemapTable, ShapeProperties,
};

/// Schema version for the wire-level Factor/Link records.
/// Increment on breaking changes to the serialized shape.
pub const RECONCILE_SCHEMA_VERSION: &str = "1.0.0";
