//! Local graph storage backends.

pub mod memory;

use async_trait::async_trait;

use crate::types::{Factor, FactorId, Link, LinkId};

/// Trait for the canonical local graph.
///
/// The kernel reads from and adds to the store; it never deletes, and it
/// never updates a pre-existing entity (merges are strictly additive).
/// `update_*` exist for the surrounding editor, which shares this interface.
/// All methods are async to support async backends.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Fetch a factor by id.
    async fn get_factor(&self, id: &FactorId) -> Result<Option<Factor>, Self::Error>;

    /// Fetch all factors, ordered by id for determinism.
    async fn factors(&self) -> Result<Vec<Factor>, Self::Error>;

    /// Add a new factor. Fails on a duplicate id.
    async fn add_factor(&self, factor: Factor) -> Result<(), Self::Error>;

    /// Replace an existing factor. Fails if the id is unknown.
    async fn update_factor(&self, factor: Factor) -> Result<(), Self::Error>;

    /// Fetch a link by id.
    async fn get_link(&self, id: &LinkId) -> Result<Option<Link>, Self::Error>;

    /// Fetch all links, ordered by id for determinism.
    async fn links(&self) -> Result<Vec<Link>, Self::Error>;

    /// Add a new link. Fails on a duplicate id or a dangling endpoint.
    async fn add_link(&self, link: Link) -> Result<(), Self::Error>;

    /// Replace an existing link. Fails if the id is unknown or an endpoint
    /// does not resolve.
    async fn update_link(&self, link: Link) -> Result<(), Self::Error>;
}

pub use memory::InMemoryGraphStore;
