//! Core types for the reconciliation kernel.

pub mod factor;
pub mod link;
pub mod remap;

pub use factor::{ColorSet, Factor, FactorId, HighlightColor, ShapeProperties};
pub use link::{Link, LinkId};
pub use remap::RemapTable;
