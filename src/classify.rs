//! Conflict classifier.
//!
//! Pure functions that compare a remote entity against the local entity
//! sharing its identifier (or its absence) and name the relationship. Both
//! the merge and diff pipelines run on top of these, which is what keeps
//! their findings in lockstep.

use serde::{Deserialize, Serialize};

use crate::types::{Factor, Link};

/// Relationship between a remote entity and its local counterpart.
///
/// Checks apply in priority order: absence wins over a label conflict, a
/// label conflict wins over a style conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// No local entity shares the remote entity's identifier.
    Absent,
    /// Same identifier, same label, same style class.
    Identical,
    /// Same identifier but the labels differ (case-sensitive exact compare).
    LabelConflict,
    /// Same identifier and label but the style classes differ.
    StyleConflict,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Identical => write!(f, "identical"),
            Self::LabelConflict => write!(f, "label conflict"),
            Self::StyleConflict => write!(f, "style conflict"),
        }
    }
}

/// Classify a remote factor against the local factor with the same id.
pub fn classify_factor(local: Option<&Factor>, remote: &Factor) -> Classification {
    match local {
        None => Classification::Absent,
        Some(local) if local.label != remote.label => Classification::LabelConflict,
        Some(local) if local.grp != remote.grp => Classification::StyleConflict,
        Some(_) => Classification::Identical,
    }
}

/// Classify a remote link against the local link with the same id.
///
/// A missing label compares as the empty string, so an unlabeled link and an
/// empty-labeled link are the same link.
pub fn classify_link(local: Option<&Link>, remote: &Link) -> Classification {
    match local {
        None => Classification::Absent,
        Some(local) if local.label_or_empty() != remote.label_or_empty() => {
            Classification::LabelConflict
        }
        Some(local) if local.grp != remote.grp => Classification::StyleConflict,
        Some(_) => Classification::Identical,
    }
}
