//! Link (edge) types for the reconciliation kernel.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::factor::FactorId;

/// Unique identifier for a Link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    /// Create a LinkId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LinkId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LinkId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A Link: a directed edge between two Factors.
///
/// Both endpoints must resolve within the owning map at all times. A link
/// whose endpoint was superseded by a clone is never left pointing at the
/// old id; the edge reconciler rewrites it atomically with the clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Unique identifier.
    pub id: LinkId,
    /// Source factor.
    pub from: FactorId,
    /// Target factor.
    pub to: FactorId,
    /// Optional display text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Style-class tag, orthogonal to identity.
    #[serde(default)]
    pub grp: String,
    /// Whether the line is drawn dashed.
    #[serde(default)]
    pub dashes: bool,
}

impl Link {
    /// Create a link with the given identity fields and default styling.
    pub fn new(
        id: impl Into<LinkId>,
        from: impl Into<FactorId>,
        to: impl Into<FactorId>,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            label: None,
            grp: String::new(),
            dashes: false,
        }
    }

    /// Set the label, builder style.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the style class, builder style.
    pub fn grouped(mut self, grp: impl Into<String>) -> Self {
        self.grp = grp.into();
        self
    }

    /// The label normalized for comparison: missing compares as empty.
    pub fn label_or_empty(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_matches_editor_records() {
        let link = Link::new("e1", "n1", "n2").labeled("causes").grouped("edge0");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["id"], "e1");
        assert_eq!(json["from"], "n1");
        assert_eq!(json["to"], "n2");
        assert_eq!(json["grp"], "edge0");
        assert_eq!(json["dashes"], false);
    }

    #[test]
    fn unlabeled_link_normalizes_to_empty() {
        let link: Link = serde_json::from_str(r#"{"id":"e1","from":"a","to":"b"}"#).unwrap();
        assert_eq!(link.label, None);
        assert_eq!(link.label_or_empty(), "");
    }
}
