//! Factor (node) types for the reconciliation kernel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a Factor.
///
/// Opaque string, globally unique within a map (the surrounding editor uses
/// UUIDv4 strings). Implements `Ord` for deterministic iteration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorId(String);

impl FactorId {
    /// Create a FactorId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FactorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FactorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Shape attributes of a Factor's outline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProperties {
    /// Whether the border is drawn dashed.
    #[serde(default)]
    pub border_dashes: bool,
}

/// Border color in the highlighted (selected) state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighlightColor {
    /// Border color when highlighted, CSS color string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
}

/// Border colors for normal and highlighted states.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorSet {
    /// Normal border color, CSS color string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    /// Highlighted-state colors.
    #[serde(default)]
    pub highlight: HighlightColor,
}

/// A Factor: a node in a map.
///
/// Identity is carried by `id` alone; `label` and `grp` may repeat across
/// factors. Position is advisory and only consulted when placing clones.
/// The serde shape matches the record exchanged with the surrounding editor
/// (`grp`, `borderWidth`, `shapeProperties.borderDashes`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factor {
    /// Unique identifier.
    pub id: FactorId,
    /// Display text. May be empty.
    #[serde(default)]
    pub label: String,
    /// Style-class tag, orthogonal to identity.
    #[serde(default)]
    pub grp: String,
    /// Horizontal position.
    #[serde(default)]
    pub x: f64,
    /// Vertical position.
    #[serde(default)]
    pub y: f64,
    /// Border width in the normal state.
    #[serde(default)]
    pub border_width: u32,
    /// Border width in the selected state.
    #[serde(default)]
    pub border_width_selected: u32,
    /// Outline shape attributes.
    #[serde(default)]
    pub shape_properties: ShapeProperties,
    /// Border colors.
    #[serde(default)]
    pub color: ColorSet,
}

impl Factor {
    /// Create a factor with the given identity fields and default styling.
    pub fn new(id: impl Into<FactorId>, label: impl Into<String>, grp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            grp: grp.into(),
            x: 0.0,
            y: 0.0,
            border_width: 0,
            border_width_selected: 0,
            shape_properties: ShapeProperties::default(),
            color: ColorSet::default(),
        }
    }

    /// Set the position, builder style.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}
