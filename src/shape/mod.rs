//! Shape records: the durable unit of the document.
//!
//! A [`Shape`] is a typed [`Geometry`] plus a [`Style`] and an optional transform string. Records
//! serialize to the flat JSON layout the store persists:
//!
//! ```text
//! {"id":1,"type":"rectangle","x":10,"y":10,"width":100,"height":50,"fill":"black",...}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

mod attributes;
mod geometry;
mod lenient;

pub use attributes::{AttrValue, Attributes};
pub use geometry::{DragInput, Geometry, TEXT_FONT_SIZE, parse_path_points};

/// Stable identifier shared by a stored record and its rendered element
pub type ShapeId = u64;

/// The closed set of drawable primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Ellipse,
    Line,
    Polygon,
    Polyline,
    Path,
    Text,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Ellipse,
        ShapeKind::Line,
        ShapeKind::Polygon,
        ShapeKind::Polyline,
        ShapeKind::Path,
        ShapeKind::Text,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Path => "path",
            ShapeKind::Text => "text",
        }
    }

    /// Name of the matching SVG element
    pub fn svg_tag(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rect",
            other => other.as_str(),
        }
    }

    /// Geometry attribute names persisted for this kind
    pub fn geometry_fields(self) -> &'static [&'static str] {
        match self {
            ShapeKind::Rectangle => &["x", "y", "width", "height"],
            ShapeKind::Circle => &["cx", "cy", "r"],
            ShapeKind::Ellipse => &["cx", "cy", "rx", "ry"],
            ShapeKind::Line => &["x1", "y1", "x2", "y2"],
            ShapeKind::Polygon | ShapeKind::Polyline => &["points"],
            ShapeKind::Path => &["d"],
            ShapeKind::Text => &["x", "y", "text"],
        }
    }

    /// Whether this kind can be created with a drag gesture
    pub fn is_drawable(self) -> bool {
        !matches!(self, ShapeKind::Text)
    }

    /// Kinds offered in the shape menu
    pub fn drawable() -> impl Iterator<Item = ShapeKind> {
        Self::ALL.into_iter().filter(|kind| kind.is_drawable())
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ShapeError::UnknownKind(s.to_string()))
    }
}

/// Paint attributes editable from the style toolbar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    pub fill: String,
    pub stroke: String,
    #[serde(rename = "stroke-width")]
    pub stroke_width: f32,
}

impl Style {
    /// Default style for a freshly committed shape of `kind`
    pub fn for_kind(kind: ShapeKind) -> Self {
        let (fill, stroke) = match kind {
            ShapeKind::Line | ShapeKind::Polyline => ("none", "black"),
            ShapeKind::Path => ("black", "black"),
            _ => ("black", "none"),
        };
        Self {
            fill: fill.to_string(),
            stroke: stroke.to_string(),
            stroke_width: 1.0,
        }
    }
}

/// A single field-level mutation of an existing record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Fill(String),
    Stroke(String),
    StrokeWidth(f32),
    Transform(Option<String>),
}

impl FieldUpdate {
    /// Attribute name this update writes
    pub fn name(&self) -> &'static str {
        match self {
            FieldUpdate::Fill(_) => "fill",
            FieldUpdate::Stroke(_) => "stroke",
            FieldUpdate::StrokeWidth(_) => "stroke-width",
            FieldUpdate::Transform(_) => "transform",
        }
    }
}

/// A persisted drawable primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ShapeRecord")]
pub struct Shape {
    pub id: ShapeId,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(flatten)]
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

impl Shape {
    /// Create a shape with the default style for its kind
    pub fn new(id: ShapeId, geometry: Geometry) -> Self {
        let style = Style::for_kind(geometry.kind());
        Self {
            id,
            geometry,
            style,
            transform: None,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    /// Apply a field-level mutation to this record
    pub fn apply(&mut self, update: &FieldUpdate) {
        match update {
            FieldUpdate::Fill(fill) => self.style.fill = fill.clone(),
            FieldUpdate::Stroke(stroke) => self.style.stroke = stroke.clone(),
            FieldUpdate::StrokeWidth(width) => self.style.stroke_width = *width,
            FieldUpdate::Transform(transform) => self.transform = transform.clone(),
        }
    }

    /// Every renderable attribute of this shape: geometry, style and transform
    pub fn attributes(&self) -> Attributes {
        let mut attrs = self.geometry.attributes();
        attrs.set("fill", AttrValue::Text(self.style.fill.clone()));
        attrs.set("stroke", AttrValue::Text(self.style.stroke.clone()));
        attrs.set("stroke-width", AttrValue::Number(self.style.stroke_width));
        if let Some(transform) = &self.transform {
            attrs.set("transform", AttrValue::Text(transform.clone()));
        }
        attrs
    }
}

/// Wire form of a shape; style fields may be absent in older records
#[derive(Deserialize)]
struct ShapeRecord {
    #[serde(deserialize_with = "lenient::id")]
    id: ShapeId,
    #[serde(flatten)]
    geometry: Geometry,
    #[serde(default)]
    fill: Option<String>,
    #[serde(default)]
    stroke: Option<String>,
    #[serde(default, rename = "stroke-width", deserialize_with = "lenient::optional_number")]
    stroke_width: Option<f32>,
    #[serde(default)]
    transform: Option<String>,
}

impl From<ShapeRecord> for Shape {
    fn from(record: ShapeRecord) -> Self {
        let defaults = Style::for_kind(record.geometry.kind());
        Self {
            id: record.id,
            style: Style {
                fill: record.fill.unwrap_or(defaults.fill),
                stroke: record.stroke.unwrap_or(defaults.stroke),
                stroke_width: record.stroke_width.unwrap_or(defaults.stroke_width),
            },
            geometry: record.geometry,
            transform: record.transform.filter(|t| !t.trim().is_empty()),
        }
    }
}
