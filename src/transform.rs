//! Parsing and composition of the `transform` string stored on a shape.
//!
//! The stored form is `translate(dx, dy) rotate(deg)`, either part optional. Rotation is about
//! the centre of the untransformed geometry and the translation is applied afterwards.

use std::fmt;

use egui::emath::Rot2;
use egui::{Pos2, Vec2, vec2};
use log::debug;

/// Decoded shape transform
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeTransform {
    pub translate: Vec2,
    /// Clockwise rotation in degrees, normalized into `[0, 360)`
    pub rotate: f32,
}

/// Wrap an angle in degrees into `[0, 360)`
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

impl ShapeTransform {
    pub fn new(translate: Vec2, rotate: f32) -> Self {
        Self {
            translate,
            rotate: normalize_degrees(rotate),
        }
    }

    /// Parse a stored transform; unknown functions are ignored
    pub fn parse(text: &str) -> Self {
        let mut transform = Self::default();
        for chunk in text.split(')') {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            let Some((name, args)) = chunk.split_once('(') else {
                debug!("Ignoring malformed transform segment `{chunk}`");
                continue;
            };
            let args: Vec<f32> = args
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.trim_end_matches("deg").parse().ok())
                .collect();
            match (name.trim(), args.as_slice()) {
                ("translate", [dx]) => transform.translate = vec2(*dx, 0.0),
                ("translate", [dx, dy]) => transform.translate = vec2(*dx, *dy),
                ("rotate", [deg, ..]) => transform.rotate = normalize_degrees(*deg),
                (name, _) => debug!("Ignoring transform function `{name}` in `{text}`"),
            }
        }
        transform
    }

    /// Parse an optional stored transform
    pub fn from_stored(text: Option<&str>) -> Self {
        text.map(Self::parse).unwrap_or_default()
    }

    pub fn is_identity(&self) -> bool {
        self.translate == Vec2::ZERO && self.rotate == 0.0
    }

    pub fn with_translate(self, translate: Vec2) -> Self {
        Self { translate, ..self }
    }

    pub fn with_rotate(self, degrees: f32) -> Self {
        Self {
            rotate: normalize_degrees(degrees),
            ..self
        }
    }

    fn rotation(&self) -> Rot2 {
        Rot2::from_angle(self.rotate.to_radians())
    }

    /// Map a point from shape space to surface space
    pub fn apply(&self, pos: Pos2, center: Pos2) -> Pos2 {
        center + self.rotation() * (pos - center) + self.translate
    }

    /// Map a point from surface space back to shape space
    pub fn invert(&self, pos: Pos2, center: Pos2) -> Pos2 {
        let unrotated = pos - self.translate - center;
        center + self.rotation().inverse() * unrotated
    }

    /// The stored string, or `None` for the identity transform
    pub fn to_stored(&self) -> Option<String> {
        (!self.is_identity()).then(|| self.to_string())
    }

    /// SVG attribute value with the rotation centre made explicit
    pub fn to_svg(&self, center: Pos2) -> String {
        let mut parts = Vec::new();
        if self.translate != Vec2::ZERO {
            parts.push(format!("translate({}, {})", self.translate.x, self.translate.y));
        }
        if self.rotate != 0.0 {
            parts.push(format!("rotate({}, {}, {})", self.rotate, center.x, center.y));
        }
        parts.join(" ")
    }
}

impl fmt::Display for ShapeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if self.translate != Vec2::ZERO {
            write!(f, "translate({}, {})", self.translate.x, self.translate.y)?;
            wrote = true;
        }
        if self.rotate != 0.0 {
            if wrote {
                f.write_str(" ")?;
            }
            write!(f, "rotate({})", self.rotate)?;
        }
        Ok(())
    }
}
