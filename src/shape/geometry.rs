use egui::{Pos2, Rect, Vec2, pos2, vec2};
use lyon::geom::ArcFlags;
use lyon::math::{Angle, point, vector};
use lyon::path::builder::{Build, SvgPathBuilder};
use lyon::path::iterator::PathIterator;
use lyon::path::{Event, Path as LyonPath};
use serde::{Deserialize, Serialize};

use super::attributes::{AttrValue, Attributes};
use super::{ShapeKind, lenient};
use crate::error::ShapeError;

/// Segments used when flattening circles and ellipses
const CURVE_SEGMENTS: usize = 48;
/// Font size assumed for text extents
pub const TEXT_FONT_SIZE: f32 = 16.0;
/// Average glyph advance relative to the font size
const TEXT_ADVANCE: f32 = 0.6;

/// Type-specific geometry of a shape, tagged by its `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Rectangle {
        #[serde(default, deserialize_with = "lenient::start_coordinate")]
        x: f32,
        #[serde(default, deserialize_with = "lenient::start_coordinate")]
        y: f32,
        #[serde(deserialize_with = "lenient::number")]
        width: f32,
        #[serde(deserialize_with = "lenient::number")]
        height: f32,
    },
    Circle {
        #[serde(deserialize_with = "lenient::number")]
        cx: f32,
        #[serde(deserialize_with = "lenient::number")]
        cy: f32,
        #[serde(deserialize_with = "lenient::number")]
        r: f32,
    },
    Ellipse {
        #[serde(deserialize_with = "lenient::number")]
        cx: f32,
        #[serde(deserialize_with = "lenient::number")]
        cy: f32,
        #[serde(deserialize_with = "lenient::number")]
        rx: f32,
        #[serde(deserialize_with = "lenient::number")]
        ry: f32,
    },
    Line {
        #[serde(default, deserialize_with = "lenient::start_coordinate")]
        x1: f32,
        #[serde(default, deserialize_with = "lenient::start_coordinate")]
        y1: f32,
        #[serde(deserialize_with = "lenient::number")]
        x2: f32,
        #[serde(deserialize_with = "lenient::number")]
        y2: f32,
    },
    Polygon {
        #[serde(deserialize_with = "lenient::points")]
        points: Vec<Pos2>,
    },
    Polyline {
        #[serde(deserialize_with = "lenient::points")]
        points: Vec<Pos2>,
    },
    Path {
        d: String,
    },
    Text {
        #[serde(deserialize_with = "lenient::number")]
        x: f32,
        #[serde(deserialize_with = "lenient::number")]
        y: f32,
        #[serde(default)]
        text: String,
    },
}

/// Pointer interaction box a shape is derived from.
///
/// `size` is normally the delta between `start` and `end`, but may be given explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragInput {
    pub start: Option<Pos2>,
    pub end: Option<Pos2>,
    pub size: Option<Vec2>,
}

impl DragInput {
    pub fn between(start: Pos2, end: Pos2) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            size: None,
        }
    }

    pub fn sized(start: Pos2, size: Vec2) -> Self {
        Self {
            start: Some(start),
            end: None,
            size: Some(size),
        }
    }

    /// Signed drag delta
    pub fn size(&self) -> Option<Vec2> {
        self.size.or_else(|| Some(self.end? - self.start?))
    }

    fn require_start(&self, kind: ShapeKind) -> Result<Pos2, ShapeError> {
        self.start.ok_or(ShapeError::MissingField { kind, field: "start" })
    }

    fn require_end(&self, kind: ShapeKind) -> Result<Pos2, ShapeError> {
        self.end.ok_or(ShapeError::MissingField { kind, field: "end" })
    }

    fn require_size(&self, kind: ShapeKind) -> Result<Vec2, ShapeError> {
        self.size().ok_or(ShapeError::MissingField { kind, field: "width" })
    }
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Rectangle { .. } => ShapeKind::Rectangle,
            Geometry::Circle { .. } => ShapeKind::Circle,
            Geometry::Ellipse { .. } => ShapeKind::Ellipse,
            Geometry::Line { .. } => ShapeKind::Line,
            Geometry::Polygon { .. } => ShapeKind::Polygon,
            Geometry::Polyline { .. } => ShapeKind::Polyline,
            Geometry::Path { .. } => ShapeKind::Path,
            Geometry::Text { .. } => ShapeKind::Text,
        }
    }

    /// Derive the geometry of `kind` from a drag box.
    ///
    /// Every input the kind needs is checked before anything is computed.
    pub fn from_drag(kind: ShapeKind, input: &DragInput) -> Result<Geometry, ShapeError> {
        match kind {
            ShapeKind::Rectangle => {
                let start = input.require_start(kind)?;
                let size = input.require_size(kind)?;
                Ok(Geometry::Rectangle {
                    x: start.x.min(start.x + size.x),
                    y: start.y.min(start.y + size.y),
                    width: size.x.abs(),
                    height: size.y.abs(),
                })
            }
            ShapeKind::Circle => {
                let start = input.require_start(kind)?;
                let size = input.require_size(kind)?;
                Ok(Geometry::Circle {
                    cx: start.x,
                    cy: start.y,
                    r: size.x.abs(),
                })
            }
            ShapeKind::Ellipse => {
                let start = input.require_start(kind)?;
                let size = input.require_size(kind)?;
                Ok(Geometry::Ellipse {
                    cx: start.x,
                    cy: start.y,
                    rx: size.x,
                    ry: size.y,
                })
            }
            ShapeKind::Line => {
                let start = input.require_start(kind)?;
                let end = input.require_end(kind)?;
                Ok(Geometry::Line {
                    x1: start.x,
                    y1: start.y,
                    x2: end.x,
                    y2: end.y,
                })
            }
            ShapeKind::Polygon | ShapeKind::Polyline | ShapeKind::Path => {
                let start = input.require_start(kind)?;
                let end = input.require_end(kind)?;
                let corners = vec![start, pos2(end.x, start.y), end, pos2(start.x, end.y)];
                Ok(match kind {
                    ShapeKind::Polygon => Geometry::Polygon { points: corners },
                    ShapeKind::Polyline => Geometry::Polyline { points: corners },
                    _ => Geometry::Path {
                        d: format!(
                            "M{},{} L{},{} L{},{} L{},{} Z",
                            start.x, start.y, end.x, start.y, end.x, end.y, start.x, end.y
                        ),
                    },
                })
            }
            ShapeKind::Text => Err(ShapeError::UnsupportedKind(kind)),
        }
    }

    /// Rebuild typed geometry from an attribute table, ignoring non-geometry entries
    pub fn from_attributes(kind: ShapeKind, attrs: &Attributes) -> Result<Geometry, ShapeError> {
        let num = |field: &'static str| -> Result<f32, ShapeError> {
            match attrs.get(field) {
                None => Err(ShapeError::MissingField { kind, field }),
                Some(value) => value.as_number().ok_or_else(|| ShapeError::InvalidValue {
                    field,
                    value: value.to_string(),
                }),
            }
        };
        let points = || -> Result<Vec<Pos2>, ShapeError> {
            match attrs.get("points") {
                None => Err(ShapeError::MissingField { kind, field: "points" }),
                Some(AttrValue::Points(points)) => Ok(points.clone()),
                Some(AttrValue::Text(text)) => parse_points(text),
                Some(other) => Err(ShapeError::InvalidValue {
                    field: "points",
                    value: other.to_string(),
                }),
            }
        };
        let text = |field: &'static str| -> Result<String, ShapeError> {
            attrs
                .get(field)
                .map(|value| value.to_string())
                .ok_or(ShapeError::MissingField { kind, field })
        };

        Ok(match kind {
            ShapeKind::Rectangle => Geometry::Rectangle {
                x: num("x")?,
                y: num("y")?,
                width: num("width")?,
                height: num("height")?,
            },
            ShapeKind::Circle => Geometry::Circle {
                cx: num("cx")?,
                cy: num("cy")?,
                r: num("r")?,
            },
            ShapeKind::Ellipse => Geometry::Ellipse {
                cx: num("cx")?,
                cy: num("cy")?,
                rx: num("rx")?,
                ry: num("ry")?,
            },
            ShapeKind::Line => Geometry::Line {
                x1: num("x1")?,
                y1: num("y1")?,
                x2: num("x2")?,
                y2: num("y2")?,
            },
            ShapeKind::Polygon => Geometry::Polygon { points: points()? },
            ShapeKind::Polyline => Geometry::Polyline { points: points()? },
            ShapeKind::Path => Geometry::Path { d: text("d")? },
            ShapeKind::Text => Geometry::Text {
                x: num("x")?,
                y: num("y")?,
                text: text("text")?,
            },
        })
    }

    /// Geometry attributes of this shape, keyed by SVG attribute name
    pub fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        match self {
            Geometry::Rectangle { x, y, width, height } => {
                attrs.set("x", *x);
                attrs.set("y", *y);
                attrs.set("width", *width);
                attrs.set("height", *height);
            }
            Geometry::Circle { cx, cy, r } => {
                attrs.set("cx", *cx);
                attrs.set("cy", *cy);
                attrs.set("r", *r);
            }
            Geometry::Ellipse { cx, cy, rx, ry } => {
                attrs.set("cx", *cx);
                attrs.set("cy", *cy);
                attrs.set("rx", *rx);
                attrs.set("ry", *ry);
            }
            Geometry::Line { x1, y1, x2, y2 } => {
                attrs.set("x1", *x1);
                attrs.set("y1", *y1);
                attrs.set("x2", *x2);
                attrs.set("y2", *y2);
            }
            Geometry::Polygon { points } | Geometry::Polyline { points } => {
                attrs.set("points", AttrValue::Points(points.clone()));
            }
            Geometry::Path { d } => attrs.set("d", d.as_str()),
            Geometry::Text { x, y, text } => {
                attrs.set("x", *x);
                attrs.set("y", *y);
                attrs.set("text", text.as_str());
            }
        }
        attrs
    }

    /// Whether the outline encloses an area that can be filled
    pub fn is_closed(&self) -> bool {
        match self {
            Geometry::Line { .. } | Geometry::Polyline { .. } => false,
            Geometry::Path { d } => d.trim_end().ends_with(['Z', 'z']),
            _ => true,
        }
    }

    /// Outline as a point list in the shape's own coordinates; curves are flattened
    pub fn outline(&self) -> Vec<Pos2> {
        match self {
            Geometry::Rectangle { x, y, width, height } => {
                let rect = Rect::from_two_pos(pos2(*x, *y), pos2(x + width, y + height));
                vec![rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
            }
            Geometry::Circle { cx, cy, r } => ellipse_points(pos2(*cx, *cy), vec2(r.abs(), r.abs())),
            Geometry::Ellipse { cx, cy, rx, ry } => {
                ellipse_points(pos2(*cx, *cy), vec2(rx.abs(), ry.abs()))
            }
            Geometry::Line { x1, y1, x2, y2 } => vec![pos2(*x1, *y1), pos2(*x2, *y2)],
            Geometry::Polygon { points } | Geometry::Polyline { points } => points.clone(),
            Geometry::Path { d } => parse_path_points(d).unwrap_or_else(|err| {
                log::debug!("Unrenderable path data: {err}");
                Vec::new()
            }),
            Geometry::Text { .. } => {
                let rect = self.bounds();
                vec![rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
            }
        }
    }

    /// Axis-aligned bounds of the untransformed geometry
    pub fn bounds(&self) -> Rect {
        match self {
            Geometry::Circle { cx, cy, r } => {
                Rect::from_center_size(pos2(*cx, *cy), Vec2::splat(r.abs() * 2.0))
            }
            Geometry::Ellipse { cx, cy, rx, ry } => {
                Rect::from_center_size(pos2(*cx, *cy), vec2(rx.abs() * 2.0, ry.abs() * 2.0))
            }
            Geometry::Text { x, y, text } => {
                let width = text.chars().count() as f32 * TEXT_FONT_SIZE * TEXT_ADVANCE;
                Rect::from_min_max(pos2(*x, y - TEXT_FONT_SIZE), pos2(x + width, *y))
            }
            _ => {
                let points = self.outline();
                if points.is_empty() {
                    Rect::from_min_size(Pos2::ZERO, Vec2::ZERO)
                } else {
                    Rect::from_points(&points)
                }
            }
        }
    }

    /// Hit test in the shape's own coordinates
    pub fn contains(&self, pos: Pos2, tolerance: f32) -> bool {
        if let Geometry::Text { .. } = self {
            return self.bounds().expand(tolerance).contains(pos);
        }
        let points = self.outline();
        if self.is_closed() && point_in_polygon(pos, &points) {
            return true;
        }
        let mut segments: Vec<(Pos2, Pos2)> = points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.is_closed() && points.len() > 2 {
            segments.push((points[points.len() - 1], points[0]));
        }
        segments
            .into_iter()
            .any(|(a, b)| distance_to_segment(pos, a, b) <= tolerance)
    }
}

fn ellipse_points(center: Pos2, radii: Vec2) -> Vec<Pos2> {
    (0..CURVE_SEGMENTS)
        .map(|i| {
            let t = i as f32 / CURVE_SEGMENTS as f32 * std::f32::consts::TAU;
            pos2(center.x + radii.x * t.cos(), center.y + radii.y * t.sin())
        })
        .collect()
}

fn point_in_polygon(pos: Pos2, points: &[Pos2]) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > pos.y) != (b.y > pos.y) && pos.x < (b.x - a.x) * (pos.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let line = end - start;
    let len_sq = line.length_sq();
    if len_sq == 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(line) / len_sq).clamp(0.0, 1.0);
    point.distance(start + line * t)
}

/// Parse an SVG `points` list (`"x,y x,y ..."`)
pub(crate) fn parse_points(text: &str) -> Result<Vec<Pos2>, ShapeError> {
    let invalid = || ShapeError::InvalidValue {
        field: "points",
        value: text.to_string(),
    };
    let numbers = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    if numbers.len() % 2 != 0 {
        return Err(invalid());
    }
    Ok(numbers.chunks(2).map(|pair| pos2(pair[0], pair[1])).collect())
}

enum PathToken {
    Command(char),
    Number(f32),
}

fn tokenize_path(d: &str) -> Result<Vec<PathToken>, ShapeError> {
    let invalid = || ShapeError::InvalidValue {
        field: "d",
        value: d.to_string(),
    };
    let chars: Vec<char> = d.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == ',' {
            i += 1;
        } else if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(PathToken::Command(c));
            i += 1;
        } else if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') {
            let start = i;
            i += 1;
            while i < chars.len() {
                let n = chars[i];
                let after_exponent = matches!(chars[i - 1], 'e' | 'E');
                if n.is_ascii_digit() || n == '.' || matches!(n, 'e' | 'E') {
                    i += 1;
                } else if matches!(n, '-' | '+') && after_exponent {
                    i += 1;
                } else {
                    break;
                }
            }
            let text: String = chars[start..i].iter().collect();
            tokens.push(PathToken::Number(text.parse().map_err(|_| invalid())?));
        } else {
            return Err(invalid());
        }
    }
    Ok(tokens)
}

/// Tolerance used when flattening curves in path data
const PATH_TOLERANCE: f32 = 0.1;

/// Build a lyon path from SVG path data: `m/l/h/v/c/s/q/t/a/z` and their absolute forms.
fn build_path(d: &str) -> Result<LyonPath, ShapeError> {
    let invalid = || ShapeError::InvalidValue {
        field: "d",
        value: d.to_string(),
    };
    let tokens = tokenize_path(d)?;
    let mut builder = LyonPath::svg_builder();
    let mut command: Option<char> = None;
    let mut i = 0;

    while i < tokens.len() {
        if let PathToken::Command(c) = tokens[i] {
            if command.is_none() && !matches!(c, 'M' | 'm') {
                return Err(invalid());
            }
            command = Some(c);
            i += 1;
            if matches!(c, 'Z' | 'z') {
                builder.close();
            }
            continue;
        }

        let c = command.ok_or_else(invalid)?;
        let arity = match c.to_ascii_uppercase() {
            'M' | 'L' | 'T' => 2,
            'H' | 'V' => 1,
            'S' | 'Q' => 4,
            'C' => 6,
            'A' => 7,
            _ => return Err(invalid()),
        };
        let a = tokens[i..]
            .iter()
            .take(arity)
            .map(|token| match token {
                PathToken::Number(n) => Ok(*n),
                PathToken::Command(_) => Err(invalid()),
            })
            .collect::<Result<Vec<f32>, _>>()?;
        if a.len() < arity {
            return Err(invalid());
        }
        i += arity;

        match c {
            'M' => {
                builder.move_to(point(a[0], a[1]));
            }
            'm' => {
                builder.relative_move_to(vector(a[0], a[1]));
            }
            'L' => {
                builder.line_to(point(a[0], a[1]));
            }
            'l' => {
                builder.relative_line_to(vector(a[0], a[1]));
            }
            'H' => {
                builder.horizontal_line_to(a[0]);
            }
            'h' => {
                builder.relative_horizontal_line_to(a[0]);
            }
            'V' => {
                builder.vertical_line_to(a[0]);
            }
            'v' => {
                builder.relative_vertical_line_to(a[0]);
            }
            'C' => {
                builder.cubic_bezier_to(point(a[0], a[1]), point(a[2], a[3]), point(a[4], a[5]));
            }
            'c' => {
                builder.relative_cubic_bezier_to(
                    vector(a[0], a[1]),
                    vector(a[2], a[3]),
                    vector(a[4], a[5]),
                );
            }
            'S' => {
                builder.smooth_cubic_bezier_to(point(a[0], a[1]), point(a[2], a[3]));
            }
            's' => {
                builder.smooth_relative_cubic_bezier_to(vector(a[0], a[1]), vector(a[2], a[3]));
            }
            'Q' => {
                builder.quadratic_bezier_to(point(a[0], a[1]), point(a[2], a[3]));
            }
            'q' => {
                builder.relative_quadratic_bezier_to(vector(a[0], a[1]), vector(a[2], a[3]));
            }
            'T' => {
                builder.smooth_quadratic_bezier_to(point(a[0], a[1]));
            }
            't' => {
                builder.smooth_relative_quadratic_bezier_to(vector(a[0], a[1]));
            }
            'A' | 'a' => {
                let radii = vector(a[0], a[1]);
                let rotation = Angle::degrees(a[2]);
                let flags = ArcFlags {
                    large_arc: a[3] != 0.0,
                    sweep: a[4] != 0.0,
                };
                if c == 'A' {
                    builder.arc_to(radii, rotation, flags, point(a[5], a[6]));
                } else {
                    builder.relative_arc_to(radii, rotation, flags, vector(a[5], a[6]));
                }
            }
            _ => return Err(invalid()),
        }

        // Further coordinate pairs after a move-to are implicit line-tos
        if c == 'M' {
            command = Some('L');
        } else if c == 'm' {
            command = Some('l');
        }
    }
    Ok(builder.build())
}

/// Vertices visited by an SVG path string, with curves and arcs flattened to line segments.
///
/// Subpaths are concatenated; a closing `z` adds no vertex.
pub fn parse_path_points(d: &str) -> Result<Vec<Pos2>, ShapeError> {
    let path = build_path(d)?;
    let mut points = Vec::new();
    for event in path.iter().flattened(PATH_TOLERANCE) {
        match event {
            Event::Begin { at } => points.push(pos2(at.x, at.y)),
            Event::Line { to, .. } => points.push(pos2(to.x, to.y)),
            _ => {}
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_normalizes_drag_direction() {
        let forward = Geometry::from_drag(
            ShapeKind::Rectangle,
            &DragInput::between(pos2(10.0, 10.0), pos2(110.0, 60.0)),
        )
        .unwrap();
        let backward = Geometry::from_drag(
            ShapeKind::Rectangle,
            &DragInput::between(pos2(110.0, 60.0), pos2(10.0, 10.0)),
        )
        .unwrap();

        let expected = Geometry::Rectangle { x: 10.0, y: 10.0, width: 100.0, height: 50.0 };
        assert_eq!(forward, expected);
        assert_eq!(backward, expected);
    }

    #[test]
    fn circle_uses_horizontal_delta_as_radius() {
        let geometry = Geometry::from_drag(
            ShapeKind::Circle,
            &DragInput::sized(pos2(0.0, 0.0), vec2(-30.0, 4.0)),
        )
        .unwrap();
        assert_eq!(geometry, Geometry::Circle { cx: 0.0, cy: 0.0, r: 30.0 });
    }

    #[test]
    fn ellipse_keeps_signed_radii() {
        let geometry = Geometry::from_drag(
            ShapeKind::Ellipse,
            &DragInput::between(pos2(50.0, 50.0), pos2(20.0, 70.0)),
        )
        .unwrap();
        assert_eq!(geometry, Geometry::Ellipse { cx: 50.0, cy: 50.0, rx: -30.0, ry: 20.0 });
        assert_eq!(geometry.bounds().width(), 60.0);
    }

    #[test]
    fn quadrilateral_kinds_trace_the_same_corners() {
        let input = DragInput::between(pos2(1.0, 2.0), pos2(5.0, 8.0));
        let corners = vec![pos2(1.0, 2.0), pos2(5.0, 2.0), pos2(5.0, 8.0), pos2(1.0, 8.0)];

        let polygon = Geometry::from_drag(ShapeKind::Polygon, &input).unwrap();
        assert_eq!(polygon, Geometry::Polygon { points: corners.clone() });

        let path = Geometry::from_drag(ShapeKind::Path, &input).unwrap();
        assert_eq!(path, Geometry::Path { d: "M1,2 L5,2 L5,8 L1,8 Z".into() });
        assert_eq!(path.outline(), corners);
        assert!(path.is_closed());

        let polyline = Geometry::from_drag(ShapeKind::Polyline, &input).unwrap();
        assert!(!polyline.is_closed());
    }

    #[test]
    fn missing_inputs_are_rejected() {
        let only_start = DragInput { start: Some(pos2(0.0, 0.0)), ..Default::default() };

        assert_eq!(
            Geometry::from_drag(ShapeKind::Line, &only_start),
            Err(ShapeError::MissingField { kind: ShapeKind::Line, field: "end" })
        );
        assert_eq!(
            Geometry::from_drag(ShapeKind::Rectangle, &only_start),
            Err(ShapeError::MissingField { kind: ShapeKind::Rectangle, field: "width" })
        );
        assert_eq!(
            Geometry::from_drag(ShapeKind::Circle, &DragInput::default()),
            Err(ShapeError::MissingField { kind: ShapeKind::Circle, field: "start" })
        );
    }

    #[test]
    fn text_cannot_be_dragged() {
        let input = DragInput::between(pos2(0.0, 0.0), pos2(1.0, 1.0));
        assert_eq!(
            Geometry::from_drag(ShapeKind::Text, &input),
            Err(ShapeError::UnsupportedKind(ShapeKind::Text))
        );
    }

    #[test]
    fn attributes_round_trip_through_the_field_table() {
        let line = Geometry::Line { x1: 1.0, y1: 2.0, x2: 3.0, y2: 4.0 };
        let mut attrs = line.attributes();
        attrs.set("stroke-dasharray", "5,5");

        assert_eq!(Geometry::from_attributes(ShapeKind::Line, &attrs), Ok(line));

        attrs.remove("y2");
        assert_eq!(
            Geometry::from_attributes(ShapeKind::Line, &attrs),
            Err(ShapeError::MissingField { kind: ShapeKind::Line, field: "y2" })
        );
    }

    #[test]
    fn hit_testing_open_and_closed_outlines() {
        let rect = Geometry::Rectangle { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        assert!(rect.contains(pos2(5.0, 5.0), 0.0));
        assert!(!rect.contains(pos2(15.0, 5.0), 2.0));

        let line = Geometry::Line { x1: 0.0, y1: 0.0, x2: 10.0, y2: 0.0 };
        assert!(line.contains(pos2(5.0, 1.5), 2.0));
        assert!(!line.contains(pos2(5.0, 5.0), 2.0));
    }

    #[test]
    fn path_parser_handles_relative_and_shorthand_commands() {
        let points = parse_path_points("m10 10 h5 v5 l-5,0 z").unwrap();
        assert_eq!(
            points,
            vec![pos2(10.0, 10.0), pos2(15.0, 10.0), pos2(15.0, 15.0), pos2(10.0, 15.0)]
        );
        assert!(parse_path_points("L 1").is_err());
        assert!(parse_path_points("L 1 2").is_err());
        assert!(parse_points("1,2 3").is_err());
    }

    #[test]
    fn path_curves_are_flattened() {
        let points = parse_path_points("M0,0 Q50,100 100,0").unwrap();
        assert!(points.len() > 3);
        assert_eq!(points.first(), Some(&pos2(0.0, 0.0)));
        let last = *points.last().unwrap();
        assert!((last - pos2(100.0, 0.0)).length() < 1e-3);
        // The apex of the curve lies halfway to its control point
        let top = points.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!((top - 50.0).abs() < 0.5);

        let arc = Geometry::Path { d: "M0,10 A10,10 0 0 1 20,10 Z".into() };
        let bounds = arc.bounds();
        assert!((bounds.min.y - 0.0).abs() < 0.2);
        assert!(arc.contains(pos2(10.0, 5.0), 0.0));
    }
}
