//! Retained drawing surface.
//!
//! The surface holds one element per visible thing: a permanent element per stored shape (in
//! z-order) followed by the transient overlays. Elements carry the same attribute table the
//! SVG exporter writes, so what is painted and what is exported never drift apart.

use egui::{Pos2, Rect, Vec2, vec2};
use log::debug;

use crate::coords::ScreenMatrix;
use crate::error::ShapeError;
use crate::shape::{Attributes, Geometry, Shape, ShapeId, ShapeKind};
use crate::transform::ShapeTransform;

/// Identifies an element on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKey {
    /// Permanent element of a stored shape
    Shape(ShapeId),
    /// Live stand-in for a shape being drawn
    Preview,
    /// Dashed outline around the selected shape
    SelectionBox,
    /// Rotation handle of the selected shape
    RotateHandle,
}

impl ElementKey {
    pub fn is_overlay(self) -> bool {
        !matches!(self, ElementKey::Shape(_))
    }

    pub fn shape_id(self) -> Option<ShapeId> {
        match self {
            ElementKey::Shape(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: ElementKey,
    pub kind: ShapeKind,
    pub attributes: Attributes,
    pub transform: ShapeTransform,
}

impl Element {
    pub fn new(key: ElementKey, kind: ShapeKind, attributes: Attributes) -> Self {
        Self {
            key,
            kind,
            attributes,
            transform: ShapeTransform::default(),
        }
    }

    /// Typed geometry read back from the attribute table
    pub fn geometry(&self) -> Result<Geometry, ShapeError> {
        Geometry::from_attributes(self.kind, &self.attributes)
    }

    /// Rotation centre: the centre of the untransformed geometry
    pub fn center(&self) -> Option<Pos2> {
        self.geometry().ok().map(|g| g.bounds().center())
    }

    /// Outline in surface coordinates with the transform applied
    pub fn transformed_outline(&self) -> Vec<Pos2> {
        let Ok(geometry) = self.geometry() else {
            return Vec::new();
        };
        let center = geometry.bounds().center();
        geometry
            .outline()
            .into_iter()
            .map(|p| self.transform.apply(p, center))
            .collect()
    }

    pub fn stroke_width(&self) -> f32 {
        self.attributes.number("stroke-width").unwrap_or(1.0)
    }

    /// Dash pattern as (dash, gap) lengths, when set
    pub fn dash_pattern(&self) -> Option<(f32, f32)> {
        let text = self.attributes.get("stroke-dasharray")?.to_string();
        let mut parts = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(|s| s.parse::<f32>().ok());
        let dash = parts.next()?;
        Some((dash, parts.next().unwrap_or(dash)))
    }
}

#[derive(Debug, Clone)]
pub struct Surface {
    size: Vec2,
    matrix: ScreenMatrix,
    elements: Vec<Element>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(vec2(800.0, 600.0))
    }
}

impl Surface {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            matrix: ScreenMatrix::default(),
            elements: Vec::new(),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Surface → screen matrix as of the last frame
    pub fn screen_matrix(&self) -> ScreenMatrix {
        self.matrix
    }

    pub fn set_screen_matrix(&mut self, matrix: ScreenMatrix) {
        self.matrix = matrix;
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Permanent shape elements in z-order
    pub fn shape_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| !e.key.is_overlay())
    }

    pub fn element(&self, key: ElementKey) -> Option<&Element> {
        self.elements.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: ElementKey) -> bool {
        self.element(key).is_some()
    }

    fn element_mut(&mut self, key: ElementKey) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.key == key)
    }

    /// Insert or replace an element. New shapes go above every shape but below the overlays.
    pub fn upsert(&mut self, element: Element) {
        if let Some(existing) = self.element_mut(element.key) {
            *existing = element;
            return;
        }
        let index = if element.key.is_overlay() {
            self.elements.len()
        } else {
            self.elements
                .iter()
                .position(|e| e.key.is_overlay())
                .unwrap_or(self.elements.len())
        };
        self.elements.insert(index, element);
    }

    /// Draw (or redraw) a stored shape as a permanent element
    pub fn render_shape(&mut self, shape: &Shape) -> ElementKey {
        let key = ElementKey::Shape(shape.id);
        let mut attributes = shape.attributes();
        attributes.remove("transform");
        let mut element = Element::new(key, shape.kind(), attributes);
        element.transform = ShapeTransform::from_stored(shape.transform.as_deref());
        self.upsert(element);
        key
    }

    /// Replace every permanent element with the given shapes, keeping overlays
    pub fn render_all<'a>(&mut self, shapes: impl IntoIterator<Item = &'a Shape>) {
        self.elements.retain(|e| e.key.is_overlay());
        for shape in shapes {
            self.render_shape(shape);
        }
    }

    /// Overwrite the named attributes of an element; returns false when the element is absent
    pub fn set_attributes(&mut self, key: ElementKey, attributes: Attributes) -> bool {
        match self.element_mut(key) {
            Some(element) => {
                element.attributes.merge(attributes);
                true
            }
            None => false,
        }
    }

    pub fn set_transform(&mut self, key: ElementKey, transform: ShapeTransform) -> bool {
        match self.element_mut(key) {
            Some(element) => {
                element.transform = transform;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: ElementKey) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.key == key)?;
        Some(self.elements.remove(index))
    }

    /// Wipe every element, overlays included
    pub fn clear(&mut self) {
        debug!("Clearing {} surface elements", self.elements.len());
        self.elements.clear();
    }

    /// Topmost hit-testable element under a surface position.
    ///
    /// The preview and the selection outline never take hits.
    pub fn hit_test(&self, pos: Pos2, tolerance: f32) -> Option<ElementKey> {
        self.elements
            .iter()
            .rev()
            .filter(|e| !matches!(e.key, ElementKey::Preview | ElementKey::SelectionBox))
            .find(|e| {
                let Ok(geometry) = e.geometry() else {
                    return false;
                };
                let local = e.transform.invert(pos, geometry.bounds().center());
                geometry.contains(local, tolerance + e.stroke_width() / 2.0)
            })
            .map(|e| e.key)
    }

    /// Axis-aligned bounds of the transformed element, in surface coordinates
    pub fn bounding_box(&self, key: ElementKey) -> Option<Rect> {
        let element = self.element(key)?;
        let outline = element.transformed_outline();
        if outline.is_empty() {
            return None;
        }
        Some(Rect::from_points(&outline))
    }

    /// [`Self::bounding_box`] mapped onto the screen
    pub fn screen_bounding_box(&self, key: ElementKey) -> Option<Rect> {
        self.bounding_box(key)
            .map(|rect| self.matrix.rect_to_viewport(rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn rect_shape(id: ShapeId, x: f32) -> Shape {
        Shape::new(id, Geometry::Rectangle { x, y: 0.0, width: 10.0, height: 10.0 })
    }

    #[test]
    fn shapes_stay_below_overlays() {
        let mut surface = Surface::default();
        surface.render_shape(&rect_shape(1, 0.0));
        surface.upsert(Element::new(ElementKey::Preview, ShapeKind::Circle, Attributes::new()));
        surface.render_shape(&rect_shape(2, 0.0));

        let keys: Vec<_> = surface.elements().iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![ElementKey::Shape(1), ElementKey::Shape(2), ElementKey::Preview]
        );
    }

    #[test]
    fn hit_test_returns_topmost() {
        let mut surface = Surface::default();
        surface.render_shape(&rect_shape(1, 0.0));
        surface.render_shape(&rect_shape(2, 5.0));

        assert_eq!(surface.hit_test(pos2(7.0, 5.0), 0.0), Some(ElementKey::Shape(2)));
        assert_eq!(surface.hit_test(pos2(2.0, 5.0), 0.0), Some(ElementKey::Shape(1)));
        assert_eq!(surface.hit_test(pos2(50.0, 50.0), 0.0), None);
    }

    #[test]
    fn transform_moves_hits_and_bounds() {
        let mut surface = Surface::default();
        let mut shape = rect_shape(1, 0.0);
        shape.transform = Some("translate(100, 0)".into());
        surface.render_shape(&shape);

        assert_eq!(surface.hit_test(pos2(5.0, 5.0), 0.0), None);
        assert_eq!(surface.hit_test(pos2(105.0, 5.0), 0.0), Some(ElementKey::Shape(1)));
        assert_eq!(
            surface.bounding_box(ElementKey::Shape(1)),
            Some(Rect::from_min_max(pos2(100.0, 0.0), pos2(110.0, 10.0)))
        );
    }

    #[test]
    fn rotated_bounds_grow() {
        let mut surface = Surface::default();
        let mut shape = Shape::new(1, Geometry::Rectangle { x: 0.0, y: 0.0, width: 20.0, height: 10.0 });
        shape.transform = Some("rotate(90)".into());
        surface.render_shape(&shape);

        let bounds = surface.bounding_box(ElementKey::Shape(1)).unwrap();
        assert!((bounds.width() - 10.0).abs() < 1e-3);
        assert!((bounds.height() - 20.0).abs() < 1e-3);
        assert!((bounds.center() - pos2(10.0, 5.0)).length() < 1e-3);
    }

    #[test]
    fn rerender_keeps_position_in_z_order() {
        let mut surface = Surface::default();
        surface.render_shape(&rect_shape(1, 0.0));
        surface.render_shape(&rect_shape(2, 0.0));

        let mut moved = rect_shape(1, 0.0);
        moved.style.fill = "red".into();
        surface.render_shape(&moved);

        assert_eq!(surface.elements()[0].key, ElementKey::Shape(1));
        assert_eq!(surface.elements()[0].attributes.text("fill"), Some("red"));
    }

    #[test]
    fn reads_dash_pattern() {
        let mut attrs = Attributes::new();
        attrs.set("stroke-dasharray", "5,5");
        let element = Element::new(ElementKey::Preview, ShapeKind::Line, attrs);
        assert_eq!(element.dash_pattern(), Some((5.0, 5.0)));
    }
}
