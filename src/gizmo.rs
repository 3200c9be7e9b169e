use egui::{Pos2, Rect, pos2};

use crate::config::EditorConfig;
use crate::shape::{Attributes, ShapeId, ShapeKind};
use crate::surface::{Element, ElementKey, Surface};

/// Edit affordance of the selected shape: a dashed outline that turns with the shape and a
/// rotation handle pinned to the bottom-right corner of its on-surface bounding box.
#[derive(Debug, Clone)]
pub struct EditGizmo {
    box_style: Attributes,
    handle_radius: f32,
    toolbar_offset: f32,
}

impl Default for EditGizmo {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EditGizmo {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            box_style: config.preview.attributes(),
            handle_radius: config.handle_radius,
            toolbar_offset: config.toolbar_offset,
        }
    }

    /// Place or refresh the overlays around shape `id`. Returns the shape's bounding box, or
    /// `None` (with the overlays hidden) when the shape has no element.
    pub fn sync(&self, surface: &mut Surface, id: ShapeId) -> Option<Rect> {
        let key = ElementKey::Shape(id);
        let (Some(element), Some(bounds)) = (surface.element(key), surface.bounding_box(key))
        else {
            self.hide(surface);
            return None;
        };
        let Ok(geometry) = element.geometry() else {
            self.hide(surface);
            return None;
        };

        let outline = geometry.bounds();
        let mut attrs = self.box_style.clone();
        attrs.set("x", outline.min.x);
        attrs.set("y", outline.min.y);
        attrs.set("width", outline.width());
        attrs.set("height", outline.height());
        let mut selection_box = Element::new(ElementKey::SelectionBox, ShapeKind::Rectangle, attrs);
        // Same centre as the shape, so the same transform turns the box with it
        selection_box.transform = element.transform;

        let corner = bounds.right_bottom();
        let mut handle_attrs = Attributes::new();
        handle_attrs.set("cx", corner.x);
        handle_attrs.set("cy", corner.y);
        handle_attrs.set("r", self.handle_radius);
        handle_attrs.set("fill", "white");
        handle_attrs.set("stroke", "black");
        handle_attrs.set("stroke-width", 1.0);

        surface.upsert(selection_box);
        surface.upsert(Element::new(ElementKey::RotateHandle, ShapeKind::Circle, handle_attrs));
        Some(bounds)
    }

    pub fn hide(&self, surface: &mut Surface) {
        surface.remove(ElementKey::SelectionBox);
        surface.remove(ElementKey::RotateHandle);
    }

    /// Screen position of the style toolbar's top-left corner, kept above the shape
    pub fn toolbar_anchor(&self, surface: &Surface, id: ShapeId) -> Option<Pos2> {
        let rect = surface.screen_bounding_box(ElementKey::Shape(id))?;
        Some(pos2(rect.left(), rect.top() - self.toolbar_offset))
    }
}
