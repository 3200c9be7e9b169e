use egui::{Pos2, Vec2};
use log::{debug, info};

use super::{Gesture, GestureStatus, Workspace};
use crate::error::{EditorError, EditorResult, StoreError};
use crate::gizmo::EditGizmo;
use crate::shape::{AttrValue, Attributes, FieldUpdate, ShapeId};
use crate::store::ShapeStore;
use crate::surface::{ElementKey, Surface};
use crate::transform::{ShapeTransform, normalize_degrees};

/// Style values the toolbar is initialised from
#[derive(Debug, Clone, PartialEq)]
pub struct StyleValues {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f32,
}

/// Owner of the current selection and the restyle/delete operations on it
#[derive(Debug, Clone, Default)]
pub struct SelectionTool {
    selected: Option<ShapeId>,
}

impl SelectionTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    fn require_selection(&self) -> EditorResult<ShapeId> {
        self.selected.ok_or(EditorError::NoSelection)
    }

    /// Make `id` the current shape, replacing any prior selection, and show its affordances
    pub fn select(&mut self, id: ShapeId, ws: &mut Workspace<'_>) -> EditorResult<StyleValues> {
        let shape = ws.store.get(id).ok_or(StoreError::NotFound(id))?;
        let style = StyleValues {
            fill: shape.style.fill.clone(),
            stroke: shape.style.stroke.clone(),
            stroke_width: shape.style.stroke_width,
        };
        if let Some(previous) = self.selected.replace(id).filter(|prev| *prev != id) {
            debug!("Deselected shape {previous}");
        }
        ws.gizmo.sync(ws.surface, id);
        info!("Selected shape {id}");
        Ok(style)
    }

    pub fn deselect(&mut self, surface: &mut Surface, gizmo: &EditGizmo) {
        if let Some(id) = self.selected.take() {
            debug!("Deselected shape {id}");
        }
        gizmo.hide(surface);
    }

    /// Apply a style change to the live element and write it through to the store
    pub fn restyle(&mut self, update: FieldUpdate, ws: &mut Workspace<'_>) -> EditorResult<()> {
        let id = self.require_selection()?;
        let name = update.name();
        let value = match &update {
            FieldUpdate::Fill(value) | FieldUpdate::Stroke(value) => {
                Some(AttrValue::Text(value.clone()))
            }
            FieldUpdate::StrokeWidth(width) => Some(AttrValue::Number(*width)),
            FieldUpdate::Transform(_) => None,
        };
        let shape = ws.store.update_field(id, update)?;
        let transform = ShapeTransform::from_stored(shape.transform.as_deref());

        match value {
            Some(value) => {
                let mut attrs = Attributes::new();
                attrs.set(name, value);
                ws.surface.set_attributes(ElementKey::Shape(id), attrs);
            }
            None => {
                ws.surface.set_transform(ElementKey::Shape(id), transform);
                ws.gizmo.sync(ws.surface, id);
            }
        }
        Ok(())
    }

    /// Remove the selected shape from the store and the surface and hide every affordance
    pub fn delete(&mut self, ws: &mut Workspace<'_>) -> EditorResult<ShapeId> {
        let id = self.require_selection()?;
        ws.store.remove_by_id(id)?;
        ws.surface.remove(ElementKey::Shape(id));
        self.deselect(ws.surface, ws.gizmo);
        info!("Deleted shape {id}");
        Ok(id)
    }

    /// Forget a selection whose shape no longer exists
    pub fn forget_missing(&mut self, store: &ShapeStore) {
        if self.selected.is_some_and(|id| store.get(id).is_none()) {
            self.selected = None;
        }
    }
}

/// Write a finished transform through to the store, skipping unchanged ones
fn commit_transform(
    id: ShapeId,
    initial: ShapeTransform,
    current: ShapeTransform,
    store: &mut ShapeStore,
) -> EditorResult<()> {
    if current == initial {
        return Ok(());
    }
    store.update_field(id, FieldUpdate::Transform(current.to_stored()))?;
    debug!("Stored transform of shape {id}: {current}");
    Ok(())
}

fn element_transform(surface: &Surface, id: ShapeId) -> EditorResult<ShapeTransform> {
    surface
        .element(ElementKey::Shape(id))
        .map(|element| element.transform)
        .ok_or_else(|| StoreError::NotFound(id).into())
}

/// Drag of the selected shape. The translate follows the pointer, keeping the offset between
/// the pointer and the shape from the initial press.
#[derive(Debug, Clone)]
pub struct MoveGesture {
    id: ShapeId,
    press: Pos2,
    initial: ShapeTransform,
    current: ShapeTransform,
}

impl MoveGesture {
    pub fn begin(id: ShapeId, press: Pos2, surface: &Surface) -> EditorResult<Self> {
        let initial = element_transform(surface, id)?;
        Ok(Self {
            id,
            press,
            initial,
            current: initial,
        })
    }

    pub fn shape_id(&self) -> ShapeId {
        self.id
    }

    pub fn offset(&self) -> Vec2 {
        self.current.translate - self.initial.translate
    }
}

impl Gesture for MoveGesture {
    fn name(&self) -> &'static str {
        "Move"
    }

    fn on_pointer_down(&mut self, _pos: Pos2, _ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        Ok(GestureStatus::Active)
    }

    fn on_pointer_move(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        self.current = self
            .initial
            .with_translate(self.initial.translate + (pos - self.press));
        ws.surface.set_transform(ElementKey::Shape(self.id), self.current);
        ws.gizmo.sync(ws.surface, self.id);
        Ok(GestureStatus::Active)
    }

    fn on_pointer_up(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        self.on_pointer_move(pos, ws)?;
        commit_transform(self.id, self.initial, self.current, ws.store)?;
        Ok(GestureStatus::Finished)
    }

    fn cancel(&mut self, ws: &mut Workspace<'_>) {
        ws.surface.set_transform(ElementKey::Shape(self.id), self.initial);
        ws.gizmo.sync(ws.surface, self.id);
    }
}

/// Rotation of the selected shape around its centre, driven from the rotation handle
#[derive(Debug, Clone)]
pub struct RotateGesture {
    id: ShapeId,
    center: Pos2,
    initial_angle: f32,
    initial: ShapeTransform,
    current: ShapeTransform,
}

fn pointer_angle(center: Pos2, pos: Pos2) -> f32 {
    (pos.y - center.y).atan2(pos.x - center.x)
}

impl RotateGesture {
    pub fn begin(id: ShapeId, press: Pos2, surface: &Surface) -> EditorResult<Self> {
        let element = surface
            .element(ElementKey::Shape(id))
            .ok_or(StoreError::NotFound(id))?;
        let geometry = element.geometry()?;
        let initial = element.transform;
        // Rotation about the geometry centre leaves it in place; only the translate moves it
        let center = geometry.bounds().center() + initial.translate;
        Ok(Self {
            id,
            center,
            initial_angle: pointer_angle(center, press),
            initial,
            current: initial,
        })
    }

    pub fn rotation(&self) -> f32 {
        self.current.rotate
    }
}

impl Gesture for RotateGesture {
    fn name(&self) -> &'static str {
        "Rotate"
    }

    fn on_pointer_down(&mut self, _pos: Pos2, _ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        Ok(GestureStatus::Active)
    }

    fn on_pointer_move(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        let delta = (pointer_angle(self.center, pos) - self.initial_angle).to_degrees();
        self.current = self
            .initial
            .with_rotate(normalize_degrees(self.initial.rotate - delta));
        ws.surface.set_transform(ElementKey::Shape(self.id), self.current);
        ws.gizmo.sync(ws.surface, self.id);
        Ok(GestureStatus::Active)
    }

    fn on_pointer_up(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        self.on_pointer_move(pos, ws)?;
        commit_transform(self.id, self.initial, self.current, ws.store)?;
        Ok(GestureStatus::Finished)
    }

    fn cancel(&mut self, ws: &mut Workspace<'_>) {
        ws.surface.set_transform(ElementKey::Shape(self.id), self.initial);
        ws.gizmo.sync(ws.surface, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Geometry, Shape};
    use crate::storage::MemoryStorage;
    use egui::{pos2, vec2};

    struct Fixture {
        store: ShapeStore,
        surface: Surface,
        gizmo: EditGizmo,
    }

    impl Fixture {
        fn with_square() -> Self {
            let mut store = ShapeStore::load(Box::new(MemoryStorage::new()), "shapes");
            let shape = Shape::new(1, Geometry::Rectangle { x: 0.0, y: 0.0, width: 20.0, height: 20.0 });
            store.append(shape.clone()).unwrap();
            let mut surface = Surface::default();
            surface.render_shape(&shape);
            Self { store, surface, gizmo: EditGizmo::default() }
        }

        fn ws(&mut self) -> Workspace<'_> {
            Workspace {
                store: &mut self.store,
                surface: &mut self.surface,
                gizmo: &self.gizmo,
            }
        }
    }

    #[test]
    fn select_reports_current_style() {
        let mut fx = Fixture::with_square();
        let mut selection = SelectionTool::new();

        let style = selection.select(1, &mut fx.ws()).unwrap();

        assert_eq!(style.fill, "black");
        assert_eq!(style.stroke_width, 1.0);
        assert!(fx.surface.contains(ElementKey::RotateHandle));
        assert!(matches!(
            selection.select(7, &mut fx.ws()),
            Err(EditorError::Store(StoreError::NotFound(7)))
        ));
    }

    #[test]
    fn restyle_updates_element_and_record() {
        let mut fx = Fixture::with_square();
        let mut selection = SelectionTool::new();
        selection.select(1, &mut fx.ws()).unwrap();

        selection.restyle(FieldUpdate::Stroke("#00ff00".into()), &mut fx.ws()).unwrap();

        assert_eq!(fx.store.get(1).unwrap().style.stroke, "#00ff00");
        let element = fx.surface.element(ElementKey::Shape(1)).unwrap();
        assert_eq!(element.attributes.text("stroke"), Some("#00ff00"));
    }

    #[test]
    fn restyle_without_selection_fails() {
        let mut fx = Fixture::with_square();
        let mut selection = SelectionTool::new();
        assert!(matches!(
            selection.restyle(FieldUpdate::StrokeWidth(3.0), &mut fx.ws()),
            Err(EditorError::NoSelection)
        ));
    }

    #[test]
    fn delete_removes_everything() {
        let mut fx = Fixture::with_square();
        let mut selection = SelectionTool::new();
        selection.select(1, &mut fx.ws()).unwrap();

        assert_eq!(selection.delete(&mut fx.ws()).unwrap(), 1);

        assert!(fx.store.is_empty());
        assert!(fx.surface.elements().is_empty());
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn move_keeps_the_press_offset() {
        let mut fx = Fixture::with_square();
        let mut gesture = MoveGesture::begin(1, pos2(5.0, 5.0), &fx.surface).unwrap();

        gesture.on_pointer_move(pos2(15.0, 25.0), &mut fx.ws()).unwrap();
        assert_eq!(gesture.offset(), vec2(10.0, 20.0));
        // Nothing is stored until release
        assert_eq!(fx.store.get(1).unwrap().transform, None);

        let status = gesture.on_pointer_up(pos2(25.0, 25.0), &mut fx.ws()).unwrap();
        assert_eq!(status, GestureStatus::Finished);
        assert_eq!(fx.store.get(1).unwrap().transform.as_deref(), Some("translate(20, 20)"));
        assert_eq!(
            fx.surface.bounding_box(ElementKey::Shape(1)).unwrap().min,
            pos2(20.0, 20.0)
        );
    }

    #[test]
    fn click_without_drag_stores_nothing() {
        let mut fx = Fixture::with_square();
        let mut gesture = MoveGesture::begin(1, pos2(5.0, 5.0), &fx.surface).unwrap();
        gesture.on_pointer_up(pos2(5.0, 5.0), &mut fx.ws()).unwrap();
        assert_eq!(fx.store.get(1).unwrap().transform, None);
    }

    #[test]
    fn rotate_subtracts_the_pointer_sweep() {
        let mut fx = Fixture::with_square();
        // Centre is (10, 10); press straight to the right of it
        let mut gesture = RotateGesture::begin(1, pos2(20.0, 10.0), &fx.surface).unwrap();

        // Sweep a quarter turn towards +y
        gesture.on_pointer_move(pos2(10.0, 20.0), &mut fx.ws()).unwrap();
        assert!((gesture.rotation() - 270.0).abs() < 1e-3);

        gesture.on_pointer_up(pos2(10.0, 20.0), &mut fx.ws()).unwrap();
        let stored = fx.store.get(1).unwrap().transform.clone().unwrap();
        let parsed = ShapeTransform::parse(&stored);
        assert!((parsed.rotate - 270.0).abs() < 1e-3);
    }

    #[test]
    fn cancel_restores_the_initial_transform() {
        let mut fx = Fixture::with_square();
        let mut gesture = MoveGesture::begin(1, pos2(5.0, 5.0), &fx.surface).unwrap();
        gesture.on_pointer_move(pos2(50.0, 50.0), &mut fx.ws()).unwrap();
        gesture.cancel(&mut fx.ws());

        let element = fx.surface.element(ElementKey::Shape(1)).unwrap();
        assert!(element.transform.is_identity());
        assert!(fx.store.get(1).unwrap().transform.is_none());
    }
}
