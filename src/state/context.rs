//! The editing session for one open document.
//!
//! `EditorContext` owns the store, the surface, the selection and the single active-gesture
//! slot. It is the only entry point the UI shell talks to. Pointer positions arrive in viewport
//! coordinates and are mapped onto the surface on every call.
//!
//! # Example
//!
//! ```rust
//! use eframe_shapes::{EditorConfig, EditorContext, MemoryStorage, ShapeKind};
//! use egui::pos2;
//!
//! let mut ctx = EditorContext::new(EditorConfig::default(), Box::new(MemoryStorage::new()));
//! ctx.choose_shape(ShapeKind::Rectangle).unwrap();
//! ctx.pointer_down(pos2(10.0, 10.0)).unwrap();
//! ctx.pointer_move(pos2(110.0, 60.0)).unwrap();
//! ctx.pointer_up(pos2(110.0, 60.0)).unwrap();
//! assert_eq!(ctx.store().len(), 1);
//! ```

use egui::{Pos2, Vec2};
use log::{debug, info, warn};

use crate::config::EditorConfig;
use crate::coords::ScreenMatrix;
use crate::error::{EditorResult, ExportError};
use crate::export::{self, RasterFormat};
use crate::gizmo::EditGizmo;
use crate::input::PointerEvent;
use crate::shape::{FieldUpdate, ShapeId, ShapeKind};
use crate::storage::KeyValueStorage;
use crate::store::ShapeStore;
use crate::surface::{ElementKey, Surface};
use crate::tools::{
    ActiveGesture, DrawShapeTool, Gesture, GestureStatus, MoveGesture, RotateGesture,
    SelectionTool, StyleValues, Workspace,
};

pub struct EditorContext {
    config: EditorConfig,
    store: ShapeStore,
    surface: Surface,
    gizmo: EditGizmo,
    selection: SelectionTool,
    gesture: Option<ActiveGesture>,
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("store", &self.store)
            .field("selection", &self.selection.selected())
            .field("gesture", &self.gesture.as_ref().map(|g| g.current_state_name()))
            .finish_non_exhaustive()
    }
}

impl EditorContext {
    /// Load the document from `storage` and render it
    pub fn new(config: EditorConfig, storage: Box<dyn KeyValueStorage>) -> Self {
        let store = ShapeStore::load(storage, config.storage_key.clone());
        let mut surface = Surface::new(config.surface_size);
        surface.render_all(store.shapes());
        Self {
            gizmo: EditGizmo::new(&config),
            config,
            store,
            surface,
            selection: SelectionTool::new(),
            gesture: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selection.selected()
    }

    pub fn active_gesture(&self) -> Option<&ActiveGesture> {
        self.gesture.as_ref()
    }

    /// Name of the current interaction state, for display
    pub fn current_state_name(&self) -> &'static str {
        self.gesture
            .as_ref()
            .map_or("Idle", ActiveGesture::current_state_name)
    }

    /// Kind the draw gesture is armed with, if one is active
    pub fn armed_kind(&self) -> Option<ShapeKind> {
        self.gesture.as_ref().and_then(ActiveGesture::as_draw).map(DrawShapeTool::kind)
    }

    pub fn set_screen_matrix(&mut self, matrix: ScreenMatrix) {
        self.surface.set_screen_matrix(matrix);
    }

    /// Resize the drawing surface, e.g. to follow the visible canvas. Exports use this size.
    pub fn set_surface_size(&mut self, size: Vec2) {
        if size != self.surface.size() {
            debug!("Surface resized to {}x{}", size.x, size.y);
            self.surface.set_size(size);
        }
    }

    /// Viewport → surface, using the matrix as it is right now
    pub fn to_surface(&self, viewport: Pos2) -> Pos2 {
        self.surface.screen_matrix().to_surface(viewport)
    }

    fn split(&mut self) -> (&mut Option<ActiveGesture>, &mut SelectionTool, Workspace<'_>) {
        (
            &mut self.gesture,
            &mut self.selection,
            Workspace {
                store: &mut self.store,
                surface: &mut self.surface,
                gizmo: &self.gizmo,
            },
        )
    }

    /// Install a new gesture. Any gesture still active is torn down first.
    fn begin_gesture(&mut self, gesture: ActiveGesture) {
        self.cancel_gesture();
        debug!("Gesture {} started", gesture.name());
        self.gesture = Some(gesture);
    }

    /// Tear down the active gesture without committing it
    pub fn cancel_gesture(&mut self) {
        let (slot, _, mut ws) = self.split();
        if let Some(mut gesture) = slot.take() {
            warn!("Cancelling unfinished {} gesture", gesture.name());
            gesture.cancel(&mut ws);
        }
    }

    /// Arm the draw gesture for `kind`
    pub fn choose_shape(&mut self, kind: ShapeKind) -> EditorResult<()> {
        let tool = DrawShapeTool::arm(kind, self.config.preview.attributes())?;
        let (_, selection, ws) = self.split();
        selection.deselect(ws.surface, ws.gizmo);
        self.begin_gesture(ActiveGesture::Draw(tool));
        info!("Chose shape type {kind}");
        Ok(())
    }

    pub fn handle_event(&mut self, event: PointerEvent) -> EditorResult<()> {
        match event {
            PointerEvent::Down(pos) => self.pointer_down(pos),
            PointerEvent::Move(pos) => self.pointer_move(pos),
            PointerEvent::Up(pos) => self.pointer_up(pos),
        }
    }

    /// Route a handler result from the active gesture. A finished or failed gesture is dropped
    /// and failed ones are torn down first.
    fn route(
        &mut self,
        handler: impl FnOnce(&mut ActiveGesture, &mut Workspace<'_>) -> EditorResult<GestureStatus>,
        abort_on_error: bool,
    ) -> EditorResult<()> {
        let (slot, _, mut ws) = self.split();
        let Some(gesture) = slot.as_mut() else {
            return Ok(());
        };
        match handler(gesture, &mut ws) {
            Ok(GestureStatus::Active) => Ok(()),
            Ok(GestureStatus::Finished) => {
                debug!("Gesture {} finished", gesture.name());
                *slot = None;
                Ok(())
            }
            Err(err) => {
                if abort_on_error {
                    gesture.cancel(&mut ws);
                    *slot = None;
                }
                Err(err)
            }
        }
    }

    pub fn pointer_down(&mut self, viewport: Pos2) -> EditorResult<()> {
        let pos = self.to_surface(viewport);
        if self.gesture.is_some() {
            return self.route(|g, ws| g.on_pointer_down(pos, ws), false);
        }

        let tolerance = self.config.hit_tolerance / self.surface.screen_matrix().a.abs().max(f32::EPSILON);
        match self.surface.hit_test(pos, tolerance) {
            Some(ElementKey::RotateHandle) => {
                let Some(id) = self.selection.selected() else {
                    return Ok(());
                };
                let gesture = RotateGesture::begin(id, pos, &self.surface)?;
                self.begin_gesture(ActiveGesture::Rotate(gesture));
            }
            Some(ElementKey::Shape(id)) => {
                self.select(id)?;
                let gesture = MoveGesture::begin(id, pos, &self.surface)?;
                self.begin_gesture(ActiveGesture::Move(gesture));
            }
            _ => self.deselect(),
        }
        Ok(())
    }

    /// A failed preview update leaves the preview and the gesture as they were
    pub fn pointer_move(&mut self, viewport: Pos2) -> EditorResult<()> {
        let pos = self.to_surface(viewport);
        self.route(|g, ws| g.on_pointer_move(pos, ws), false)
    }

    pub fn pointer_up(&mut self, viewport: Pos2) -> EditorResult<()> {
        let pos = self.to_surface(viewport);
        self.route(|g, ws| g.on_pointer_up(pos, ws), true)
    }

    /// Select the shape with `id`, returning the values to initialise the toolbar with
    pub fn select(&mut self, id: ShapeId) -> EditorResult<StyleValues> {
        let (_, selection, mut ws) = self.split();
        selection.select(id, &mut ws)
    }

    pub fn deselect(&mut self) {
        let (_, selection, ws) = self.split();
        selection.deselect(ws.surface, ws.gizmo);
    }

    /// Current style of the selected shape
    pub fn selected_style(&self) -> Option<StyleValues> {
        let shape = self.store.get(self.selection.selected()?)?;
        Some(StyleValues {
            fill: shape.style.fill.clone(),
            stroke: shape.style.stroke.clone(),
            stroke_width: shape.style.stroke_width,
        })
    }

    fn restyle(&mut self, update: FieldUpdate) -> EditorResult<()> {
        let (_, selection, mut ws) = self.split();
        selection.restyle(update, &mut ws)
    }

    pub fn set_fill(&mut self, fill: impl Into<String>) -> EditorResult<()> {
        self.restyle(FieldUpdate::Fill(fill.into()))
    }

    pub fn set_stroke(&mut self, stroke: impl Into<String>) -> EditorResult<()> {
        self.restyle(FieldUpdate::Stroke(stroke.into()))
    }

    pub fn set_stroke_width(&mut self, width: f32) -> EditorResult<()> {
        self.restyle(FieldUpdate::StrokeWidth(width))
    }

    pub fn delete_selected(&mut self) -> EditorResult<ShapeId> {
        self.cancel_gesture();
        let (_, selection, mut ws) = self.split();
        selection.delete(&mut ws)
    }

    /// Remove the most recent shape and re-render the rest. Undoing an empty document does
    /// nothing.
    pub fn undo(&mut self) -> EditorResult<Option<ShapeId>> {
        self.cancel_gesture();
        let Some(shape) = self.store.pop()? else {
            debug!("Nothing to undo");
            return Ok(None);
        };

        self.surface.render_all(self.store.shapes());
        let (_, selection, ws) = self.split();
        selection.forget_missing(ws.store);
        match selection.selected() {
            Some(id) => {
                ws.gizmo.sync(ws.surface, id);
            }
            None => ws.gizmo.hide(ws.surface),
        }
        info!("Undid shape {}", shape.id);
        Ok(Some(shape.id))
    }

    /// Empty the document, its storage entry and the surface
    pub fn clear(&mut self) -> EditorResult<()> {
        self.cancel_gesture();
        self.deselect();
        self.store.clear()?;
        self.surface.clear();
        Ok(())
    }

    /// Re-read the document from storage, dropping all transient state
    pub fn reload(&mut self, storage: Box<dyn KeyValueStorage>) {
        self.cancel_gesture();
        self.deselect();
        self.store = ShapeStore::load(storage, self.config.storage_key.clone());
        self.surface.clear();
        self.surface.render_all(self.store.shapes());
    }

    /// Screen position for the style toolbar of the selected shape
    pub fn toolbar_anchor(&self) -> Option<Pos2> {
        self.gizmo.toolbar_anchor(&self.surface, self.selection.selected()?)
    }

    pub fn export_svg(&self) -> Vec<u8> {
        export::export_vector(&self.surface)
    }

    pub fn export_raster(&self, format: RasterFormat) -> Result<Vec<u8>, ExportError> {
        export::export_raster(&self.surface, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EditorError, ShapeError};
    use crate::storage::MemoryStorage;
    use egui::pos2;

    fn context() -> EditorContext {
        EditorContext::new(EditorConfig::default(), Box::new(MemoryStorage::new()))
    }

    fn draw(ctx: &mut EditorContext, kind: ShapeKind, from: Pos2, to: Pos2) {
        ctx.choose_shape(kind).unwrap();
        ctx.pointer_down(from).unwrap();
        ctx.pointer_move(to).unwrap();
        ctx.pointer_up(to).unwrap();
    }

    #[test]
    fn draw_returns_to_idle() {
        let mut ctx = context();
        draw(&mut ctx, ShapeKind::Rectangle, pos2(10.0, 10.0), pos2(110.0, 60.0));

        assert!(ctx.active_gesture().is_none());
        assert_eq!(ctx.current_state_name(), "Idle");
        assert!(ctx.surface().contains(ElementKey::Shape(1)));
    }

    #[test]
    fn choosing_text_changes_nothing() {
        let mut ctx = context();
        ctx.choose_shape(ShapeKind::Circle).unwrap();

        let err = ctx.choose_shape(ShapeKind::Text).unwrap_err();

        assert!(matches!(err, EditorError::Shape(ShapeError::UnsupportedKind(ShapeKind::Text))));
        assert_eq!(ctx.armed_kind(), Some(ShapeKind::Circle));
    }

    #[test]
    fn choosing_again_cancels_the_running_draw() {
        let mut ctx = context();
        ctx.choose_shape(ShapeKind::Rectangle).unwrap();
        ctx.pointer_down(pos2(0.0, 0.0)).unwrap();
        ctx.pointer_move(pos2(20.0, 20.0)).unwrap();

        ctx.choose_shape(ShapeKind::Line).unwrap();

        assert!(!ctx.surface().contains(ElementKey::Preview));
        assert!(ctx.store().is_empty());
        assert_eq!(ctx.armed_kind(), Some(ShapeKind::Line));
    }

    #[test]
    fn press_on_shape_selects_and_drags() {
        let mut ctx = context();
        draw(&mut ctx, ShapeKind::Rectangle, pos2(0.0, 0.0), pos2(20.0, 20.0));

        ctx.pointer_down(pos2(10.0, 10.0)).unwrap();
        assert_eq!(ctx.selected(), Some(1));
        assert_eq!(ctx.current_state_name(), "Moving");

        ctx.pointer_move(pos2(40.0, 10.0)).unwrap();
        ctx.pointer_up(pos2(40.0, 10.0)).unwrap();

        assert_eq!(ctx.store().get(1).unwrap().transform.as_deref(), Some("translate(30, 0)"));
        // Toolbar follows the moved shape
        assert_eq!(ctx.toolbar_anchor(), Some(pos2(30.0, -100.0)));
    }

    #[test]
    fn press_on_background_deselects() {
        let mut ctx = context();
        draw(&mut ctx, ShapeKind::Rectangle, pos2(0.0, 0.0), pos2(20.0, 20.0));
        ctx.select(1).unwrap();

        ctx.pointer_down(pos2(300.0, 300.0)).unwrap();

        assert_eq!(ctx.selected(), None);
        assert!(!ctx.surface().contains(ElementKey::RotateHandle));
        assert_eq!(ctx.toolbar_anchor(), None);
    }

    #[test]
    fn rotate_from_the_handle() {
        let mut ctx = context();
        draw(&mut ctx, ShapeKind::Rectangle, pos2(0.0, 0.0), pos2(20.0, 20.0));
        ctx.select(1).unwrap();

        // Handle sits on the bottom-right corner (20, 20); centre is (10, 10)
        ctx.pointer_down(pos2(20.0, 20.0)).unwrap();
        assert_eq!(ctx.current_state_name(), "Rotating");
        ctx.pointer_move(pos2(0.0, 20.0)).unwrap();
        ctx.pointer_up(pos2(0.0, 20.0)).unwrap();

        assert_eq!(ctx.store().get(1).unwrap().transform.as_deref(), Some("rotate(270)"));
    }

    #[test]
    fn pointer_positions_go_through_the_screen_matrix() {
        let mut ctx = context();
        ctx.set_screen_matrix(ScreenMatrix::from_view(pos2(100.0, 100.0), 2.0));
        draw(&mut ctx, ShapeKind::Line, pos2(100.0, 100.0), pos2(120.0, 140.0));

        let shape = ctx.store().get(1).unwrap();
        assert_eq!(shape.geometry, crate::shape::Geometry::Line { x1: 0.0, y1: 0.0, x2: 10.0, y2: 20.0 });
    }

    #[test]
    fn undo_and_delete_clear_the_selection() {
        let mut ctx = context();
        draw(&mut ctx, ShapeKind::Circle, pos2(50.0, 50.0), pos2(60.0, 50.0));
        draw(&mut ctx, ShapeKind::Circle, pos2(150.0, 50.0), pos2(160.0, 50.0));
        ctx.select(2).unwrap();

        assert_eq!(ctx.undo().unwrap(), Some(2));
        assert_eq!(ctx.selected(), None);
        assert!(!ctx.surface().contains(ElementKey::SelectionBox));

        ctx.select(1).unwrap();
        assert_eq!(ctx.delete_selected().unwrap(), 1);
        assert!(ctx.store().is_empty());
        assert_eq!(ctx.undo().unwrap(), None);
        assert!(matches!(ctx.delete_selected(), Err(EditorError::NoSelection)));
    }

    #[test]
    fn exports_follow_the_visible_surface_size() {
        let mut ctx = context();
        ctx.set_surface_size(egui::vec2(320.0, 200.0));

        let svg = String::from_utf8(ctx.export_svg()).unwrap();
        assert!(svg.contains(r#"width="320" height="200" viewBox="0 0 320 200""#));
        let png = ctx.export_raster(RasterFormat::Png).unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!((image.width(), image.height()), (320, 200));
    }
}
