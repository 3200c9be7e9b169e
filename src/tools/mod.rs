use egui::Pos2;

use crate::error::EditorResult;
use crate::gizmo::EditGizmo;
use crate::store::ShapeStore;
use crate::surface::Surface;

mod draw_shape_tool;
pub use draw_shape_tool::{DrawShapeState, DrawShapeTool};

mod selection_tool;
pub use selection_tool::{MoveGesture, RotateGesture, SelectionTool, StyleValues};

/// What a gesture handler wants done with the gesture afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStatus {
    /// Keep routing pointer events to this gesture
    Active,
    /// The gesture is over and must be dropped
    Finished,
}

/// Everything a gesture may touch while it runs
pub struct Workspace<'a> {
    pub store: &'a mut ShapeStore,
    pub surface: &'a mut Surface,
    pub gizmo: &'a EditGizmo,
}

/// A pointer gesture. Positions are surface coordinates.
pub trait Gesture {
    fn name(&self) -> &'static str;

    fn on_pointer_down(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus>;

    fn on_pointer_move(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus>;

    fn on_pointer_up(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus>;

    /// Tear the gesture down without committing anything
    fn cancel(&mut self, ws: &mut Workspace<'_>);
}

/// The single gesture allowed to receive pointer events
#[derive(Debug, Clone)]
pub enum ActiveGesture {
    Draw(DrawShapeTool),
    Move(MoveGesture),
    Rotate(RotateGesture),
}

impl Gesture for ActiveGesture {
    fn name(&self) -> &'static str {
        match self {
            Self::Draw(gesture) => gesture.name(),
            Self::Move(gesture) => gesture.name(),
            Self::Rotate(gesture) => gesture.name(),
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        match self {
            Self::Draw(gesture) => gesture.on_pointer_down(pos, ws),
            Self::Move(gesture) => gesture.on_pointer_down(pos, ws),
            Self::Rotate(gesture) => gesture.on_pointer_down(pos, ws),
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        match self {
            Self::Draw(gesture) => gesture.on_pointer_move(pos, ws),
            Self::Move(gesture) => gesture.on_pointer_move(pos, ws),
            Self::Rotate(gesture) => gesture.on_pointer_move(pos, ws),
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        match self {
            Self::Draw(gesture) => gesture.on_pointer_up(pos, ws),
            Self::Move(gesture) => gesture.on_pointer_up(pos, ws),
            Self::Rotate(gesture) => gesture.on_pointer_up(pos, ws),
        }
    }

    fn cancel(&mut self, ws: &mut Workspace<'_>) {
        match self {
            Self::Draw(gesture) => gesture.cancel(ws),
            Self::Move(gesture) => gesture.cancel(ws),
            Self::Rotate(gesture) => gesture.cancel(ws),
        }
    }
}

impl ActiveGesture {
    pub fn as_draw(&self) -> Option<&DrawShapeTool> {
        match self {
            Self::Draw(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn current_state_name(&self) -> &'static str {
        match self {
            Self::Draw(tool) => tool.current_state_name(),
            Self::Move(_) => "Moving",
            Self::Rotate(_) => "Rotating",
        }
    }
}
