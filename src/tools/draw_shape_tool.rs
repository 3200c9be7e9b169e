use egui::Pos2;
use log::{debug, info};

use super::{Gesture, GestureStatus, Workspace};
use crate::error::{EditorResult, ShapeError};
use crate::shape::{Attributes, DragInput, Geometry, Shape, ShapeId, ShapeKind};
use crate::surface::{Element, ElementKey};

#[derive(Clone, Copy, PartialEq)]
pub enum DrawShapeState {
    /// A shape type is chosen; waiting for the first press
    Arming { kind: ShapeKind },
    /// The preview follows the pointer
    Dragging {
        kind: ShapeKind,
        start: Pos2,
        end: Pos2,
        moved: bool,
    },
    /// The shape has been stored; the gesture is about to be dropped
    Committed { kind: ShapeKind, id: ShapeId },
}

impl std::fmt::Debug for DrawShapeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arming { kind } => write!(f, "Arming({kind})"),
            Self::Dragging { kind, start, end, .. } => f
                .debug_struct("Dragging")
                .field("kind", kind)
                .field("start", start)
                .field("end", end)
                .finish_non_exhaustive(),
            Self::Committed { kind, id } => write!(f, "Committed({kind} {id})"),
        }
    }
}

/// Drag-to-draw gesture for a single shape
#[derive(Debug, Clone)]
pub struct DrawShapeTool {
    state: DrawShapeState,
    preview_style: Attributes,
}

impl DrawShapeTool {
    /// Arm the tool for `kind`. Kinds without a drag derivation are rejected up front.
    pub fn arm(kind: ShapeKind, preview_style: Attributes) -> Result<Self, ShapeError> {
        if !kind.is_drawable() {
            return Err(ShapeError::UnsupportedKind(kind));
        }
        debug!("Armed draw tool for {kind}");
        Ok(Self {
            state: DrawShapeState::Arming { kind },
            preview_style,
        })
    }

    pub fn state(&self) -> &DrawShapeState {
        &self.state
    }

    pub fn kind(&self) -> ShapeKind {
        match &self.state {
            DrawShapeState::Arming { kind }
            | DrawShapeState::Dragging { kind, .. }
            | DrawShapeState::Committed { kind, .. } => *kind,
        }
    }

    pub fn current_state_name(&self) -> &'static str {
        match self.state {
            DrawShapeState::Arming { .. } => "Arming",
            DrawShapeState::Dragging { .. } => "Dragging",
            DrawShapeState::Committed { .. } => "Committed",
        }
    }

    /// Full preview attribute set for the drag `start → end`; nothing is touched on error
    fn preview_attributes(
        &self,
        kind: ShapeKind,
        start: Pos2,
        end: Pos2,
    ) -> Result<Attributes, ShapeError> {
        let geometry = Geometry::from_drag(kind, &DragInput::between(start, end))?;
        let mut attrs = geometry.attributes();
        attrs.merge(self.preview_style.clone());
        Ok(attrs)
    }

    fn commit(
        &mut self,
        kind: ShapeKind,
        start: Pos2,
        end: Pos2,
        ws: &mut Workspace<'_>,
    ) -> EditorResult<ShapeId> {
        let attrs = self.preview_attributes(kind, start, end)?;
        ws.surface.set_attributes(ElementKey::Preview, attrs);

        let preview = ws
            .surface
            .element(ElementKey::Preview)
            .map(|element| element.attributes.select(kind.geometry_fields()))
            .unwrap_or_default();
        let geometry = Geometry::from_attributes(kind, &preview)?;

        let shape = Shape::new(ws.store.next_id()?, geometry);
        ws.store.append(shape.clone())?;
        ws.surface.remove(ElementKey::Preview);
        ws.surface.render_shape(&shape);

        info!("Committed {} {}", kind, shape.id);
        self.state = DrawShapeState::Committed { kind, id: shape.id };
        Ok(shape.id)
    }
}

impl Gesture for DrawShapeTool {
    fn name(&self) -> &'static str {
        "DrawShape"
    }

    fn on_pointer_down(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        let DrawShapeState::Arming { kind } = self.state else {
            // Second press of a click-move-click draw
            return Ok(GestureStatus::Active);
        };

        let attrs = self.preview_attributes(kind, pos, pos)?;
        ws.surface.upsert(Element::new(ElementKey::Preview, kind, attrs));
        self.state = DrawShapeState::Dragging {
            kind,
            start: pos,
            end: pos,
            moved: false,
        };
        Ok(GestureStatus::Active)
    }

    fn on_pointer_move(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        let DrawShapeState::Dragging { kind, start, .. } = self.state else {
            return Ok(GestureStatus::Active);
        };

        let attrs = self.preview_attributes(kind, start, pos)?;
        ws.surface.set_attributes(ElementKey::Preview, attrs);
        self.state = DrawShapeState::Dragging {
            kind,
            start,
            end: pos,
            moved: pos != start,
        };
        Ok(GestureStatus::Active)
    }

    fn on_pointer_up(&mut self, pos: Pos2, ws: &mut Workspace<'_>) -> EditorResult<GestureStatus> {
        let DrawShapeState::Dragging { kind, start, moved, .. } = self.state else {
            return Ok(GestureStatus::Active);
        };
        if !moved && pos == start {
            // Released without moving: keep dragging until the next release
            return Ok(GestureStatus::Active);
        }

        self.commit(kind, start, pos, ws)?;
        Ok(GestureStatus::Finished)
    }

    fn cancel(&mut self, ws: &mut Workspace<'_>) {
        if ws.surface.remove(ElementKey::Preview).is_some() {
            debug!("Discarded {} preview", self.kind());
        }
    }
}
