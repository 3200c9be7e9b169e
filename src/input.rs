use egui::{Context, PointerButton, Pos2, Rect};

/// Primary-button pointer event in viewport (screen) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up(Pos2),
}

/// Turns raw egui input into the pointer events the editor consumes.
///
/// Presses only count inside the canvas and away from floating windows such as the style
/// toolbar. Once a press is accepted, moves and the release are delivered wherever they happen.
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
    pressed: bool,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
            pressed: false,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn process_input(&mut self, ctx: &Context) -> Vec<PointerEvent> {
        let over_window = ctx.is_pointer_over_area();
        let mut events = Vec::new();

        ctx.input(|input| {
            let pointer = &input.pointer;
            let pos = pointer.latest_pos();

            if let Some(pos) = pos {
                if Some(pos) != self.last_pointer_pos
                    && (self.pressed || self.canvas_rect.contains(pos))
                {
                    events.push(PointerEvent::Move(pos));
                }
                self.last_pointer_pos = Some(pos);
            }

            if pointer.button_pressed(PointerButton::Primary) {
                if let Some(pos) = pointer.interact_pos() {
                    if self.canvas_rect.contains(pos) && !over_window {
                        self.pressed = true;
                        events.push(PointerEvent::Down(pos));
                    }
                }
            }

            if pointer.button_released(PointerButton::Primary) {
                let pos = pointer.interact_pos().or(self.last_pointer_pos);
                if let Some(pos) = pos {
                    // Click-move-click drawing needs releases that follow canvas presses
                    if self.pressed || self.canvas_rect.contains(pos) && !over_window {
                        events.push(PointerEvent::Up(pos));
                    }
                }
                self.pressed = false;
            }
        });

        events
    }
}
