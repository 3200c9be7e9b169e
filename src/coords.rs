use egui::{Pos2, Rect, Vec2, pos2};
use log::warn;

/// Current surface → screen matrix, laid out like an SVG screen CTM.
///
/// Only scale (`a`, `d`) and offset (`e`, `f`) are honoured when mapping; the surface is never
/// skewed or rotated on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMatrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for ScreenMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ScreenMatrix {
    pub const IDENTITY: ScreenMatrix = ScreenMatrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Matrix for a surface drawn at `origin` (screen space) with uniform `zoom`
    pub fn from_view(origin: Pos2, zoom: f32) -> Self {
        Self {
            a: zoom,
            d: zoom,
            e: origin.x,
            f: origin.y,
            ..Self::IDENTITY
        }
    }

    fn scale(&self) -> Vec2 {
        if self.a == 0.0 || self.d == 0.0 {
            warn!("Degenerate screen matrix {:?}, assuming unit scale", self);
            return Vec2::splat(1.0);
        }
        Vec2::new(self.a, self.d)
    }

    /// Viewport (screen) position → surface position
    pub fn to_surface(&self, viewport: Pos2) -> Pos2 {
        let scale = self.scale();
        pos2((viewport.x - self.e) / scale.x, (viewport.y - self.f) / scale.y)
    }

    /// Surface position → viewport (screen) position
    pub fn to_viewport(&self, surface: Pos2) -> Pos2 {
        let scale = self.scale();
        pos2(surface.x * scale.x + self.e, surface.y * scale.y + self.f)
    }

    /// Map a surface rectangle onto the screen
    pub fn rect_to_viewport(&self, rect: Rect) -> Rect {
        Rect::from_two_pos(self.to_viewport(rect.min), self.to_viewport(rect.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_scale_and_offset() {
        let matrix = ScreenMatrix::from_view(pos2(100.0, 50.0), 2.0);
        assert_eq!(matrix.to_surface(pos2(120.0, 70.0)), pos2(10.0, 10.0));
        assert_eq!(matrix.to_viewport(pos2(10.0, 10.0)), pos2(120.0, 70.0));
    }

    #[test]
    fn degenerate_scale_falls_back_to_offset_only() {
        let matrix = ScreenMatrix { a: 0.0, ..ScreenMatrix::from_view(pos2(5.0, 5.0), 1.0) };
        assert_eq!(matrix.to_surface(pos2(15.0, 25.0)), pos2(10.0, 20.0));
    }
}
