use egui::epaint::PathShape;
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke};

use crate::color::parse_paint;
use crate::shape::{Geometry, TEXT_FONT_SIZE};
use crate::surface::{Element, Surface};

const PAGE_COLOR: Color32 = Color32::WHITE;
const PAGE_BORDER: Color32 = Color32::from_gray(180);

/// Paints the retained surface with egui
#[derive(Debug, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw every element in z-order, overlays last
    pub fn render(&self, painter: &Painter, surface: &Surface) {
        let matrix = surface.screen_matrix();
        let page = matrix.rect_to_viewport(Rect::from_min_size(Pos2::ZERO, surface.size()));
        painter.rect_filled(page, 0.0, PAGE_COLOR);
        painter.rect_stroke(page, 0.0, Stroke::new(1.0, PAGE_BORDER));

        for element in surface.elements() {
            self.render_element(painter, surface, element);
        }
    }

    fn render_element(&self, painter: &Painter, surface: &Surface, element: &Element) {
        let matrix = surface.screen_matrix();
        let Ok(geometry) = element.geometry() else {
            log::debug!("Skipping element {:?} with unreadable geometry", element.key);
            return;
        };
        let fill = element.attributes.text("fill").and_then(parse_paint);
        let stroke_color = element.attributes.text("stroke").and_then(parse_paint);

        if let Geometry::Text { x, y, text } = &geometry {
            let center = geometry.bounds().center();
            let anchor = matrix.to_viewport(element.transform.apply(egui::pos2(*x, *y), center));
            let color = fill.or(stroke_color).unwrap_or(Color32::BLACK);
            painter.text(
                anchor,
                Align2::LEFT_BOTTOM,
                text,
                FontId::proportional(TEXT_FONT_SIZE * matrix.a.abs().max(0.1)),
                color,
            );
            return;
        }

        let points: Vec<Pos2> = element
            .transformed_outline()
            .into_iter()
            .map(|p| matrix.to_viewport(p))
            .collect();
        if points.len() < 2 {
            return;
        }

        let closed = geometry.is_closed();
        let stroke = stroke_color
            .map(|color| Stroke::new(element.stroke_width() * matrix.a.abs(), color))
            .unwrap_or(Stroke::NONE);

        match (element.dash_pattern(), closed) {
            (Some((dash, gap)), _) => {
                if let (true, Some(fill)) = (closed, fill) {
                    painter.add(PathShape::convex_polygon(points.clone(), fill, Stroke::NONE));
                }
                let mut path = points;
                if closed {
                    path.push(path[0]);
                }
                painter.extend(Shape::dashed_line(&path, stroke, dash, gap));
            }
            (None, true) => {
                // egui only fills convex outlines; drawn shapes always are
                let fill = fill.unwrap_or(Color32::TRANSPARENT);
                painter.add(PathShape::convex_polygon(points, fill, stroke));
            }
            (None, false) => {
                painter.add(PathShape::line(points, stroke));
            }
        }
    }
}
