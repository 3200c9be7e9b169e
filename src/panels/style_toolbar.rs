use egui::color_picker::{Alpha, color_edit_button_srgba};
use egui::{Color32, pos2};

use crate::ShapesApp;
use crate::color::{parse_paint, to_hex};

/// Floating toolbar shown above the selected shape
pub fn style_toolbar(app: &mut ShapesApp, ctx: &egui::Context) {
    let (Some(anchor), Some(style)) = (app.editor.toolbar_anchor(), app.editor.selected_style())
    else {
        return;
    };

    egui::Area::new(egui::Id::new("style_toolbar"))
        .order(egui::Order::Foreground)
        .fixed_pos(pos2(anchor.x, anchor.y.max(0.0)))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Fill");
                    let mut fill = parse_paint(&style.fill).unwrap_or(Color32::TRANSPARENT);
                    if color_edit_button_srgba(ui, &mut fill, Alpha::Opaque).changed() {
                        app.run(|editor| editor.set_fill(to_hex(fill)));
                    }

                    ui.label("Stroke");
                    let mut stroke = parse_paint(&style.stroke).unwrap_or(Color32::TRANSPARENT);
                    if color_edit_button_srgba(ui, &mut stroke, Alpha::Opaque).changed() {
                        app.run(|editor| editor.set_stroke(to_hex(stroke)));
                    }

                    let mut width = style.stroke_width;
                    let response = ui.add(
                        egui::DragValue::new(&mut width)
                            .range(0.0..=50.0)
                            .speed(0.1)
                            .prefix("width "),
                    );
                    if response.changed() {
                        app.run(|editor| editor.set_stroke_width(width));
                    }

                    if ui.button("🗑 Delete").clicked() {
                        app.run(|editor| editor.delete_selected());
                    }
                });
            });
        });
}
