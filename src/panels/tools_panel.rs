use crate::ShapesApp;
use crate::export::RasterFormat;
use crate::shape::ShapeKind;

pub fn tools_panel(app: &mut ShapesApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(160.0)
        .show(ctx, |ui| {
            ui.heading("Shapes");

            let armed = app.editor.armed_kind();
            for kind in ShapeKind::drawable() {
                if ui.selectable_label(armed == Some(kind), kind.as_str()).clicked() {
                    log::info!("Shape type selected from UI: {kind}");
                    app.run(|editor| editor.choose_shape(kind));
                }
            }
            ui.separator();

            ui.horizontal(|ui| {
                let can_undo = !app.editor.store().is_empty();
                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.run(|editor| editor.undo());
                }
                if ui.button("Clear").clicked() {
                    app.run(|editor| editor.clear());
                }
            });
            ui.separator();

            ui.label("Export");
            ui.horizontal(|ui| {
                if ui.button("SVG").clicked() {
                    app.export_svg();
                }
                if ui.button("PNG").clicked() {
                    app.export_raster(RasterFormat::Png);
                }
                if ui.button("JPEG").clicked() {
                    app.export_raster(RasterFormat::Jpeg);
                }
            });
            ui.separator();

            ui.add(egui::Slider::new(&mut app.zoom, 0.25..=4.0).text("Zoom"));
            ui.label(format!("State: {}", app.editor.current_state_name()));
            ui.label(format!("Shapes: {}", app.editor.store().len()));
            if let Some(err) = &app.last_error {
                ui.colored_label(ui.visuals().error_fg_color, err.as_str());
            }
        });
}
