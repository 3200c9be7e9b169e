use crate::ShapesApp;
use crate::coords::ScreenMatrix;

/// Margin between the canvas edge and the drawing surface
const PAGE_MARGIN: f32 = 16.0;

pub fn central_panel(app: &mut ShapesApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;

        // The surface may have been scrolled or zoomed since the last frame
        let origin = canvas_rect.min + egui::Vec2::splat(PAGE_MARGIN);
        app.editor
            .set_screen_matrix(ScreenMatrix::from_view(origin, app.zoom));
        let visible = (canvas_rect.size() - egui::Vec2::splat(2.0 * PAGE_MARGIN)) / app.zoom;
        app.editor.set_surface_size(visible.max(egui::Vec2::splat(1.0)));
        app.input.set_canvas_rect(canvas_rect);

        for event in app.input.process_input(ctx) {
            if let Err(err) = app.editor.handle_event(event) {
                app.report(err);
            }
        }

        app.renderer.render(&painter, app.editor.surface());
    });
}
