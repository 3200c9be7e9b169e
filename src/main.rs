// On Windows, hide the console window for GUI applications
#![cfg_attr(
    all(target_os = "windows", not(debug_assertions)),
    windows_subsystem = "windows"
)]

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    // Initialize logging
    eframe_shapes::init_logging();

    // Launch the native window
    eframe_shapes::app::run_native()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    eframe_shapes::init_logging();
    eframe_shapes::app::start_web("the_canvas_id");
}
