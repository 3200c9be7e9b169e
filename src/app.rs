use log::{error, info, warn};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::export::RasterFormat;
use crate::input::InputHandler;
use crate::panels::{central_panel, style_toolbar, tools_panel};
use crate::renderer::Renderer;
use crate::state::EditorContext;
use crate::storage::{self, KeyValueStorage, MemoryStorage};

pub struct ShapesApp {
    pub(crate) config: EditorConfig,
    pub(crate) editor: EditorContext,
    pub(crate) renderer: Renderer,
    pub(crate) input: InputHandler,
    pub(crate) zoom: f32,
    pub(crate) last_error: Option<String>,
}

impl ShapesApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Settings persist through eframe; shapes live in their own storage
        let config: EditorConfig = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_config(config.with_env_overrides())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let storage: Box<dyn KeyValueStorage> = match storage::default_storage(&config.storage_dir) {
            Ok(storage) => storage,
            Err(err) => {
                warn!("Falling back to in-memory storage: {err}");
                Box::new(MemoryStorage::new())
            }
        };
        info!("Opening document `{}`", config.storage_key);
        Self {
            editor: EditorContext::new(config.clone(), storage),
            config,
            renderer: Renderer::new(),
            input: InputHandler::new(egui::Rect::NOTHING),
            zoom: 1.0,
            last_error: None,
        }
    }

    pub fn editor(&self) -> &EditorContext {
        &self.editor
    }

    /// Run an editor operation, keeping its error for the status line
    pub(crate) fn run<T>(&mut self, op: impl FnOnce(&mut EditorContext) -> Result<T, EditorError>) {
        match op(&mut self.editor) {
            Ok(_) => self.last_error = None,
            Err(err) => self.report(err),
        }
    }

    pub(crate) fn report(&mut self, err: impl std::fmt::Display) {
        error!("{err}");
        self.last_error = Some(err.to_string());
    }

    pub(crate) fn export_svg(&mut self) {
        let bytes = self.editor.export_svg();
        self.save_export("shapes.svg", &bytes);
    }

    pub(crate) fn export_raster(&mut self, format: RasterFormat) {
        match self.editor.export_raster(format) {
            Ok(bytes) => self.save_export(&format!("image.{}", format.extension()), &bytes),
            Err(err) => self.report(err),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save_export(&mut self, file_name: &str, bytes: &[u8]) {
        match std::fs::write(file_name, bytes) {
            Ok(()) => info!("Wrote {} bytes to {file_name}", bytes.len()),
            Err(err) => self.report(format!("Failed to write {file_name}: {err}")),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn save_export(&mut self, file_name: &str, bytes: &[u8]) {
        // TODO: offer the bytes as a browser download once web-sys Blob/Url are wired in
        warn!("Download of {file_name} ({} bytes) is not available on the web yet", bytes.len());
    }
}

/// Open the editor in a native window
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native() -> eframe::Result {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "eframe shapes",
        native_options,
        Box::new(|cc| Ok(Box::new(ShapesApp::new(cc)))),
    )
}

/// Mount the editor on the canvas element with id `canvas_id`
#[cfg(target_arch = "wasm32")]
pub fn start_web(canvas_id: &'static str) {
    use eframe::wasm_bindgen::JsCast as _;

    wasm_bindgen_futures::spawn_local(async move {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            error!("No document to mount the editor on");
            return;
        };
        let canvas = match document
            .get_element_by_id(canvas_id)
            .map(|element| element.dyn_into::<web_sys::HtmlCanvasElement>())
        {
            Some(Ok(canvas)) => canvas,
            Some(Err(_)) => {
                error!("`{canvas_id}` is not a canvas element");
                return;
            }
            None => {
                error!("No element with id `{canvas_id}`");
                return;
            }
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(|cc| Ok(Box::new(ShapesApp::new(cc)))),
            )
            .await;
        if let Err(err) = start_result {
            error!("Failed to start eframe: {err:?}");
        }
    });
}

impl eframe::App for ShapesApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.config);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        tools_panel(self, ctx);
        central_panel(self, ctx);
        style_toolbar(self, ctx);
    }
}
