#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod color;
pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod gizmo;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod shape;
pub mod state;
pub mod storage;
pub mod store;
pub mod surface;
pub mod tools;
pub mod transform;

pub use app::ShapesApp;
pub use config::EditorConfig;
pub use coords::ScreenMatrix;
pub use error::{EditorError, EditorResult, ExportError, ShapeError, StorageError, StoreError};
pub use export::RasterFormat;
pub use renderer::Renderer;
pub use shape::{Attributes, DragInput, FieldUpdate, Geometry, Shape, ShapeId, ShapeKind, Style};
pub use state::EditorContext;
pub use storage::{KeyValueStorage, MemoryStorage};
pub use store::ShapeStore;
pub use surface::{Element, ElementKey, Surface};
pub use tools::{ActiveGesture, Gesture, GestureStatus};
pub use transform::ShapeTransform;

/// Route `log` output to stderr natively (filtered by `RUST_LOG`, `info` by default) and to the
/// browser console on the web
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(target_arch = "wasm32")]
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();
}
