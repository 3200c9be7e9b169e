use thiserror::Error;

use crate::shape::{ShapeId, ShapeKind};

/// Errors raised while deriving or rebuilding shape geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("Invalid attributes for {kind}: missing `{field}`")]
    MissingField {
        kind: ShapeKind,
        field: &'static str,
    },

    #[error("Shape type `{0}` cannot be drawn interactively")]
    UnsupportedKind(ShapeKind),

    #[error("Unknown shape type `{0}`")]
    UnknownKind(String),

    #[error("Invalid value for `{field}`: {value}")]
    InvalidValue {
        field: &'static str,
        value: String,
    },
}

/// Errors raised by a durable key-value backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access storage file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the persistent shape store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to serialize shapes: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write shapes: {0}")]
    Storage(#[from] StorageError),

    #[error("Shape {0} not found in store")]
    NotFound(ShapeId),

    #[error("Index {index} out of range for {len} shapes")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No shape id left after {0}")]
    IdsExhausted(ShapeId),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Errors raised while exporting the surface
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Cannot allocate a {width}x{height} raster")]
    InvalidSize { width: u32, height: u32 },
}

/// Top level error returned by editor operations
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("No shape is selected")]
    NoSelection,
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
