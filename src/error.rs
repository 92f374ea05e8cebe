//! Error types for asset and config loading

use thiserror::Error;

/// Result type for fallible engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] ron::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Texture {0} has no pixels")]
    EmptyTexture(String),

    #[error("OBJ line {line}: {message}")]
    Obj { line: usize, message: String },

    #[error("Face {face} references {kind} index {index}, but only {len} exist")]
    MeshIndex {
        face: usize,
        kind: &'static str,
        index: usize,
        len: usize,
    },
}
