//! Error types for heightscan.

use thiserror::Error;

/// The main error type for heightscan operations.
///
/// Every variant is unrecoverable at the point it is raised; the caller decides
/// whether to abort the user action or report a diagnostic.
#[derive(Error, Debug)]
pub enum HeightscanError {
    /// The sample source contained no usable (x, y, z) triples.
    #[error("parse error: {0}")]
    Parse(String),

    /// Vertex or index buffers are missing or structurally inconsistent.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// The off-screen depth target could not be allocated or validated.
    #[error("framebuffer setup failed: {0}")]
    FramebufferSetup(String),

    /// A render or readback step failed after setup.
    #[error("render error: {0}")]
    Render(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for heightscan operations.
pub type Result<T> = std::result::Result<T, HeightscanError>;
