//! Error taxonomy

/// Errors raised by Waah operations
#[derive(Debug, thiserror::Error)]
pub enum WaahError {
    #[error("no memory")]
    NoMemory,

    #[error("file not found")]
    FileNotFound,

    #[error("read error")]
    ReadError,

    #[error("surface type mismatch")]
    SurfaceTypeMismatch,

    #[error("write error")]
    WriteError,

    #[error("unknown image format: {0}")]
    UnknownFormat(String),

    #[error("font loading failed: {0}")]
    FontLoadFailed(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl WaahError {
    /// Shorthand for an `InvalidArgument` error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, WaahError>;
