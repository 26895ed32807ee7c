//! Error types shared across Parallax crates.

/// Top-level error type for Parallax operations.
#[derive(Debug, thiserror::Error)]
pub enum ParallaxError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unknown layer: {id}")]
    UnknownLayer { id: String },

    #[error("Geometry error: {message}")]
    Geometry { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ParallaxError.
pub type ParallaxResult<T> = Result<T, ParallaxError>;

impl ParallaxError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unknown_layer(id: impl Into<String>) -> Self {
        Self::UnknownLayer { id: id.into() }
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry {
            message: msg.into(),
        }
    }
}
