use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Wayfinder(#[from] wayfinder::Error),

    #[error("tour not found: {id} (available: {available})")]
    UnknownTour { id: String, available: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("failed to read layout {path}: {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } | Self::UnknownTour { .. } => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<wayfinder::ConfigError> for DemoError {
    fn from(err: wayfinder::ConfigError) -> Self {
        Self::Wayfinder(err.into())
    }
}
