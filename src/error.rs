//! Error types shared across the crate.

/// Convenience alias used throughout signwheel.
pub type SignwheelResult<T> = Result<T, SignwheelError>;

/// Top-level error type for signwheel operations.
#[derive(thiserror::Error, Debug)]
pub enum SignwheelError {
    /// Configuration or registration input was rejected.
    #[error("validation error: {0}")]
    Validation(String),

    /// Frame cache storage failed (capture, replay or invalidation).
    #[error("frame cache error: {0}")]
    Cache(String),

    /// Pushing a frame or status line to an output device failed.
    #[error("screen error: {0}")]
    Screen(String),

    /// Any other error, usually from an underlying library.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SignwheelError {
    /// Build a validation error from anything stringly.
    pub fn validation(msg: impl Into<String>) -> Self {
        SignwheelError::Validation(msg.into())
    }

    /// Build a frame cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        SignwheelError::Cache(msg.into())
    }

    /// Build a screen error.
    pub fn screen(msg: impl Into<String>) -> Self {
        SignwheelError::Screen(msg.into())
    }
}
