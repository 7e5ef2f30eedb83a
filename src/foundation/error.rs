/// Convenience alias used throughout the crate.
pub type PreviewResult<T> = Result<T, PreviewError>;

/// Coarse classification of a [`PreviewError`].
///
/// Callers driving a playback clock usually only need the kind: `Busy` is a skip signal,
/// `OutOfRange` means "stop advancing", everything else is a real fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Invalid input or configuration.
    Validation,
    /// Call on a destroyed or uninitialized instance.
    InvalidState,
    /// Timestamp beyond decodable content.
    OutOfRange,
    /// Underlying codec/demux/compose fault.
    DecodeError,
    /// Render gate was held by another call.
    Busy,
    /// Anything else.
    Other,
}

/// Top-level error type for preview rendering.
#[derive(thiserror::Error, Debug)]
pub enum PreviewError {
    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Call on a destroyed or uninitialized instance.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Timestamp beyond decodable content.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// Underlying codec/demux/compose fault.
    #[error("decode error: {0}")]
    Decode(String),

    /// Render gate busy. Not a real failure; surfaced by [`crate::RenderOutcome::into_result`].
    #[error("render gate busy")]
    Busy,

    /// Wrapped error from an external source.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PreviewError {
    /// Build a [`PreviewError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PreviewError::InvalidState`] value.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Build a [`PreviewError::OutOfRange`] value.
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    /// Build a [`PreviewError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::OutOfRange(_) => ErrorKind::OutOfRange,
            Self::Decode(_) => ErrorKind::DecodeError,
            Self::Busy => ErrorKind::Busy,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
