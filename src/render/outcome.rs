use crate::{
    foundation::error::{PreviewError, PreviewResult},
    render::frame::FrameBuffer,
};

/// Result of one render request.
#[derive(Debug)]
pub enum RenderOutcome {
    /// Decoded, composited content for the requested timestamp.
    Success(FrameBuffer),
    /// The render gate was held; nothing was rendered.
    Skipped,
    /// A far seek is still warming up. Carries a zeroed placeholder, never stale content.
    /// Retry one frame interval later.
    Fallback(FrameBuffer),
    /// The request failed.
    Failure(PreviewError),
}

/// Payload-free tag of a [`RenderOutcome`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// See [`RenderOutcome::Success`].
    Success,
    /// See [`RenderOutcome::Skipped`].
    Skipped,
    /// See [`RenderOutcome::Fallback`].
    Fallback,
    /// See [`RenderOutcome::Failure`].
    Failure,
}

impl RenderOutcome {
    /// Tag of this outcome.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success(_) => OutcomeKind::Success,
            Self::Skipped => OutcomeKind::Skipped,
            Self::Fallback(_) => OutcomeKind::Fallback,
            Self::Failure(_) => OutcomeKind::Failure,
        }
    }

    /// `true` for [`RenderOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Frame carried by `Success` or `Fallback`.
    pub fn frame(&self) -> Option<&FrameBuffer> {
        match self {
            Self::Success(f) | Self::Fallback(f) => Some(f),
            Self::Skipped | Self::Failure(_) => None,
        }
    }

    /// Take the frame carried by `Success` or `Fallback`.
    pub fn into_frame(self) -> Option<FrameBuffer> {
        match self {
            Self::Success(f) | Self::Fallback(f) => Some(f),
            Self::Skipped | Self::Failure(_) => None,
        }
    }

    /// Error carried by `Failure`.
    pub fn error(&self) -> Option<&PreviewError> {
        match self {
            Self::Failure(e) => Some(e),
            _ => None,
        }
    }

    /// Convert into a `Result`. `Fallback` is not an error and yields its placeholder;
    /// `Skipped` becomes [`PreviewError::Busy`].
    pub fn into_result(self) -> PreviewResult<FrameBuffer> {
        match self {
            Self::Success(f) | Self::Fallback(f) => Ok(f),
            Self::Skipped => Err(PreviewError::Busy),
            Self::Failure(e) => Err(e),
        }
    }
}
