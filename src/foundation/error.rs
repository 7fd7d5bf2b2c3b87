/// Convenience result type used across the engine.
pub type AftermovieResult<T> = Result<T, AftermovieError>;

/// Top-level error taxonomy returned by [`crate::generate`] and friends.
#[derive(thiserror::Error, Debug)]
pub enum AftermovieError {
    /// Empty item list, unusable options or a malformed manifest.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A photo or video could not be fetched or decoded.
    #[error("media load failed for '{url}': {reason}")]
    MediaLoad {
        /// URL (or path) of the failing media.
        url: String,
        /// Human-readable cause.
        reason: String,
    },

    /// No usable encoder or output container on this host.
    #[error("encoder unavailable: {0}")]
    EncoderUnavailable(String),

    /// The encoder failed while frames were being written or finalised.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The caller tripped the cancellation token.
    #[error("render cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AftermovieError {
    /// Build an [`AftermovieError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build an [`AftermovieError::MediaLoad`] value.
    pub fn media_load(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MediaLoad {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Build an [`AftermovieError::EncoderUnavailable`] value.
    pub fn encoder_unavailable(msg: impl Into<String>) -> Self {
        Self::EncoderUnavailable(msg.into())
    }

    /// Build an [`AftermovieError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Return `true` for [`AftermovieError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
