/// Convenience result type used across the crate.
pub type TextBehindResult<T> = Result<T, TextBehindError>;

/// Top-level error taxonomy used by engine and session APIs.
#[derive(thiserror::Error, Debug)]
pub enum TextBehindError {
    /// Invalid user-provided input: uploads, attribute updates, canvas sizes or config.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image bytes that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Failures while rasterizing layers into a pixel buffer.
    #[error("render error: {0}")]
    Render(String),

    /// Failures while encoding or delivering an exported image.
    #[error("encode error: {0}")]
    Encode(String),

    /// Failures reported by the background-removal collaborator.
    #[error("segmentation error: {0}")]
    Segmentation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TextBehindError {
    /// Build a [`TextBehindError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TextBehindError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TextBehindError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TextBehindError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`TextBehindError::Segmentation`] value.
    pub fn segmentation(msg: impl Into<String>) -> Self {
        Self::Segmentation(msg.into())
    }

    /// Build a [`TextBehindError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
