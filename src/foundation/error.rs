/// Convenience result type used across photogear.
pub type GearResult<T> = Result<T, GearError>;

/// Top-level error taxonomy used by editor APIs.
#[derive(thiserror::Error, Debug)]
pub enum GearError {
    /// Invalid user-provided configuration, script, or editor state.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image, SVG, or data URL bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The scene could not be rasterized.
    #[error("render error: {0}")]
    Render(String),

    /// The rendered scene could not be encoded or written out.
    #[error("export error: {0}")]
    Export(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GearError {
    /// Build a [`GearError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GearError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`GearError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GearError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
