//! Error types for runchain.

use std::fmt;

use crate::clipboard::ClipboardError;

/// Result type alias for runchain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for runchain operations.
///
/// Invariant violations inside the layout pipeline never show up here; they
/// are repaired in place and reported through [`crate::event`].
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid color format (e.g., malformed hex string).
    InvalidColor(String),
    /// Font size was zero, negative or not finite.
    InvalidFontSize(f32),
    /// Wrap width was zero, negative or NaN.
    InvalidWrapWidth(f32),
    /// Line spacing multiplier was zero, negative or not finite.
    InvalidLineSpacing(f32),
    /// The clipboard collaborator rejected a read or write.
    Clipboard(ClipboardError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColor(s) => write!(f, "invalid color format: {s}"),
            Self::InvalidFontSize(size) => write!(f, "invalid font size: {size}"),
            Self::InvalidWrapWidth(width) => write!(f, "invalid wrap width: {width}"),
            Self::InvalidLineSpacing(spacing) => {
                write!(f, "invalid line spacing: {spacing}")
            }
            Self::Clipboard(e) => write!(f, "clipboard error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Clipboard(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClipboardError> for Error {
    fn from(e: ClipboardError) -> Self {
        Self::Clipboard(e)
    }
}
