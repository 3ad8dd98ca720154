//! Clipboard collaborator.
//!
//! The editor only moves plain text through the clipboard. Hosts wire
//! [`Clipboard`] to the platform (the browser's async clipboard, a terminal
//! OSC 52 sequence, ...); [`MemoryClipboard`] keeps the text in process.

use std::error::Error as StdError;
use std::fmt;

/// Why a clipboard read or write failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClipboardError {
    /// The platform refused access (permissions, missing user gesture).
    Denied,
    /// No clipboard is available in this environment.
    Unavailable,
    /// Any other platform failure.
    Other(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denied => f.write_str("access denied"),
            Self::Unavailable => f.write_str("clipboard unavailable"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl StdError for ClipboardError {}

/// Plain text clipboard access.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn read_text(&mut self) -> Result<String, ClipboardError>;
}

/// In-process clipboard.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    contents: String,
    failure: Option<ClipboardError>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: text.into(),
            failure: None,
        }
    }

    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Make every following read and write fail with `error` (or succeed
    /// again with `None`).
    pub fn set_failure(&mut self, error: Option<ClipboardError>) {
        self.failure = error;
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.contents = text.to_string();
        Ok(())
    }

    fn read_text(&mut self) -> Result<String, ClipboardError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.contents.clone()),
        }
    }
}
