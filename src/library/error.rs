//! Library error types.

use crate::svg::{DocumentError, ParseError};
use std::error::Error as _;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by library operations.
///
/// Every variant is recoverable: request handlers turn it into a JSON
/// `{"error": ...}` payload with [`IconError::status`].
#[derive(Debug, Error)]
pub enum IconError {
    #[error("File not found")]
    FileNotFound(PathBuf),

    #[error("Folder not found")]
    FolderNotFound(String),

    #[error("Group not found")]
    GroupNotFound(String),

    #[error("Invalid type")]
    InvalidType(String),

    #[error("Invalid mode `{0}`")]
    InvalidMode(String),

    #[error("Invalid name `{0}`")]
    InvalidName(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No backup found to revert from")]
    NoBackup(PathBuf),

    #[error("Feedback not found")]
    FeedbackNotFound(u64),

    #[error("IO error on `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse `{}`", .0.display())]
    Xml(PathBuf, #[source] ParseError),

    #[error("Failed to render PNG: {0}")]
    Render(String),

    #[error("Failed to create ZIP: {0}")]
    Archive(String),

    #[error("Failed to send mail: {0}")]
    Mail(String),
}

impl IconError {
    /// HTTP status for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::FileNotFound(_)
            | Self::FolderNotFound(_)
            | Self::GroupNotFound(_)
            | Self::NoBackup(_)
            | Self::FeedbackNotFound(_) => 404,
            Self::InvalidType(_)
            | Self::InvalidMode(_)
            | Self::InvalidName(_)
            | Self::InvalidRequest(_) => 400,
            Self::Mail(_) => 502,
            Self::Io(..) | Self::Xml(..) | Self::Render(_) | Self::Archive(_) => 500,
        }
    }

    /// Message with the source chain appended, for error payloads.
    pub fn message(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }

    /// Build an IO error bound to a path.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |err| Self::Io(path, err)
    }
}

impl From<DocumentError> for IconError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Io(path, source) if source.kind() == std::io::ErrorKind::NotFound => {
                Self::FileNotFound(path)
            }
            DocumentError::Io(path, source) => Self::Io(path, source),
            DocumentError::Parse(path, source) => Self::Xml(path, source),
        }
    }
}
