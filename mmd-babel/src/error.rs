//! Error types for model and format operations
//!
//!     Errors are split in two families. Fatal errors ([`FormatError`], [`ModelError`]) abort the
//!     whole import or export and are returned to the caller. Recoverable problems
//!     ([`Diagnostic`]) never surface as `Err`: the codec that hits one logs it through
//!     `tracing` and carries on with a degraded result (missing image, dropped jump).

use crate::model::TopicId;
use std::io;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Fatal errors that abort an import or export call.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    /// Format exists but does not support the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// The root container does not carry the signature the importer expects.
    #[error("Unsupported {format} document: {reason}")]
    UnsupportedFormat { format: String, reason: String },

    /// The source could not be parsed at all (broken XML, JSON, zip).
    #[error("Malformed {format} input{}: {message}", at(.location))]
    MalformedInput {
        format: String,
        message: String,
        location: Option<String>,
    },

    /// The output could not be produced (for example an image encoder failure).
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl FormatError {
    pub fn unsupported(format: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(format: &str, message: impl ToString) -> Self {
        Self::MalformedInput {
            format: format.to_string(),
            message: message.to_string(),
            location: None,
        }
    }

    pub fn malformed_at(format: &str, message: impl ToString, location: impl Into<String>) -> Self {
        Self::MalformedInput {
            format: format.to_string(),
            message: message.to_string(),
            location: Some(location.into()),
        }
    }

    /// Whether this error was caused by the input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::MalformedInput { .. }
        )
    }
}

fn at(location: &Option<String>) -> String {
    location
        .as_deref()
        .map(|l| format!(" at {l}"))
        .unwrap_or_default()
}

/// Errors raised by structural edits on a [`crate::model::MindMap`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("topic {0:?} does not exist in this map")]
    UnknownTopic(TopicId),

    #[error("the root topic cannot be moved")]
    RootOperation,

    #[error("topics {0:?} and {1:?} are not siblings")]
    NotSibling(TopicId, TopicId),

    #[error("topic {0:?} cannot be inserted before a topic that is not one of its children")]
    InvalidParent(TopicId),
}

/// Recoverable problems met while converting. Reported, never returned as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("resource '{uri}' unavailable: {reason}")]
    ResourceUnavailable { uri: String, reason: String },

    #[error("jump target '{uid}' not found")]
    DanglingReference { uid: String },
}

impl Diagnostic {
    pub fn resource(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResourceUnavailable {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    pub fn dangling(uid: impl Into<String>) -> Self {
        Self::DanglingReference { uid: uid.into() }
    }

    /// Emit the diagnostic through `tracing`.
    pub fn report(&self, format: &str) {
        match self {
            Self::ResourceUnavailable { uri, reason } => {
                tracing::warn!(format, uri = %uri, reason = %reason, "resource unavailable, skipped")
            }
            Self::DanglingReference { uid } => {
                tracing::warn!(format, uid = %uid, "dangling topic jump dropped")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display_includes_location() {
        let err = FormatError::malformed_at("freemind", "unexpected end", "line 3");
        assert_eq!(
            err.to_string(),
            "Malformed freemind input at line 3: unexpected end"
        );
        let err = FormatError::malformed("mindmup", "bad json");
        assert_eq!(err.to_string(), "Malformed mindmup input: bad json");
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(FormatError::unsupported("freemind", "root is <html>").is_input_error());
        assert!(!FormatError::Io(io::Error::other("disk")).is_input_error());
        assert!(!FormatError::FormatNotFound("x".into()).is_input_error());
    }

    #[test]
    fn model_errors_convert() {
        let err: FormatError = ModelError::RootOperation.into();
        assert_eq!(err.to_string(), "the root topic cannot be moved");
    }
}
