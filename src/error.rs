use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::clip::NameError;

/// Errors surfaced by clip storage and upload correlation.
///
/// None of these are fatal: each one becomes a single reply to the owner.
#[derive(Debug, Error)]
pub enum ClipError {
    /// Name failed validation
    #[error("invalid clip name: {0}")]
    InvalidName(#[from] NameError),

    /// Declared MIME type is not one we store
    #[error("unsupported audio format: {mime}")]
    UnsupportedFormat {
        /// MIME type as declared by the sender
        mime: String,
    },

    /// Media arrived without any bytes
    #[error("audio payload is empty")]
    EmptyPayload,

    /// Media exceeds the configured maximum
    #[error("audio payload is {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size in bytes
        size: usize,
        /// Configured limit in bytes
        max: usize,
    },

    /// No file under any supported extension
    #[error("clip not found: {name}")]
    NotFound {
        /// Requested clip name
        name: String,
    },

    /// A different upload is already waiting for its media
    #[error("upload already pending for {pending}")]
    Conflict {
        /// Name of the outstanding upload
        pending: String,
    },

    /// Filesystem failure
    #[error("failed to {op} {}: {source}", .path.display())]
    Storage {
        /// What was being attempted
        op: &'static str,
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

impl ClipError {
    pub(crate) fn storage(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            op,
            path: path.into(),
            source,
        }
    }

    /// Whether the error is a rejected input rather than a runtime failure
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidName(_)
                | Self::UnsupportedFormat { .. }
                | Self::EmptyPayload
                | Self::PayloadTooLarge { .. }
        )
    }

    /// Human-readable reply text for the chat
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidName(e) => format!("❌ Invalid clip name: {e}."),
            Self::UnsupportedFormat { mime } => {
                format!("❌ Unsupported audio format \"{mime}\".")
            }
            Self::EmptyPayload => "❌ The voice message was empty.".to_owned(),
            Self::PayloadTooLarge { max, .. } => format!(
                "❌ Voice message too large (max {}).",
                crate::clip::format_size(*max as u64)
            ),
            Self::NotFound { name } => format!(
                "❌ Voice \"{name}\" not found. Use !list voices to see available voices."
            ),
            Self::Conflict { pending } => format!(
                "⚠️ Still waiting for the voice message for \"{pending}\". Send it first or wait for it to expire."
            ),
            Self::Storage { op, .. } => format!("❌ Storage error: failed to {op}."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(ClipError::from(NameError::Empty).is_validation());
        assert!(ClipError::EmptyPayload.is_validation());
        assert!(!ClipError::NotFound {
            name: "x".to_owned()
        }
        .is_validation());
        assert!(!ClipError::storage(
            "write clip",
            "voices/x.ogg",
            io::Error::other("disk full")
        )
        .is_validation());
    }

    #[test]
    fn test_user_messages_name_the_clip() {
        let msg = ClipError::NotFound {
            name: "hello".to_owned(),
        }
        .user_message();
        assert!(msg.contains("\"hello\""));

        let msg = ClipError::Conflict {
            pending: "bye".to_owned(),
        }
        .user_message();
        assert!(msg.contains("\"bye\""));
    }

    #[test]
    fn test_storage_display_includes_path() {
        let err = ClipError::storage(
            "write clip",
            "voices/x.ogg",
            io::Error::other("disk full"),
        );
        let text = err.to_string();
        assert!(text.contains("write clip"));
        assert!(text.contains("voices/x.ogg"));
        assert!(text.contains("disk full"));
    }
}
