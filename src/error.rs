//! Error types for chunkcache
//!
//! All modules use `ChunkedResult<T>` as their return type. Lookup misses and
//! scanner end-of-stream are `None` values, not errors.

use crate::cache::format::DecodeError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for chunkcache operations
pub type ChunkedResult<T> = Result<T, ChunkedError>;

/// All errors that can occur in chunkcache
#[derive(Error, Debug)]
pub enum ChunkedError {
    // TOC errors
    #[error("Malformed TOC: {0}")]
    TocParse(#[source] serde_json::Error),

    #[error("Invalid TOC entry {name:?}: {reason}")]
    TocInvalid { name: String, reason: String },

    // Encoding errors
    #[error("Cannot fingerprint {name:?}: {reason}")]
    Fingerprint { name: String, reason: String },

    #[error("Tag {key} is used both as a content digest and as a hardlink fingerprint")]
    TagCollision { key: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    // Decoding errors
    #[error("Corrupt cache data: {0}")]
    Decode(#[from] DecodeError),

    // Storage errors, passed through as the store reported them
    #[error(transparent)]
    Store(io::Error),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ChunkedError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid TOC entry error
    pub fn toc_invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TocInvalid {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a fingerprint derivation error
    pub fn fingerprint(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fingerprint {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error aborted a build before anything was written
    pub fn is_pre_write(&self) -> bool {
        matches!(
            self,
            Self::TocParse(_)
                | Self::TocInvalid { .. }
                | Self::Fingerprint { .. }
                | Self::TagCollision { .. }
                | Self::Encoding(_)
        )
    }

    /// Check if error is retryable
    ///
    /// Only transient store failures qualify. The retry itself is up to the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::TocParse(_) => Some("The TOC must be a JSON object with an \"entries\" list"),
            Self::Decode(_) => Some("Rebuild the cache with: chunkcache build <toc> --layer <id>"),
            Self::Store(e) if e.kind() == io::ErrorKind::NotFound => {
                Some("No cache stored for this layer yet. Run: chunkcache build")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ChunkedError::toc_invalid("usr/bin/foo", "missing linkName");
        assert!(err.to_string().contains("usr/bin/foo"));
        assert!(err.to_string().contains("missing linkName"));
    }

    #[test]
    fn store_error_is_transparent() {
        let err = ChunkedError::Store(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn error_hint() {
        let err = ChunkedError::Decode(DecodeError::BadMagic);
        assert!(err.hint().unwrap().contains("chunkcache build"));
        assert!(ChunkedError::Encoding("x".into()).hint().is_none());
    }

    #[test]
    fn error_retryable() {
        let transient = ChunkedError::Store(io::Error::from(io::ErrorKind::TimedOut));
        let permanent = ChunkedError::Store(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(transient.is_retryable());
        assert!(!permanent.is_retryable());
        assert!(!ChunkedError::Decode(DecodeError::BadMagic).is_retryable());
    }

    #[test]
    fn pre_write_classification() {
        assert!(ChunkedError::fingerprint("a", "b").is_pre_write());
        assert!(!ChunkedError::Store(io::Error::from(io::ErrorKind::Other)).is_pre_write());
    }
}
