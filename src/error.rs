//! Error types for repository materialization and source ingestion.
//!
//! Metadata extraction and scanning never surface errors; they degrade and
//! log instead. These variants cover the outer layers: git, HTTP, and
//! marketplace source handling.

use thiserror::Error;

/// Errors that can occur while materializing repositories and ingesting
/// marketplace sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Invalid URL provided.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// GitHub reference could not be parsed.
    #[error("GitHub reference parse error: {0}")]
    GitHubParse(String),

    /// The `git` executable is not on the search path.
    #[error("git executable not found")]
    GitNotFound,

    /// Cloning failed on every candidate branch.
    #[error("failed to clone {url}: {stderr}")]
    Clone {
        /// Clone URL that was attempted.
        url: String,
        /// Stderr of the last failed attempt.
        stderr: String,
    },

    /// A marketplace record is missing required fields.
    #[error("invalid marketplace record: {0}")]
    InvalidRecord(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Download size limit exceeded.
    #[error("size limit exceeded: {size} bytes > {limit} bytes")]
    SizeLimit {
        /// Actual size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        limit: u64,
    },
}

/// A specialized Result type for scraping operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_http() {
        let err = Error::Http("connection refused".to_string());
        assert_eq!(err.to_string(), "HTTP request failed: connection refused");
    }

    #[test]
    fn error_display_clone() {
        let err = Error::Clone {
            url: "https://github.com/a/b.git".to_string(),
            stderr: "remote branch not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to clone https://github.com/a/b.git: remote branch not found"
        );
    }

    #[test]
    fn error_display_invalid_record() {
        let err = Error::InvalidRecord("missing repoOwner".to_string());
        assert_eq!(
            err.to_string(),
            "invalid marketplace record: missing repoOwner"
        );
    }

    #[test]
    fn error_display_size_limit() {
        let err = Error::SizeLimit {
            size: 300_000_000,
            limit: 200_000_000,
        };
        assert_eq!(
            err.to_string(),
            "size limit exceeded: 300000000 bytes > 200000000 bytes"
        );
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
