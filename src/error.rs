//! NZB error types

use thiserror::Error;

/// Errors returned by the NZB parser and generator
#[derive(Error, Debug)]
pub enum NzbError {
    /// The document is not well-formed XML or breaks the NZB structure
    /// (no `<file>`, a file without `<groups>` or without valid segments).
    #[error("Invalid NZB: {0}")]
    InvalidDocument(String),

    /// IO error while generating XML
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using NzbError
pub type Result<T> = std::result::Result<T, NzbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_document_display() {
        let err = NzbError::InvalidDocument("Missing something in the NZB".to_string());
        assert_eq!(err.to_string(), "Invalid NZB: Missing something in the NZB");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: NzbError = io.into();
        assert!(matches!(err, NzbError::Io(_)));
        assert!(err.to_string().contains("disk gone"));
    }
}
