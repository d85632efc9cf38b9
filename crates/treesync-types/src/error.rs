//! Error types and handling for treesync
//!
//! Every filesystem failure the engine can hit is expressed as an [`Error`].
//! The engine never aborts a run on an error; instead the error is classified
//! into an [`ErrorKind`] and reported alongside the path it happened on.

use std::io;
use std::path::{Path, PathBuf};

/// Coarse classification of an error, independent of the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// The process lacks permission to read, write, create or delete the path
    AccessDenied,
    /// The path does not exist
    NotFound,
    /// Any other failure
    Other,
}

impl ErrorKind {
    /// Short, stable label for the kind
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::NotFound => "not_found",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for treesync operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Permission denied
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path the operation was denied on
        path: PathBuf,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found
        path: PathBuf,
    },

    /// I/O operation failed
    #[error("I/O error on {path}: {message}")]
    Io {
        /// Path the operation failed on
        path: PathBuf,
        /// Error message from the I/O operation
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

impl Error {
    /// Classify an I/O error raised while operating on `path`
    pub fn io(path: impl AsRef<Path>, error: &io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::FileNotFound { path },
            _ => Self::Io {
                path,
                message: error.to_string(),
            },
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied { .. } => ErrorKind::AccessDenied,
            Self::FileNotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } | Self::Config { .. } | Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Path the error relates to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PermissionDenied { path }
            | Self::FileNotFound { path }
            | Self::Io { path, .. } => Some(path),
            Self::Config { .. } | Self::Other { .. } => None,
        }
    }

    /// Check if this error means the path is absent
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(io::ErrorKind::PermissionDenied, ErrorKind::AccessDenied)]
    #[case(io::ErrorKind::NotFound, ErrorKind::NotFound)]
    #[case(io::ErrorKind::AlreadyExists, ErrorKind::Other)]
    #[case(io::ErrorKind::InvalidInput, ErrorKind::Other)]
    #[case(io::ErrorKind::UnexpectedEof, ErrorKind::Other)]
    fn test_io_error_classification(#[case] io_kind: io::ErrorKind, #[case] expected: ErrorKind) {
        let error = Error::io("/data/file.txt", &io::Error::new(io_kind, "boom"));
        assert_eq!(error.kind(), expected);
        assert_eq!(error.path(), Some(Path::new("/data/file.txt")));
    }

    #[test]
    fn test_permission_denied_display() {
        let error = Error::PermissionDenied {
            path: PathBuf::from("/protected/file.txt"),
        };
        assert_eq!(error.to_string(), "Permission denied: /protected/file.txt");
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_io_error_keeps_os_message() {
        let error = Error::io(
            "dst/a.txt",
            &io::Error::new(io::ErrorKind::Other, "disk on fire"),
        );
        assert!(error.to_string().contains("dst/a.txt"));
        assert!(error.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_config_error_has_no_path() {
        let error = Error::config("invalid log level");
        assert_eq!(error.kind(), ErrorKind::Other);
        assert!(error.path().is_none());
        assert_eq!(error.to_string(), "Configuration error: invalid log level");
    }

    proptest! {
        #[test]
        fn test_message_errors_are_other(message in ".*") {
            prop_assert_eq!(Error::other(message.clone()).kind(), ErrorKind::Other);
            prop_assert_eq!(Error::config(message).kind(), ErrorKind::Other);
        }
    }
}
