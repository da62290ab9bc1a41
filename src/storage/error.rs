//! Storage error types / 存储错误类型

use thiserror::Error;

/// Broad error categories, used by callers to decide whether a request can be
/// retried, must be changed, or is a configuration mistake / 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed connection URL, unknown scheme or invalid query value
    Parse,
    /// Request rejected by driver policy (extension, overwrite, traversal)
    Policy,
    /// The requested object does not exist
    NotFound,
    /// Backend unavailable, container missing, or driver already closed
    Connectivity,
    /// Local I/O failure
    Io,
}

/// Errors returned by registries and drivers / 存储操作错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage: invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("storage: unknown driver {0:?} (not registered)")]
    UnknownDriver(String),

    #[error("{scheme}: failed to parse {url:?} into \"{shape}\": missing {}", .missing.join(","))]
    MissingSegments {
        scheme: String,
        url: String,
        shape: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("{scheme}: unknown {param} value: {value}")]
    InvalidParameter {
        scheme: String,
        param: &'static str,
        value: String,
    },

    #[error("invalid extension {ext:?} for {path}")]
    InvalidExtension { ext: String, path: String },

    #[error("file already exists at {0}")]
    AlreadyExists(String),

    #[error("access path exceeds container scope: {0}")]
    InvalidPath(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("{backend}: {container} does not exist; auto-create is off")]
    ContainerMissing { backend: String, container: String },

    #[error("{backend}: {message}")]
    Backend { backend: String, message: String },

    #[error("storage: driver is closed")]
    NotOpen,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn backend(backend: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_parameter(scheme: &str, param: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            scheme: scheme.to_string(),
            param,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. }
            | Self::UnknownDriver(_)
            | Self::MissingSegments { .. }
            | Self::InvalidParameter { .. } => ErrorKind::Parse,
            Self::InvalidExtension { .. } | Self::AlreadyExists(_) | Self::InvalidPath(_) => {
                ErrorKind::Policy
            }
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ContainerMissing { .. } | Self::Backend { .. } | Self::NotOpen => {
                ErrorKind::Connectivity
            }
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_missing_segments_message() {
        let err = StorageError::MissingSegments {
            scheme: "do".to_string(),
            url: "do://space/assets".to_string(),
            shape: "do://key:secret@space/prefix",
            missing: vec!["key", "secret"],
        };
        assert_eq!(
            err.to_string(),
            "do: failed to parse \"do://space/assets\" into \"do://key:secret@space/prefix\": missing key,secret"
        );
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(StorageError::AlreadyExists("/a.txt".into()).kind(), ErrorKind::Policy);
        assert_eq!(StorageError::NotOpen.kind(), ErrorKind::Connectivity);
        assert!(StorageError::NotFound("a.txt".into()).is_not_found());

        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: StorageError = io_error.into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_invalid_parameter_names_value() {
        let err = StorageError::invalid_parameter("awss3", "acl", "world-writable");
        assert_eq!(err.to_string(), "awss3: unknown acl value: world-writable");
    }
}
