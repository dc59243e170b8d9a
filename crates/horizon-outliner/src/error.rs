//! Error types for the outliner.

use std::path::PathBuf;

/// Result type alias for backing-store writes.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors a backing store reports when a write cannot be applied.
///
/// These never cross the model boundary: the model logs them and answers
/// `false` from `set_data`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The referenced object no longer exists.
    #[error("backing object no longer exists")]
    Gone,

    /// The store refused the value.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// The object does not support this kind of write.
    #[error("operation not supported by this object")]
    Unsupported,
}

impl StoreError {
    /// Create a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Errors that can occur while loading an [`OutlinerConfig`](crate::OutlinerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or schema error.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid-value error.
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        assert_eq!(StoreError::Gone.to_string(), "backing object no longer exists");
        assert_eq!(
            StoreError::rejected("locked layer").to_string(),
            "write rejected: locked layer"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("page_size", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'page_size': must be greater than zero"
        );

        let io = ConfigError::io(
            "/missing/outliner.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(io.to_string().contains("/missing/outliner.toml"));
    }
}
