use thiserror::Error;

/// Top-level error type shared by the Ghost crates.
///
/// Subsystem crates define their own error types and implement
/// `From<GhostError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GhostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for GhostError {
    fn from(err: toml::de::Error) -> Self {
        GhostError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GhostError {
    fn from(err: toml::ser::Error) -> Self {
        GhostError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GhostError {
    fn from(err: serde_json::Error) -> Self {
        GhostError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Ghost operations.
pub type Result<T> = std::result::Result<T, GhostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GhostError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = GhostError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");

        let err = GhostError::InvalidValue("unknown outcome".to_string());
        assert_eq!(err.to_string(), "Invalid value: unknown outcome");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let ghost_err: GhostError = io_err.into();
        assert!(matches!(ghost_err, GhostError::Io(_)));
        assert!(ghost_err.to_string().starts_with("I/O error:"));
        assert!(ghost_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let ghost_err: GhostError = err.unwrap_err().into();
        assert!(matches!(ghost_err, GhostError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let ghost_err: GhostError = err.unwrap_err().into();
        assert!(matches!(ghost_err, GhostError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
