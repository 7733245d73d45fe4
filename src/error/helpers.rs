use super::{ErrorCode, IterativeError};

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to IterativeError with context
    fn to_iterative(self, context: impl Into<String>) -> Result<T, IterativeError>;

    /// Convert to a configuration error
    fn to_config_error(self, message: impl Into<String>) -> Result<T, IterativeError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_iterative(self, context: impl Into<String>) -> Result<T, IterativeError> {
        self.map_err(|e| IterativeError::other(context).with_source(e))
    }

    fn to_config_error(self, message: impl Into<String>) -> Result<T, IterativeError> {
        self.map_err(|e| IterativeError::config(message).with_source(e))
    }
}

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    /// Create a not found error for configuration
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> IterativeError {
        IterativeError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
    }

    /// Create an error for a malformed TOML document
    pub fn invalid_toml(error: toml::de::Error) -> IterativeError {
        IterativeError::config_with_code(
            ErrorCode::CONFIG_INVALID_TOML,
            format!("Failed to parse configuration: {}", error),
        )
        .with_source(error)
    }

    /// Create an error for an environment override that cannot be parsed
    pub fn invalid_env_override(variable: &str, value: &str) -> IterativeError {
        IterativeError::config_with_code(
            ErrorCode::CONFIG_ENV_OVERRIDE,
            format!("Invalid value '{}' for {}", value, variable),
        )
    }

    /// Create a validation error for an empty field
    pub fn empty_field(field: &str) -> IterativeError {
        IterativeError::validation_with_code(
            ErrorCode::VALIDATION_EMPTY_NAME,
            format!("Field '{}' must not be empty", field),
            Some(field.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_extension_trait() {
        let io_result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));

        let err = io_result.to_config_error("Failed to open file").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_GENERIC);
    }

    #[test]
    fn test_to_iterative_keeps_source() {
        use std::error::Error as _;

        let parsed: Result<u32, std::num::ParseIntError> = "many".parse::<u32>();
        let err = parsed.to_iterative("Failed to parse page count").unwrap_err();

        assert_eq!(err.code(), ErrorCode::OTHER_GENERIC);
        assert_eq!(err.user_message(), "Failed to parse page count");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_common_error_helpers() {
        let err = common::config_not_found("/etc/iterative/config.toml");
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert!(err.user_message().contains("Configuration problem"));

        let err = common::invalid_env_override("ITERATIVE_VERBOSE", "loud");
        assert_eq!(err.code(), ErrorCode::CONFIG_ENV_OVERRIDE);
        assert!(err.to_string().contains("ITERATIVE_VERBOSE"));

        let err = common::empty_field("coordinator.name");
        assert_eq!(err.code(), ErrorCode::VALIDATION_EMPTY_NAME);
    }
}
