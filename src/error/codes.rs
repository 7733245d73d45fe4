/// Error code registry for the iterative coordinator
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 7000-7999: Validation errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_IO_ERROR: u16 = 1006;
    pub const CONFIG_ENV_OVERRIDE: u16 = 1010;

    // Validation errors (7000-7999)
    pub const VALIDATION_GENERIC: u16 = 7000;
    pub const VALIDATION_EMPTY_NAME: u16 = 7001;
    pub const VALIDATION_OUT_OF_RANGE: u16 = 7002;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        // Configuration errors
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Invalid TOML syntax in configuration",
        1005 => "Invalid value in configuration",
        1006 => "Failed to read configuration file",
        1010 => "Invalid environment variable override",

        // Validation errors
        7000 => "Generic validation error",
        7001 => "Coordinator name must not be empty",
        7002 => "Value out of accepted range",

        // Other
        9000 => "Generic error",

        _ => "Unknown error code",
    }
}
