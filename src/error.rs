/// Error Handling Module
///
/// Unified error handling for the credential subsystem:
/// 1. Control Flow Errors (Result-based)
/// 2. Domain-Specific Error Types (avoiding ball of mud)
/// 3. Structured Error Logging

use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(String),
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{} has wrong length (expected {} bytes, got {})",
                field, expected, actual
            ),
        }
    }
}

impl StdError for ValidationError {}

/// Configuration errors
///
/// Surfaced at load time, before any hashing or signing occurs. The
/// process must not serve requests with an invalid security
/// configuration, so these are fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    ValueTooLow { field: String, floor: u64 },
    TooShort { field: String, min: usize },
    Empty(String),
    Load(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::ValueTooLow { field, floor } => {
                write!(f, "{} is below the safety floor of {}", field, floor)
            }
            ConfigurationError::TooShort { field, min } => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ConfigurationError::Empty(field) => write!(f, "{} must not be empty", field),
            ConfigurationError::Load(msg) => write!(f, "Failed to load configuration: {}", msg),
        }
    }
}

impl StdError for ConfigurationError {}

/// Unexpected failure while attempting token verification.
///
/// Deliberately distinct from an invalid token: an expired or tampered
/// token is an expected, frequent outcome reported as a boolean verdict,
/// while a token the mechanism cannot even parse indicates a systemic
/// problem and must propagate to operators.
#[derive(Debug, Clone)]
pub struct VerificationError(pub String);

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token verification failed unexpectedly: {}", self.0)
    }
}

impl StdError for VerificationError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all subsystem errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Configuration(ConfigurationError),
    Verification(VerificationError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Configuration(e) => write!(f, "{}", e),
            AppError::Verification(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS (Control Flow Error Conversion)
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(err: ConfigurationError) -> Self {
        AppError::Configuration(err)
    }
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        AppError::Verification(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

// ============================================================================
// 3. STRUCTURED ERROR LOGGING
// ============================================================================

impl AppError {
    /// Log this error at the severity appropriate to its kind.
    ///
    /// Validation problems are caller mistakes and log as warnings;
    /// configuration and verification problems indicate a broken
    /// deployment and log as errors.
    pub fn log(&self, operation: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(operation = operation, error = %e, "Validation error");
            }
            AppError::Configuration(e) => {
                tracing::error!(operation = operation, error = %e, "Configuration error");
            }
            AppError::Verification(e) => {
                tracing::error!(operation = operation, error = %e, "Verification failure");
            }
            AppError::Internal(msg) => {
                tracing::error!(operation = operation, error = %msg, "Internal error");
            }
        }
    }
}
