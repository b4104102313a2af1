//! Core error types
//!
//! Every variant maps to a stable code string reported over the command
//! channel. User cancellation is not an error and has no variant here.

use local_auth_platform::PlatformError;
use serde_json::{json, Value};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No biometric hardware available")]
    NoHardware,

    #[error("Requested biometric type ({0}) not available")]
    TypeUnavailable(String),

    #[error("Authentication requires a foreground activity")]
    NoActivity,

    #[error("Activity is not in a valid state")]
    InvalidActivityState,

    #[error("Authentication requires a surface able to host the prompt")]
    InvalidActivityType(String),

    #[error("Too many failed attempts. Biometric authentication is temporarily disabled.")]
    LockedOut,

    #[error("Too many failed attempts. Please authenticate with device credentials.")]
    LockedOutPermanent,

    #[error("Required biometric hardware is not available")]
    HardwareUnavailable,

    #[error("No biometrics enrolled on this device")]
    NoEnrolledBiometrics,

    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("Authentication error: {message}")]
    Authentication { code: Option<i32>, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Platform error: {0}")]
    PlatformError(#[from] PlatformError),
}

impl AuthError {
    /// Stable code reported to the application layer
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::NoHardware => "NO_HARDWARE",
            AuthError::TypeUnavailable(_) => "TYPE_UNAVAILABLE",
            AuthError::NoActivity => "NO_ACTIVITY",
            AuthError::InvalidActivityState => "INVALID_ACTIVITY_STATE",
            AuthError::InvalidActivityType(_) => "INVALID_ACTIVITY_TYPE",
            AuthError::LockedOut => "LOCKED_OUT",
            AuthError::LockedOutPermanent => "LOCKED_OUT_PERMANENT",
            AuthError::HardwareUnavailable => "HARDWARE_UNAVAILABLE",
            AuthError::NoEnrolledBiometrics => "NO_ENROLLED_BIOMETRICS",
            AuthError::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            AuthError::Authentication { .. } => "AUTHENTICATION_ERROR",
            AuthError::ConfigError(_) => "CONFIGURATION_ERROR",
            AuthError::PlatformError(_) => "PLATFORM_ERROR",
        }
    }

    /// Raw detail attached to the error, if any
    pub fn details(&self) -> Option<Value> {
        match self {
            AuthError::TypeUnavailable(modality) => Some(json!(modality)),
            AuthError::InvalidActivityType(component) => Some(json!(component)),
            AuthError::Authentication { code: Some(code), .. } => Some(json!(code)),
            _ => None,
        }
    }
}
