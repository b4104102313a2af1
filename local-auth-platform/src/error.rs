//! Platform-specific error types

use thiserror::Error;

pub type PlatformResult<T> = Result<T, PlatformError>;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Platform not supported: {0}")]
    NotSupported(String),

    #[error("Invalid prompt configuration: {0}")]
    InvalidPromptConfig(String),

    #[error("Failed to launch authentication prompt: {0}")]
    PromptLaunch(String),

    #[error("FFI error: {0}")]
    FfiError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "android")]
impl From<jni::errors::Error> for PlatformError {
    fn from(err: jni::errors::Error) -> Self {
        PlatformError::FfiError(err.to_string())
    }
}
