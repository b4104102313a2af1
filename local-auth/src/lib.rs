//! Local biometric authentication
//!
//! This crate provides the authentication mediator that sits between an
//! application's command channel and the device's biometric subsystem:
//! capability probing across OS tiers and a single-flight ceremony state
//! machine that resolves each authentication request exactly once.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::new_without_default)]

pub mod config;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod types;

pub use config::{AuthConfig, PromptDefaults};
pub use core::api::LocalAuthBuilder;
pub use core::capability::CapabilityProbe;
pub use core::ceremony::{classify_prompt_error, CeremonyOutcome};
pub use core::mediator::AuthMediator;
pub use dispatch::{Arguments, CommandDispatcher, MethodCall, MethodCallHandler, Responder, Response};
pub use error::{AuthError, AuthResult};
pub use types::*;

// Re-export important types from the platform layer
pub use local_auth_platform::{PlatformBindings, PlatformDescriptor, PlatformError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
