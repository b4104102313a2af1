//! Platform collaborators for local authentication
//!
//! This crate provides the platform layer that the authentication mediator
//! talks to: the capability oracle, the hardware feature probe, the modal
//! prompt service and the foreground surface lookup, together with the OS
//! version descriptor the probing logic branches on.

pub mod descriptor;
pub mod error;
pub mod fallback;
pub mod prompt;
pub mod traits;
pub mod types;

#[cfg(feature = "android")]
pub mod android;

#[cfg(feature = "simulator")]
pub mod simulator;


pub use descriptor::{PlatformDescriptor, PlatformTier};
pub use error::{PlatformError, PlatformResult};
pub use fallback::FallbackPlatform;
pub use prompt::{
    NoopPromptHandle, PromptCallback, PromptErrorCode, PromptEvent, PromptEvents, PromptHandle,
    PromptInfo, PromptInfoBuilder,
};
pub use traits::{CapabilityOracle, FeatureProbe, PlatformBindings, PromptService, UiContextProvider};
pub use types::{Authenticators, BiometricStatus, ForegroundContext, SurfaceLifecycle, SystemFeature};

#[cfg(feature = "android")]
pub use android::AndroidBridge;

#[cfg(feature = "simulator")]
pub use simulator::{SensorConfig, SimulatedDevice, SimulatedPrompt, SimulationConfig};

pub fn platform_name() -> &'static str {
    #[cfg(target_os = "android")]
    return "Android";

    #[cfg(target_os = "ios")]
    return "iOS";

    #[cfg(target_os = "linux")]
    return "Linux";

    #[cfg(not(any(target_os = "android", target_os = "ios", target_os = "linux")))]
    return "Unknown";
}

/// Bindings for targets without a native bridge
pub fn load_platform() -> PlatformBindings {
    FallbackPlatform::bindings()
}
