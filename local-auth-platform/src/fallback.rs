//! Fallback platform for hosts without a biometric subsystem
//!
//! Used on targets the crate has no bridge for (iOS is still a stub). Every
//! capability query reports no hardware and prompts never launch.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    descriptor::PlatformDescriptor,
    error::{PlatformError, PlatformResult},
    prompt::{PromptCallback, PromptHandle, PromptInfo},
    traits::{CapabilityOracle, FeatureProbe, PlatformBindings, PromptService, UiContextProvider},
    types::{Authenticators, BiometricStatus, ForegroundContext, SystemFeature},
};

/// Fallback platform implementation for unsupported platforms
#[derive(Debug, Default)]
pub struct FallbackPlatform;

impl FallbackPlatform {
    pub fn new() -> Self {
        info!("Initializing fallback platform");
        Self
    }

    /// Bindings reporting no capability at all
    pub fn bindings() -> PlatformBindings {
        PlatformBindings::from_platform(PlatformDescriptor::default(), Arc::new(Self::new()))
    }
}

impl CapabilityOracle for FallbackPlatform {
    fn can_authenticate(&self, authenticators: Authenticators) -> PlatformResult<BiometricStatus> {
        debug!(%authenticators, "Capability query on fallback platform");
        Ok(BiometricStatus::NoHardware)
    }

    fn can_authenticate_legacy(&self) -> PlatformResult<BiometricStatus> {
        Ok(BiometricStatus::NoHardware)
    }
}

impl FeatureProbe for FallbackPlatform {
    fn has_system_feature(&self, _feature: SystemFeature) -> bool {
        false
    }
}

impl PromptService for FallbackPlatform {
    fn launch(
        &self,
        _surface: &ForegroundContext,
        _info: PromptInfo,
        _callback: PromptCallback,
    ) -> PlatformResult<Box<dyn PromptHandle>> {
        Err(PlatformError::NotSupported(format!(
            "Authentication prompt not available on {}",
            crate::platform_name()
        )))
    }
}

impl UiContextProvider for FallbackPlatform {
    fn foreground(&self) -> Option<ForegroundContext> {
        None
    }
}
