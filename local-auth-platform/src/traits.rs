//! Core platform trait definitions

use std::sync::Arc;

use crate::{
    descriptor::PlatformDescriptor,
    error::PlatformResult,
    prompt::{PromptCallback, PromptHandle, PromptInfo},
    types::{Authenticators, BiometricStatus, ForegroundContext, SystemFeature},
};

/// Platform capability oracle (`BiometricManager`)
pub trait CapabilityOracle: Send + Sync {
    /// Whether the given authenticators can be used right now
    fn can_authenticate(&self, authenticators: Authenticators) -> PlatformResult<BiometricStatus>;

    /// General biometric usability, the only query available on legacy tiers
    fn can_authenticate_legacy(&self) -> PlatformResult<BiometricStatus>;
}

/// Direct hardware feature probe (`PackageManager.hasSystemFeature`)
pub trait FeatureProbe: Send + Sync {
    fn has_system_feature(&self, feature: SystemFeature) -> bool;
}

/// Modal authentication prompt service
pub trait PromptService: Send + Sync {
    /// Show the prompt on `surface`. Outcomes are reported through
    /// `callback`: zero or more failed attempts, then exactly one terminal
    /// event. Errors returned here mean the prompt was never shown.
    fn launch(
        &self,
        surface: &ForegroundContext,
        info: PromptInfo,
        callback: PromptCallback,
    ) -> PlatformResult<Box<dyn PromptHandle>>;
}

/// Foreground UI surface lookup
pub trait UiContextProvider: Send + Sync {
    /// The current foreground surface, if any
    fn foreground(&self) -> Option<ForegroundContext>;
}

/// Everything the mediator needs from the host platform
#[derive(Clone)]
pub struct PlatformBindings {
    /// OS version the probing logic branches on
    pub descriptor: PlatformDescriptor,

    /// Capability oracle
    pub oracle: Arc<dyn CapabilityOracle>,

    /// Hardware feature probe
    pub features: Arc<dyn FeatureProbe>,

    /// Prompt service
    pub prompt: Arc<dyn PromptService>,

    /// Foreground surface lookup
    pub ui: Arc<dyn UiContextProvider>,
}

impl PlatformBindings {
    /// Bind all four collaborators to a single implementation
    pub fn from_platform<P>(descriptor: PlatformDescriptor, platform: Arc<P>) -> Self
    where
        P: CapabilityOracle + FeatureProbe + PromptService + UiContextProvider + 'static,
    {
        Self {
            descriptor,
            oracle: platform.clone(),
            features: platform.clone(),
            prompt: platform.clone(),
            ui: platform,
        }
    }
}

impl std::fmt::Debug for PlatformBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformBindings").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}
