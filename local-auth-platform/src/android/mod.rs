//! Android platform implementation
//!
//! JNI bridge to `BiometricManager`, `PackageManager` and `Build.VERSION`.
//! The prompt itself and the foreground activity belong to the host, which
//! supplies its own [`PromptService`](crate::traits::PromptService) and
//! [`UiContextProvider`](crate::traits::UiContextProvider).

mod biometric;
mod system_properties;

use jni::objects::{GlobalRef, JObject};
use jni::{JNIEnv, JavaVM};
use tracing::info;

use crate::{
    descriptor::PlatformDescriptor,
    error::PlatformResult,
    traits::{CapabilityOracle, FeatureProbe},
    types::{Authenticators, BiometricStatus, SystemFeature},
};

/// Handle to the Java VM and the application context
pub struct AndroidBridge {
    vm: JavaVM,
    context: GlobalRef,
}

impl AndroidBridge {
    /// Create a bridge from the environment and context passed into a native method
    pub fn new(env: &mut JNIEnv, context: &JObject) -> PlatformResult<Self> {
        let vm = env.get_java_vm()?;
        let context = env.new_global_ref(context)?;
        info!("Android bridge initialized");
        Ok(Self { vm, context })
    }

    /// Read `Build.VERSION` into a descriptor
    pub fn descriptor(&self) -> PlatformResult<PlatformDescriptor> {
        self.with_env(system_properties::read_descriptor)
    }

    fn with_env<T>(
        &self,
        f: impl FnOnce(&mut JNIEnv, &JObject) -> jni::errors::Result<T>,
    ) -> PlatformResult<T> {
        let mut env = self.vm.attach_current_thread()?;
        Ok(f(&mut *env, self.context.as_obj())?)
    }
}

impl CapabilityOracle for AndroidBridge {
    fn can_authenticate(&self, authenticators: Authenticators) -> PlatformResult<BiometricStatus> {
        let bits = authenticators.to_android_bits();
        let code = self.with_env(|env, context| biometric::can_authenticate(env, context, bits))?;
        Ok(BiometricStatus::from_code(code))
    }

    fn can_authenticate_legacy(&self) -> PlatformResult<BiometricStatus> {
        let code = self.with_env(biometric::can_authenticate_legacy)?;
        Ok(BiometricStatus::from_code(code))
    }
}

impl FeatureProbe for AndroidBridge {
    fn has_system_feature(&self, feature: SystemFeature) -> bool {
        match self.with_env(|env, context| {
            system_properties::has_system_feature(env, context, feature.as_str())
        }) {
            Ok(present) => present,
            Err(e) => {
                tracing::warn!("Failed to probe {}: {}", feature.as_str(), e);
                false
            }
        }
    }
}
