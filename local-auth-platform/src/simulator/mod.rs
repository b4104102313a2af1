//! Simulated biometric device
//!
//! Provides a scriptable implementation of every platform collaborator so the
//! mediator can be tested across OS tiers and sensor setups without hardware.
//! Launched prompts are recorded and driven from the test side through
//! [`SimulatedPrompt`].

mod prompt;

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, info};

use crate::{
    descriptor::PlatformDescriptor,
    error::{PlatformError, PlatformResult},
    prompt::{PromptCallback, PromptHandle, PromptInfo},
    traits::{CapabilityOracle, FeatureProbe, PlatformBindings, PromptService, UiContextProvider},
    types::{Authenticators, BiometricStatus, ForegroundContext, SystemFeature},
};

pub use self::prompt::{SimulatedPrompt, SimulatedPromptHandle};

/// State of a simulated sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorConfig {
    /// Sensor hardware is present
    pub present: bool,

    /// At least one template is enrolled
    pub enrolled: bool,
}

impl SensorConfig {
    pub const ABSENT: Self = Self { present: false, enrolled: false };
    pub const NOT_ENROLLED: Self = Self { present: true, enrolled: false };
    pub const ENROLLED: Self = Self { present: true, enrolled: true };

    fn usable(self) -> bool {
        self.present && self.enrolled
    }
}

/// Simulation configuration parameters
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Platform API level
    pub api_level: u32,

    /// Fingerprint sensor (class 3)
    pub fingerprint: SensorConfig,

    /// Face sensor
    pub face: SensorConfig,

    /// Face sensor qualifies as a strong biometric
    pub face_is_strong: bool,

    /// A PIN, pattern or password is set
    pub device_credential: bool,

    /// Current foreground surface
    pub foreground: Option<ForegroundContext>,

    /// Error returned by the next prompt launches
    pub launch_error: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            api_level: crate::descriptor::API_R,
            fingerprint: SensorConfig::ENROLLED,
            face: SensorConfig::ABSENT,
            face_is_strong: false,
            device_credential: true,
            foreground: Some(ForegroundContext::active("MainActivity")),
            launch_error: None,
        }
    }
}

/// Simulation runtime statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Capability oracle queries answered
    pub capability_queries: u64,

    /// Prompts shown
    pub prompts_launched: u64,

    /// Prompts dismissed through their cancel handle
    pub prompts_cancelled: u64,
}

struct DeviceInner {
    config: Mutex<SimulationConfig>,
    prompts: Mutex<Vec<SimulatedPrompt>>,
    stats: Arc<Mutex<SimulationStats>>,
    launched: Notify,
}

/// Scriptable device implementing every platform collaborator
#[derive(Clone)]
pub struct SimulatedDevice {
    inner: Arc<DeviceInner>,
}

impl SimulatedDevice {
    pub fn new(config: SimulationConfig) -> Self {
        info!(api_level = config.api_level, "Creating simulated device");
        Self {
            inner: Arc::new(DeviceInner {
                config: Mutex::new(config),
                prompts: Mutex::new(Vec::new()),
                stats: Arc::new(Mutex::new(SimulationStats::default())),
                launched: Notify::new(),
            }),
        }
    }

    /// Device on the given API level with default sensors
    pub fn with_api_level(api_level: u32) -> Self {
        Self::new(SimulationConfig { api_level, ..Default::default() })
    }

    pub fn descriptor(&self) -> PlatformDescriptor {
        PlatformDescriptor::from_api_level(self.inner.config.lock().api_level)
    }

    /// Bindings routing every collaborator to this device
    pub fn bindings(&self) -> PlatformBindings {
        PlatformBindings::from_platform(self.descriptor(), Arc::new(self.clone()))
    }

    /// Mutate the simulation configuration
    pub fn configure(&self, update: impl FnOnce(&mut SimulationConfig)) {
        update(&mut self.inner.config.lock());
    }

    pub fn config(&self) -> SimulationConfig {
        self.inner.config.lock().clone()
    }

    pub fn set_fingerprint(&self, sensor: SensorConfig) {
        self.configure(|c| c.fingerprint = sensor);
    }

    pub fn set_face(&self, sensor: SensorConfig) {
        self.configure(|c| c.face = sensor);
    }

    pub fn set_foreground(&self, surface: Option<ForegroundContext>) {
        self.configure(|c| c.foreground = surface);
    }

    /// Make prompt launches fail with `message`
    pub fn inject_launch_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.configure(|c| c.launch_error = Some(message));
    }

    pub fn stats(&self) -> SimulationStats {
        self.inner.stats.lock().clone()
    }

    /// Number of prompts launched so far
    pub fn prompt_count(&self) -> usize {
        self.inner.prompts.lock().len()
    }

    /// Prompt launched at position `index`
    pub fn prompt(&self, index: usize) -> Option<SimulatedPrompt> {
        self.inner.prompts.lock().get(index).cloned()
    }

    pub fn latest_prompt(&self) -> Option<SimulatedPrompt> {
        self.inner.prompts.lock().last().cloned()
    }

    /// Wait until the prompt at position `index` has been launched
    pub async fn wait_for_prompt(&self, index: usize) -> SimulatedPrompt {
        loop {
            let notified = self.inner.launched.notified();
            if let Some(prompt) = self.prompt(index) {
                return prompt;
            }
            notified.await;
        }
    }

    fn record_query(&self) {
        self.inner.stats.lock().capability_queries += 1;
    }
}

impl CapabilityOracle for SimulatedDevice {
    fn can_authenticate(&self, authenticators: Authenticators) -> PlatformResult<BiometricStatus> {
        self.record_query();
        let config = self.inner.config.lock();

        // A strong sensor also satisfies a weak request; a weak one only satisfies weak.
        let sensors = [(config.fingerprint, true), (config.face, config.face_is_strong)];
        let satisfies = |strong: bool| {
            authenticators.contains(Authenticators::BIOMETRIC_WEAK)
                || (strong && authenticators.contains(Authenticators::BIOMETRIC_STRONG))
        };

        let wants_biometric = authenticators.has_biometric();
        let wants_credential = authenticators.contains(Authenticators::DEVICE_CREDENTIAL);

        let status = if wants_biometric
            && sensors.iter().any(|(sensor, strong)| sensor.usable() && satisfies(*strong))
        {
            BiometricStatus::Success
        } else if wants_credential && config.device_credential {
            BiometricStatus::Success
        } else if wants_biometric
            && !wants_credential
            && !sensors.iter().any(|(sensor, strong)| sensor.present && satisfies(*strong))
        {
            BiometricStatus::NoHardware
        } else {
            BiometricStatus::NoneEnrolled
        };

        debug!(%authenticators, ?status, "Simulated capability query");
        Ok(status)
    }

    fn can_authenticate_legacy(&self) -> PlatformResult<BiometricStatus> {
        self.record_query();
        let config = self.inner.config.lock();
        let sensors = [config.fingerprint, config.face];

        let status = if sensors.iter().any(|s| s.usable()) {
            BiometricStatus::Success
        } else if sensors.iter().any(|s| s.present) {
            BiometricStatus::NoneEnrolled
        } else {
            BiometricStatus::NoHardware
        };
        Ok(status)
    }
}

impl FeatureProbe for SimulatedDevice {
    fn has_system_feature(&self, feature: SystemFeature) -> bool {
        let config = self.inner.config.lock();
        match feature {
            SystemFeature::Fingerprint => config.fingerprint.present,
            SystemFeature::Face => config.face.present,
        }
    }
}

impl PromptService for SimulatedDevice {
    fn launch(
        &self,
        surface: &ForegroundContext,
        info: PromptInfo,
        callback: PromptCallback,
    ) -> PlatformResult<Box<dyn PromptHandle>> {
        if let Some(message) = self.inner.config.lock().launch_error.clone() {
            return Err(PlatformError::PromptLaunch(message));
        }

        let prompt = {
            let mut prompts = self.inner.prompts.lock();
            let prompt = SimulatedPrompt::new(
                prompts.len(),
                surface.clone(),
                info,
                callback,
                self.inner.stats.clone(),
            );
            prompts.push(prompt.clone());
            prompt
        };
        self.inner.stats.lock().prompts_launched += 1;

        info!(index = prompt.index(), title = %prompt.info().title, "Simulated prompt shown");
        self.inner.launched.notify_waiters();

        Ok(Box::new(prompt.handle()))
    }
}

impl UiContextProvider for SimulatedDevice {
    fn foreground(&self) -> Option<ForegroundContext> {
        self.inner.config.lock().foreground.clone()
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}
