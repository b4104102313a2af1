//! Test helpers for mediator and dispatcher suites

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use local_auth::{AuthConfig, AuthMediator, CommandDispatcher, LocalAuthBuilder};
use local_auth_platform::{SimulatedDevice, SimulatedPrompt, SimulationConfig};

/// How long a test waits for a prompt to show up
pub const PROMPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Simulated device wired to a dispatcher
pub struct TestHelper {
    pub device: SimulatedDevice,
    pub dispatcher: Arc<CommandDispatcher>,
}

impl TestHelper {
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self::with_auth_config(config, AuthConfig::default())
    }

    pub fn with_api_level(api_level: u32) -> Self {
        Self::with_config(SimulationConfig { api_level, ..Default::default() })
    }

    pub fn with_auth_config(config: SimulationConfig, auth_config: AuthConfig) -> Self {
        init_tracing();
        let device = SimulatedDevice::new(config);
        let dispatcher = LocalAuthBuilder::new()
            .with_platform(device.bindings())
            .with_config(auth_config)
            .build()
            .expect("Failed to build dispatcher");

        Self { device, dispatcher: Arc::new(dispatcher) }
    }

    pub fn mediator(&self) -> Arc<AuthMediator> {
        self.dispatcher.mediator().clone()
    }

    /// Wait for the prompt launched at position `index`
    pub async fn prompt(&self, index: usize) -> SimulatedPrompt {
        tokio::time::timeout(PROMPT_TIMEOUT, self.device.wait_for_prompt(index))
            .await
            .expect("Prompt was never launched")
    }
}

/// Route test logs through the test harness writer
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
