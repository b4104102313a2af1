//! Walk through the command surface against a simulated device
//!
//! Run with `RUST_LOG=debug` for the mediator's own logging.

use std::time::Duration;

use local_auth::{Arguments, LocalAuthBuilder, MethodCall, Response};
use local_auth_platform::{SensorConfig, SimulatedDevice, SimulationConfig};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let device = SimulatedDevice::new(SimulationConfig {
        face: SensorConfig::ENROLLED,
        ..Default::default()
    });
    let dispatcher = std::sync::Arc::new(
        LocalAuthBuilder::new().with_platform(device.bindings()).build()?,
    );

    for method in ["isBiometricAvailable", "getAvailabilityDetails", "getPlatformVersion"] {
        let response = dispatcher.dispatch(MethodCall::new(method)).await;
        info!("{} -> {}", method, serde_json::to_string(&response)?);
    }

    // A user who misses once, then succeeds
    let pending = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move {
            let args = Arguments::new()
                .with("reason", "Unlock your notes")
                .with("preferredType", "fingerprint");
            dispatcher.dispatch(MethodCall::new("authenticate").with_arguments(args)).await
        }
    });

    let prompt = tokio::time::timeout(Duration::from_secs(1), device.wait_for_prompt(0)).await?;
    info!(title = %prompt.info().title, "Prompt is up");
    prompt.fail_attempt();
    prompt.succeed();
    report("authenticate", pending.await?)?;

    // A second request preempts the first
    let first = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.dispatch(MethodCall::new("authenticate")).await }
    });
    device.wait_for_prompt(1).await;

    let second = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.dispatch(MethodCall::new("authenticate")).await }
    });
    report("first authenticate", first.await?)?;

    device.wait_for_prompt(2).await.press_negative_button();
    report("second authenticate", second.await?)?;

    info!(stats = ?device.stats(), "Done");
    Ok(())
}

fn report(label: &str, response: Response) -> Result<(), serde_json::Error> {
    info!("{} -> {}", label, serde_json::to_string(&response)?);
    Ok(())
}
