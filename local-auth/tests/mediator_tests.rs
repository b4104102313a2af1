//! Ceremony state machine tests against the simulated device

mod helpers;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use helpers::TestHelper;
use local_auth::{AuthError, AuthenticationRequest, BiometricStrength, BiometricType};
use local_auth_platform::{
    Authenticators, ForegroundContext, NoopPromptHandle, PlatformBindings, PlatformResult,
    PromptCallback, PromptErrorCode, PromptHandle, PromptInfo, PromptService, SensorConfig,
    SimulatedDevice, SimulationConfig, SurfaceLifecycle,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Let spawned watcher tasks drain their channels
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn request() -> AuthenticationRequest {
    AuthenticationRequest::default()
}

#[tokio::test]
async fn test_successful_ceremony() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let task = tokio::spawn({
        let mediator = mediator.clone();
        async move { mediator.authenticate(request().reason("Unlock notes")).await }
    });

    let prompt = helper.prompt(0).await;
    assert_eq!(prompt.info().subtitle.as_deref(), Some("Unlock notes"));
    assert_eq!(prompt.surface().component, "MainActivity");
    prompt.succeed();

    assert!(task.await.unwrap().unwrap());
    assert!(!mediator.is_pending());
}

#[tokio::test]
async fn test_new_ceremony_preempts_pending_one() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let mut first = mediator.begin_authentication(request()).unwrap();
    let first_prompt = helper.prompt(0).await;

    let second = mediator.begin_authentication(request().title("Second")).unwrap();

    // The first ceremony is resolved before the second prompt goes up
    assert!(matches!(first.try_recv(), Ok(Ok(false))));
    assert!(first_prompt.is_cancelled());
    assert_eq!(helper.device.prompt_count(), 2);
    assert_eq!(helper.device.stats().prompts_cancelled, 1);

    settle().await;
    assert!(mediator.is_pending());

    let second_prompt = helper.prompt(1).await;
    assert_eq!(second_prompt.info().title, "Second");
    second_prompt.succeed();

    assert!(second.await.unwrap().unwrap());
    assert!(!mediator.is_pending());
}

#[tokio::test]
async fn test_stale_callback_does_not_resolve_new_ceremony() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let _first = mediator.begin_authentication(request()).unwrap();
    let first_prompt = helper.prompt(0).await;
    let mut second = mediator.begin_authentication(request()).unwrap();

    first_prompt.succeed();
    first_prompt.error(PromptErrorCode::LOCKOUT, "Too many attempts");
    settle().await;

    assert!(matches!(second.try_recv(), Err(TryRecvError::Empty)));
    assert!(mediator.is_pending());

    helper.prompt(1).await.press_negative_button();
    assert!(!second.await.unwrap().unwrap());
}

#[tokio::test]
async fn test_failed_attempts_do_not_resolve() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let mut outcome = mediator.begin_authentication(request()).unwrap();
    let prompt = helper.prompt(0).await;

    prompt.fail_attempt();
    prompt.fail_attempt();
    prompt.fail_attempt();
    settle().await;

    assert!(matches!(outcome.try_recv(), Err(TryRecvError::Empty)));
    assert!(mediator.is_pending());

    prompt.succeed();
    assert!(outcome.await.unwrap().unwrap());
}

#[tokio::test]
async fn test_user_cancellation_resolves_false() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let outcome = mediator.begin_authentication(request()).unwrap();
    helper.prompt(0).await.press_negative_button();
    assert!(!outcome.await.unwrap().unwrap());

    let outcome = mediator.begin_authentication(request()).unwrap();
    helper.prompt(1).await.user_cancel();
    assert!(!outcome.await.unwrap().unwrap());
}

#[tokio::test]
async fn test_terminal_error_mapping() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let cases = [
        (PromptErrorCode::LOCKOUT, "LOCKED_OUT"),
        (PromptErrorCode::LOCKOUT_PERMANENT, "LOCKED_OUT_PERMANENT"),
        (PromptErrorCode::HW_NOT_PRESENT, "HARDWARE_UNAVAILABLE"),
        (PromptErrorCode::NO_BIOMETRICS, "NO_ENROLLED_BIOMETRICS"),
        (PromptErrorCode::TIMEOUT, "AUTHENTICATION_ERROR"),
        (PromptErrorCode::VENDOR, "AUTHENTICATION_ERROR"),
    ];

    for (index, (code, expected)) in cases.into_iter().enumerate() {
        let outcome = mediator.begin_authentication(request()).unwrap();
        helper.prompt(index).await.error(code, "platform message");

        let err = outcome.await.unwrap().unwrap_err();
        assert_eq!(err.code(), expected, "prompt error code {}", code);
    }
}

#[tokio::test]
async fn test_unmapped_error_carries_code_and_message() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let outcome = mediator.begin_authentication(request()).unwrap();
    helper.prompt(0).await.error(PromptErrorCode::TIMEOUT, "Timed out");

    match outcome.await.unwrap() {
        Err(AuthError::Authentication { code, message }) => {
            assert_eq!(code, Some(3));
            assert_eq!(message, "Timed out (code: 3)");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_unavailable_modality_never_launches_prompt() {
    let helper = TestHelper::with_config(SimulationConfig {
        fingerprint: SensorConfig::ABSENT,
        face: SensorConfig::ENROLLED,
        ..Default::default()
    });
    let mediator = helper.mediator();

    let err = mediator
        .authenticate(request().preferred_type(BiometricType::Fingerprint))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TYPE_UNAVAILABLE");
    assert_eq!(err.details(), Some(serde_json::json!("fingerprint")));
    assert_eq!(helper.device.prompt_count(), 0);
    assert!(!mediator.is_pending());
}

#[tokio::test]
async fn test_nothing_enrolled_is_no_hardware_for_every_type() {
    let helper = TestHelper::with_config(SimulationConfig {
        fingerprint: SensorConfig::NOT_ENROLLED,
        face: SensorConfig::NOT_ENROLLED,
        ..Default::default()
    });
    let mediator = helper.mediator();

    for preferred in [BiometricType::Any, BiometricType::Fingerprint, BiometricType::Face] {
        let err = mediator.authenticate(request().preferred_type(preferred)).await.unwrap_err();
        assert_eq!(err.code(), "NO_HARDWARE");
    }
    assert_eq!(helper.device.prompt_count(), 0);
}

#[tokio::test]
async fn test_surface_preconditions() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    helper.device.set_foreground(None);
    assert_eq!(mediator.authenticate(request()).await.unwrap_err().code(), "NO_ACTIVITY");

    helper.device.set_foreground(Some(
        ForegroundContext::active("MainActivity").with_lifecycle(SurfaceLifecycle::Destroyed),
    ));
    assert_eq!(mediator.authenticate(request()).await.unwrap_err().code(), "INVALID_ACTIVITY_STATE");

    helper.device.set_foreground(Some(
        ForegroundContext::active("com.example.PlainActivity").with_prompt_support(false),
    ));
    let err = mediator.authenticate(request()).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_ACTIVITY_TYPE");
    assert_eq!(err.details(), Some(serde_json::json!("com.example.PlainActivity")));

    assert_eq!(helper.device.prompt_count(), 0);
}

#[tokio::test]
async fn test_rejected_request_leaves_pending_ceremony() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let outcome = mediator.begin_authentication(request()).unwrap();
    let prompt = helper.prompt(0).await;

    helper.device.set_foreground(None);
    let err = mediator.begin_authentication(request()).unwrap_err();
    assert_eq!(err.code(), "NO_ACTIVITY");
    assert!(mediator.is_pending());
    assert!(!prompt.is_cancelled());

    prompt.succeed();
    assert!(outcome.await.unwrap().unwrap());
}

#[tokio::test]
async fn test_launch_failure_discards_ceremony() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    helper.device.inject_launch_error("window token gone");
    let err = mediator.authenticate(request()).await.unwrap_err();
    assert_eq!(err.code(), "AUTHENTICATION_FAILED");
    assert!(err.to_string().contains("window token gone"));
    assert!(!mediator.is_pending());

    helper.device.configure(|c| c.launch_error = None);
    let outcome = mediator.begin_authentication(request()).unwrap();
    helper.prompt(0).await.succeed();
    assert!(outcome.await.unwrap().unwrap());
}

#[tokio::test]
async fn test_invalid_prompt_text_is_authentication_failed() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let err = mediator.authenticate(request().title("")).await.unwrap_err();
    assert_eq!(err.code(), "AUTHENTICATION_FAILED");
    assert!(!mediator.is_pending());
    assert_eq!(helper.device.prompt_count(), 0);
}

#[tokio::test]
async fn test_device_credential_only_on_unified_tier() {
    let unified = TestHelper::with_api_level(30);
    let outcome = unified
        .mediator()
        .begin_authentication(request().allow_device_credential(true))
        .unwrap();
    let prompt = unified.prompt(0).await;
    assert!(prompt.info().allows_device_credential());
    assert!(prompt.info().negative_button_text.is_none());
    prompt.succeed();
    assert!(outcome.await.unwrap().unwrap());

    for api_level in [23, 28, 29] {
        let legacy = TestHelper::with_api_level(api_level);
        let outcome = legacy
            .mediator()
            .begin_authentication(request().allow_device_credential(true))
            .unwrap();
        let prompt = legacy.prompt(0).await;
        assert!(!prompt.info().allows_device_credential());
        assert!(prompt.info().allowed_authenticators.is_none());
        assert_eq!(prompt.info().negative_button_text.as_deref(), Some("Cancel"));
        prompt.user_cancel();
        assert!(!outcome.await.unwrap().unwrap());
    }
}

#[tokio::test]
async fn test_prompt_authenticators_follow_preferred_type() {
    let helper = TestHelper::with_config(SimulationConfig {
        face: SensorConfig::ENROLLED,
        ..Default::default()
    });
    let mediator = helper.mediator();

    let expected = [
        (BiometricType::Fingerprint, Authenticators::BIOMETRIC_STRONG),
        (BiometricType::Face, Authenticators::BIOMETRIC_WEAK),
        (BiometricType::Any, Authenticators::ANY_BIOMETRIC),
    ];
    for (index, (preferred, authenticators)) in expected.into_iter().enumerate() {
        let outcome = mediator.begin_authentication(request().preferred_type(preferred)).unwrap();
        let prompt = helper.prompt(index).await;
        assert_eq!(prompt.info().allowed_authenticators, Some(authenticators));
        prompt.press_negative_button();
        assert!(!outcome.await.unwrap().unwrap());
    }
}

#[tokio::test]
async fn test_legacy_face_requires_q() {
    let config = SimulationConfig {
        fingerprint: SensorConfig::ENROLLED,
        face: SensorConfig::ENROLLED,
        ..Default::default()
    };

    let pie = TestHelper::with_config(SimulationConfig { api_level: 28, ..config.clone() });
    let err = pie
        .mediator()
        .authenticate(request().preferred_type(BiometricType::Face))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TYPE_UNAVAILABLE");

    let q = TestHelper::with_config(SimulationConfig { api_level: 29, ..config });
    let outcome = q
        .mediator()
        .begin_authentication(request().preferred_type(BiometricType::Face))
        .unwrap();
    q.prompt(0).await.succeed();
    assert!(outcome.await.unwrap().unwrap());
}

#[tokio::test]
async fn test_legacy_face_only_device_is_no_hardware() {
    let helper = TestHelper::with_config(SimulationConfig {
        api_level: 29,
        fingerprint: SensorConfig::ABSENT,
        face: SensorConfig::ENROLLED,
        ..Default::default()
    });
    let mediator = helper.mediator();

    // The combined query is decided by the fingerprint sensor on legacy tiers
    assert!(!mediator.check_availability(local_auth::CapabilityQuery::any_biometric()));
    assert!(mediator.check_modality_availability(BiometricType::Face));

    let err = mediator
        .authenticate(request().preferred_type(BiometricType::Face))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NO_HARDWARE");
    assert_eq!(helper.device.prompt_count(), 0);
}

#[tokio::test]
async fn test_cancel_is_cooperative() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();
    assert!(!mediator.cancel());

    let outcome = mediator.begin_authentication(request()).unwrap();
    let prompt = helper.prompt(0).await;
    assert!(mediator.cancel());
    assert!(prompt.is_cancelled());

    assert!(!outcome.await.unwrap().unwrap());
    assert!(!mediator.is_pending());
}

#[tokio::test]
async fn test_strength_tracks_enrollment() {
    let helper = TestHelper::with_config(SimulationConfig {
        face: SensorConfig::ENROLLED,
        ..Default::default()
    });
    let mediator = helper.mediator();
    assert_eq!(mediator.get_detailed_availability().biometric_strength, BiometricStrength::Strong);

    helper.device.set_fingerprint(SensorConfig::NOT_ENROLLED);
    assert_eq!(mediator.get_detailed_availability().biometric_strength, BiometricStrength::Weak);

    helper.device.set_face(SensorConfig::NOT_ENROLLED);
    let report = mediator.get_detailed_availability();
    assert_eq!(report.biometric_strength, BiometricStrength::None);
    assert!(report.has_hardware);
    assert!(!report.has_enrolled_biometrics);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_callbacks_from_another_thread() {
    let helper = TestHelper::new();
    let mediator = helper.mediator();

    let outcome = mediator.begin_authentication(request()).unwrap();
    let prompt = helper.prompt(0).await;

    std::thread::spawn(move || {
        prompt.fail_attempt();
        prompt.succeed();
    })
    .join()
    .unwrap();

    assert!(outcome.await.unwrap().unwrap());
}

/// Prompt service that drops the callback without ever reporting
struct SilentPromptService;

impl PromptService for SilentPromptService {
    fn launch(
        &self,
        _surface: &ForegroundContext,
        _info: PromptInfo,
        callback: PromptCallback,
    ) -> PlatformResult<Box<dyn PromptHandle>> {
        drop(callback);
        Ok(Box::new(NoopPromptHandle))
    }
}

#[tokio::test]
async fn test_dropped_callback_resolves_with_error() {
    let device = SimulatedDevice::default();
    let bindings = PlatformBindings {
        prompt: Arc::new(SilentPromptService),
        ..device.bindings()
    };
    let mediator = local_auth::AuthMediator::new(bindings);

    let err = mediator.authenticate(request()).await.unwrap_err();
    assert_eq!(err.code(), "AUTHENTICATION_ERROR");
    assert_eq!(err.details(), None);
    assert!(!mediator.is_pending());
}

/// Prompt service whose first launch blocks until released
struct GatedPromptService {
    entered: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<std::sync::mpsc::Receiver<()>>>,
    prompts: Mutex<Vec<(Arc<AtomicBool>, PromptCallback)>>,
}

struct FlagHandle(Arc<AtomicBool>);

impl PromptHandle for FlagHandle {
    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl PromptService for GatedPromptService {
    fn launch(
        &self,
        _surface: &ForegroundContext,
        _info: PromptInfo,
        callback: PromptCallback,
    ) -> PlatformResult<Box<dyn PromptHandle>> {
        let gate = self.release.lock().take();
        if let Some(release) = gate {
            if let Some(entered) = self.entered.lock().take() {
                let _ = entered.send(());
            }
            let _ = release.recv();
        }

        let shown = Arc::new(AtomicBool::new(false));
        self.prompts.lock().push((shown.clone(), callback));
        Ok(Box::new(FlagHandle(shown)))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_preemption_during_launch_dismisses_prompt() {
    let device = SimulatedDevice::default();
    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel();
    let service = Arc::new(GatedPromptService {
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(Some(release_rx)),
        prompts: Mutex::new(Vec::new()),
    });
    let bindings = PlatformBindings { prompt: service.clone(), ..device.bindings() };
    let mediator = Arc::new(local_auth::AuthMediator::new(bindings));

    // The first ceremony is stuck inside launch
    let first = tokio::task::spawn_blocking({
        let mediator = mediator.clone();
        move || mediator.begin_authentication(request())
    });
    entered_rx.await.unwrap();

    let second = mediator.begin_authentication(request()).unwrap();
    release_tx.send(()).unwrap();

    let first = first.await.unwrap().unwrap();
    assert!(!first.await.unwrap().unwrap());

    {
        let prompts = service.prompts.lock();
        assert_eq!(prompts.len(), 2);
        // Second launch finished first
        assert!(!prompts[0].0.load(Ordering::SeqCst));
        assert!(prompts[1].0.load(Ordering::SeqCst));
    }
    assert!(mediator.is_pending());

    service.prompts.lock()[0].1.on_authentication_succeeded();
    assert!(second.await.unwrap().unwrap());
    assert!(!mediator.is_pending());
}
