//! Single-flight ceremony slot
//!
//! At most one ceremony is pending per mediator. Installing a new ceremony
//! takes the previous one out of the slot atomically; resolving a ceremony
//! requires its id to still be current, so callbacks from a superseded
//! prompt fall on the floor.

use std::fmt;
use std::sync::Arc;

use local_auth_platform::{PromptErrorCode, PromptEvent, PromptEvents, PromptHandle};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Receiving end of one ceremony's outcome
pub type CeremonyOutcome = oneshot::Receiver<AuthResult<bool>>;

/// The in-flight ceremony's continuation
pub struct PendingCeremony {
    id: Uuid,
    sink: oneshot::Sender<AuthResult<bool>>,
    handle: Option<Arc<dyn PromptHandle>>,
}

impl PendingCeremony {
    pub fn new() -> (Self, CeremonyOutcome) {
        let (sink, outcome) = oneshot::channel();
        (Self { id: Uuid::new_v4(), sink, handle: None }, outcome)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Deliver the outcome, consuming the ceremony
    pub fn resolve(self, outcome: AuthResult<bool>) {
        if self.sink.send(outcome).is_err() {
            debug!(ceremony = %self.id, "Ceremony outcome dropped, caller went away");
        }
    }

    /// Resolve with `false` and dismiss the prompt if one is up
    fn preempt(self) {
        info!(ceremony = %self.id, "Preempting pending ceremony");
        let handle = self.handle.clone();
        self.resolve(Ok(false));
        if let Some(handle) = handle {
            handle.cancel();
        }
    }
}

impl fmt::Debug for PendingCeremony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCeremony")
            .field("id", &self.id)
            .field("has_prompt", &self.handle.is_some())
            .finish()
    }
}

/// Owned single-slot resource holding the pending ceremony
#[derive(Debug, Default)]
pub struct CeremonySlot {
    current: Mutex<Option<PendingCeremony>>,
}

impl CeremonySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `ceremony`, preempting whatever was pending
    pub fn install(&self, ceremony: PendingCeremony) {
        let previous = self.current.lock().replace(ceremony);
        if let Some(previous) = previous {
            previous.preempt();
        }
    }

    /// Remember the cancel handle of the launched prompt. Returns false when
    /// the ceremony is no longer current.
    pub fn attach_handle(&self, id: Uuid, handle: Arc<dyn PromptHandle>) -> bool {
        let mut current = self.current.lock();
        match current.as_mut() {
            Some(ceremony) if ceremony.id == id => {
                ceremony.handle = Some(handle);
                true
            }
            _ => false,
        }
    }

    /// Take the ceremony out of the slot if `id` is still current
    pub fn take_if(&self, id: Uuid) -> Option<PendingCeremony> {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|c| c.id == id) {
            current.take()
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.current.lock().is_some()
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current.lock().as_ref().map(|c| c.id)
    }

    /// Ask the pending prompt to dismiss itself. The ceremony stays in the
    /// slot until its terminal callback arrives.
    pub fn cancel_current(&self) -> bool {
        let handle = self.current.lock().as_ref().and_then(|c| c.handle.clone());
        match handle {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }
}

/// Map a terminal prompt error to the ceremony outcome
pub fn classify_prompt_error(code: PromptErrorCode, message: &str) -> AuthResult<bool> {
    if code.is_user_cancellation() {
        return Ok(false);
    }

    match code {
        PromptErrorCode::LOCKOUT => Err(AuthError::LockedOut),
        PromptErrorCode::LOCKOUT_PERMANENT => Err(AuthError::LockedOutPermanent),
        PromptErrorCode::HW_NOT_PRESENT => Err(AuthError::HardwareUnavailable),
        PromptErrorCode::NO_BIOMETRICS => Err(AuthError::NoEnrolledBiometrics),
        other => Err(AuthError::Authentication {
            code: Some(other.code()),
            message: format!("{} (code: {})", message, other),
        }),
    }
}

/// Drain prompt events until the terminal one, then resolve the ceremony
pub(crate) async fn watch_prompt(slot: Arc<CeremonySlot>, id: Uuid, mut events: PromptEvents) {
    let outcome = loop {
        match events.recv().await {
            Some(PromptEvent::Failed) => {
                debug!(ceremony = %id, "Biometric attempt rejected, prompt stays up");
            }
            Some(PromptEvent::Succeeded) => break Ok(true),
            Some(PromptEvent::Error { code, message }) => {
                debug!(ceremony = %id, %code, "Prompt reported error: {}", message);
                break classify_prompt_error(code, &message);
            }
            None => {
                warn!(ceremony = %id, "Prompt callback dropped without a terminal event");
                break Err(AuthError::Authentication {
                    code: None,
                    message: "prompt closed without a result".to_string(),
                });
            }
        }
    };

    match slot.take_if(id) {
        Some(ceremony) => {
            info!(ceremony = %id, ok = ?outcome.as_ref().ok(), "Ceremony resolved");
            ceremony.resolve(outcome);
        }
        None => debug!(ceremony = %id, "Ignoring outcome of superseded ceremony"),
    }
}
