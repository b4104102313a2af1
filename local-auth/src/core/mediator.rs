//! Authentication mediator
//!
//! Owns the platform bindings and the ceremony slot. Capability queries are
//! answered synchronously; an authentication ceremony checks its
//! preconditions, takes over the slot, launches the prompt and hands back a
//! receiver that yields exactly one outcome.

use std::sync::Arc;

use local_auth_platform::{
    ForegroundContext, PlatformBindings, PlatformDescriptor, PromptCallback, PromptHandle,
    PromptInfo, SurfaceLifecycle,
};
use tracing::{debug, error, info, instrument};

use super::capability::CapabilityProbe;
use super::ceremony::{watch_prompt, CeremonyOutcome, CeremonySlot, PendingCeremony};
use crate::error::{AuthError, AuthResult};
use crate::types::{AuthenticationRequest, AvailabilityReport, BiometricType, CapabilityQuery};

pub struct AuthMediator {
    bindings: PlatformBindings,
    slot: Arc<CeremonySlot>,
}

impl AuthMediator {
    pub fn new(bindings: PlatformBindings) -> Self {
        info!(
            api_level = bindings.descriptor.api_level,
            tier = ?bindings.descriptor.tier(),
            "Authentication mediator ready"
        );
        Self { bindings, slot: Arc::new(CeremonySlot::new()) }
    }

    pub fn descriptor(&self) -> &PlatformDescriptor {
        &self.bindings.descriptor
    }

    fn probe(&self) -> CapabilityProbe<'_> {
        CapabilityProbe::from_bindings(&self.bindings)
    }

    /// Whether usable, enrolled authenticators match `query`
    pub fn check_availability(&self, query: CapabilityQuery) -> bool {
        self.probe().check_availability(query)
    }

    pub fn get_detailed_availability(&self) -> AvailabilityReport {
        self.probe().detailed_availability()
    }

    pub fn check_modality_availability(&self, biometric_type: BiometricType) -> bool {
        self.probe().check_type(biometric_type)
    }

    /// Whether a ceremony is waiting for its terminal callback
    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    /// Ask the pending prompt to dismiss itself. The ceremony still resolves
    /// through the prompt's own callback.
    pub fn cancel(&self) -> bool {
        let cancelled = self.slot.cancel_current();
        debug!(cancelled, "Cancel requested");
        cancelled
    }

    /// Run one ceremony to completion
    pub async fn authenticate(&self, request: AuthenticationRequest) -> AuthResult<bool> {
        let outcome = self.begin_authentication(request)?;
        outcome.await.unwrap_or_else(|_| {
            Err(AuthError::Authentication {
                code: None,
                message: "ceremony dropped without a result".to_string(),
            })
        })
    }

    /// Start a ceremony and return the receiver for its outcome. Precondition
    /// failures are returned immediately and leave any pending ceremony alone.
    /// Must be called from within a Tokio runtime.
    #[instrument(skip_all, fields(preferred_type = %request.preferred_type))]
    pub fn begin_authentication(&self, request: AuthenticationRequest) -> AuthResult<CeremonyOutcome> {
        let surface = self.check_preconditions(&request)?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            AuthError::AuthenticationFailed(format!("No async runtime to watch the prompt: {}", e))
        })?;

        let (ceremony, outcome) = PendingCeremony::new();
        let id = ceremony.id();
        self.slot.install(ceremony);
        info!(ceremony = %id, component = %surface.component, "Ceremony started");

        let info = match self.prompt_info(&request) {
            Ok(info) => info,
            Err(e) => return Err(self.abandon(id, e)),
        };

        let (callback, events) = PromptCallback::channel();
        let handle = match self.bindings.prompt.launch(&surface, info, callback) {
            Ok(handle) => handle,
            Err(e) => return Err(self.abandon(id, e.into())),
        };

        // Preempted while launching: the prompt is up but nobody owns it
        let handle: Arc<dyn PromptHandle> = Arc::from(handle);
        if !self.slot.attach_handle(id, handle.clone()) {
            debug!(ceremony = %id, "Ceremony superseded during launch, dismissing its prompt");
            handle.cancel();
            return Ok(outcome);
        }

        // Events raised during launch are buffered in the channel
        runtime.spawn(watch_prompt(self.slot.clone(), id, events));
        Ok(outcome)
    }

    /// Checks run in a fixed order; the first failure wins
    fn check_preconditions(&self, request: &AuthenticationRequest) -> AuthResult<ForegroundContext> {
        let probe = self.probe();

        if !probe.has_hardware() || !probe.check_availability(CapabilityQuery::any_biometric()) {
            return Err(AuthError::NoHardware);
        }

        if request.preferred_type != BiometricType::Any && !probe.check_type(request.preferred_type) {
            return Err(AuthError::TypeUnavailable(request.preferred_type.to_string()));
        }

        let surface = self.bindings.ui.foreground().ok_or(AuthError::NoActivity)?;
        if surface.lifecycle != SurfaceLifecycle::Active {
            return Err(AuthError::InvalidActivityState);
        }
        if !surface.hosts_prompt {
            return Err(AuthError::InvalidActivityType(surface.component.clone()));
        }

        Ok(surface)
    }

    fn prompt_info(&self, request: &AuthenticationRequest) -> AuthResult<PromptInfo> {
        let mut builder = PromptInfo::builder()
            .title(&request.title)
            .subtitle(request.resolved_subtitle())
            .description(&request.description);

        let credential_honored =
            request.allow_device_credential && self.descriptor().supports_credential_fallback();

        if self.descriptor().has_unified_oracle() {
            let query =
                CapabilityQuery::for_type(request.preferred_type, credential_honored);
            builder = builder.allowed_authenticators(query.authenticators());
        } else {
            builder = builder.device_credential_allowed(false);
        }

        if !credential_honored {
            builder = builder.negative_button_text(&request.cancel_button_label);
        }

        builder.build().map_err(AuthError::from)
    }

    /// Drop the ceremony without it ever reaching the platform callback
    fn abandon(&self, id: uuid::Uuid, cause: AuthError) -> AuthError {
        error!(ceremony = %id, "Failed to launch prompt: {}", cause);
        drop(self.slot.take_if(id));
        AuthError::AuthenticationFailed(cause.to_string())
    }
}

impl std::fmt::Debug for AuthMediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMediator")
            .field("descriptor", &self.bindings.descriptor)
            .field("pending", &self.slot.is_pending())
            .finish()
    }
}
