//! Modal authentication prompt
//!
//! The platform renders the prompt and reports back through a
//! [`PromptCallback`]. The callback is the sending half of a channel whose
//! receiving half, [`PromptEvents`], is drained by the mediator. Any number of
//! failed attempts may be reported before exactly one terminal event.

use std::fmt;

use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{PlatformError, PlatformResult};
use crate::types::Authenticators;

/// Prompt configuration handed to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptInfo {
    /// Title shown in the prompt
    pub title: String,
    /// Subtitle shown in the prompt
    pub subtitle: Option<String>,
    /// Description shown in the prompt
    pub description: Option<String>,
    /// Negative button label, absent when device credential is allowed
    pub negative_button_text: Option<String>,
    /// Allowed authenticators, only set on tiers with the unified oracle
    pub allowed_authenticators: Option<Authenticators>,
    /// Legacy device credential flag
    pub device_credential_allowed: bool,
}

impl PromptInfo {
    pub fn builder() -> PromptInfoBuilder {
        PromptInfoBuilder::default()
    }

    /// Whether the platform may offer PIN, pattern or password
    pub fn allows_device_credential(&self) -> bool {
        self.device_credential_allowed
            || self
                .allowed_authenticators
                .is_some_and(|a| a.contains(Authenticators::DEVICE_CREDENTIAL))
    }
}

/// Builder mirroring the platform `PromptInfo.Builder` validation rules
#[derive(Debug, Clone, Default)]
pub struct PromptInfoBuilder {
    title: String,
    subtitle: Option<String>,
    description: Option<String>,
    negative_button_text: Option<String>,
    allowed_authenticators: Option<Authenticators>,
    device_credential_allowed: bool,
}

impl PromptInfoBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn negative_button_text(mut self, text: impl Into<String>) -> Self {
        self.negative_button_text = Some(text.into());
        self
    }

    pub fn allowed_authenticators(mut self, authenticators: Authenticators) -> Self {
        self.allowed_authenticators = Some(authenticators);
        self
    }

    pub fn device_credential_allowed(mut self, allowed: bool) -> Self {
        self.device_credential_allowed = allowed;
        self
    }

    pub fn build(self) -> PlatformResult<PromptInfo> {
        if self.title.is_empty() {
            return Err(PlatformError::InvalidPromptConfig(
                "Title must be set and non-empty.".to_string(),
            ));
        }

        if let Some(authenticators) = self.allowed_authenticators {
            if authenticators.is_empty() {
                return Err(PlatformError::InvalidPromptConfig(
                    "At least one authenticator must be allowed.".to_string(),
                ));
            }
        }

        let info = PromptInfo {
            title: self.title,
            subtitle: self.subtitle,
            description: self.description,
            negative_button_text: self.negative_button_text,
            allowed_authenticators: self.allowed_authenticators,
            device_credential_allowed: self.device_credential_allowed,
        };

        let has_negative = info.negative_button_text.as_deref().is_some_and(|t| !t.is_empty());
        if info.allows_device_credential() {
            if info.negative_button_text.is_some() {
                return Err(PlatformError::InvalidPromptConfig(
                    "Negative text must not be set if device credential authentication is allowed."
                        .to_string(),
                ));
            }
        } else if !has_negative {
            return Err(PlatformError::InvalidPromptConfig(
                "Negative text must be set and non-empty.".to_string(),
            ));
        }

        Ok(info)
    }
}

/// Error code reported by the prompt's error callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptErrorCode(pub i32);

impl PromptErrorCode {
    pub const HW_UNAVAILABLE: Self = Self(1);
    pub const UNABLE_TO_PROCESS: Self = Self(2);
    pub const TIMEOUT: Self = Self(3);
    pub const NO_SPACE: Self = Self(4);
    pub const CANCELED: Self = Self(5);
    pub const LOCKOUT: Self = Self(7);
    pub const VENDOR: Self = Self(8);
    pub const LOCKOUT_PERMANENT: Self = Self(9);
    pub const USER_CANCELED: Self = Self(10);
    pub const NO_BIOMETRICS: Self = Self(11);
    pub const HW_NOT_PRESENT: Self = Self(12);
    pub const NEGATIVE_BUTTON: Self = Self(13);
    pub const NO_DEVICE_CREDENTIAL: Self = Self(14);
    pub const SECURITY_UPDATE_REQUIRED: Self = Self(15);

    pub fn code(self) -> i32 {
        self.0
    }

    /// Negative button, user cancel or system cancel
    pub fn is_user_cancellation(self) -> bool {
        matches!(self, Self::NEGATIVE_BUTTON | Self::USER_CANCELED | Self::CANCELED)
    }
}

impl fmt::Display for PromptErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event delivered by the platform for a launched prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    /// Authentication succeeded
    Succeeded,
    /// A single attempt was rejected; the prompt stays up
    Failed,
    /// The prompt ended with an error (cancellation included)
    Error { code: PromptErrorCode, message: String },
}

impl PromptEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Sending half handed to the platform
#[derive(Debug, Clone)]
pub struct PromptCallback {
    tx: mpsc::UnboundedSender<PromptEvent>,
}

/// Receiving half drained by the mediator
#[derive(Debug)]
pub struct PromptEvents {
    rx: mpsc::UnboundedReceiver<PromptEvent>,
}

impl PromptCallback {
    /// Create a connected callback / event stream pair
    pub fn channel() -> (PromptCallback, PromptEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PromptCallback { tx }, PromptEvents { rx })
    }

    pub fn on_authentication_succeeded(&self) {
        self.deliver(PromptEvent::Succeeded);
    }

    pub fn on_authentication_failed(&self) {
        self.deliver(PromptEvent::Failed);
    }

    pub fn on_authentication_error(&self, code: PromptErrorCode, message: impl Into<String>) {
        self.deliver(PromptEvent::Error { code, message: message.into() });
    }

    /// Whether the receiving side is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn deliver(&self, event: PromptEvent) {
        if self.tx.send(event).is_err() {
            trace!("Prompt event dropped, receiver closed");
        }
    }
}

impl PromptEvents {
    /// Next event, `None` once every callback clone is dropped
    pub async fn recv(&mut self) -> Option<PromptEvent> {
        self.rx.recv().await
    }
}

/// Handle to a launched prompt
pub trait PromptHandle: Send + Sync {
    /// Ask the platform to dismiss the prompt. Best effort: the terminal
    /// callback remains authoritative.
    fn cancel(&self);
}

/// Handle for platforms without a cancellation hook
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPromptHandle;

impl PromptHandle for NoopPromptHandle {
    fn cancel(&self) {}
}
