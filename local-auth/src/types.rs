//! Core types for the authentication mediator

use std::fmt;

use local_auth_platform::Authenticators;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PromptDefaults;

/// Biometric modality requested by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiometricType {
    Fingerprint,
    Face,
    #[default]
    Any,
}

impl BiometricType {
    /// Parse the wire name; unrecognized names resolve to [`BiometricType::Any`]
    pub fn from_name(name: &str) -> Self {
        match name {
            "fingerprint" => Self::Fingerprint,
            "face" => Self::Face,
            "any" => Self::Any,
            other => {
                debug!("Unrecognized biometric type '{}', using any", other);
                Self::Any
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fingerprint => "fingerprint",
            Self::Face => "face",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for BiometricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acceptable authenticator strengths for one capability query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityQuery {
    authenticators: Authenticators,
}

impl CapabilityQuery {
    pub const fn new(authenticators: Authenticators) -> Self {
        Self { authenticators }
    }

    /// Query for any biometric strength
    pub const fn any_biometric() -> Self {
        Self::new(Authenticators::ANY_BIOMETRIC)
    }

    /// Fingerprint maps to strong, face to weak, any to both; device
    /// credential is added when fallback is requested
    pub fn for_type(biometric_type: BiometricType, allow_device_credential: bool) -> Self {
        let mut authenticators = match biometric_type {
            BiometricType::Fingerprint => Authenticators::BIOMETRIC_STRONG,
            BiometricType::Face => Authenticators::BIOMETRIC_WEAK,
            BiometricType::Any => Authenticators::ANY_BIOMETRIC,
        };
        if allow_device_credential {
            authenticators |= Authenticators::DEVICE_CREDENTIAL;
        }
        Self::new(authenticators)
    }

    pub fn authenticators(&self) -> Authenticators {
        self.authenticators
    }

    pub fn contains(&self, authenticators: Authenticators) -> bool {
        self.authenticators.contains(authenticators)
    }
}

impl From<Authenticators> for CapabilityQuery {
    fn from(authenticators: Authenticators) -> Self {
        Self::new(authenticators)
    }
}

/// Coarse strength of the best available biometric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiometricStrength {
    Strong,
    Weak,
    None,
}

/// Detailed availability, derived fresh on every query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub has_hardware: bool,
    pub has_enrolled_biometrics: bool,
    pub is_fingerprint_available: bool,
    pub is_face_available: bool,
    /// Iris is not a supported modality
    pub is_iris_available: bool,
    pub is_device_credential_available: bool,
    pub biometric_strength: BiometricStrength,
}

/// One authentication ceremony's prompt text and policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationRequest {
    /// Shown as subtitle when no subtitle is given
    pub reason: String,
    pub preferred_type: BiometricType,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub cancel_button_label: String,
    pub allow_device_credential: bool,
}

impl AuthenticationRequest {
    /// Request populated from configured defaults
    pub fn from_defaults(defaults: &PromptDefaults) -> Self {
        Self {
            reason: defaults.reason.clone(),
            preferred_type: BiometricType::from_name(&defaults.preferred_type),
            title: defaults.title.clone(),
            subtitle: None,
            description: defaults.description.clone(),
            cancel_button_label: defaults.cancel_button.clone(),
            allow_device_credential: defaults.allow_device_credential,
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn preferred_type(mut self, preferred_type: BiometricType) -> Self {
        self.preferred_type = preferred_type;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn cancel_button_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_button_label = label.into();
        self
    }

    pub fn allow_device_credential(mut self, allow: bool) -> Self {
        self.allow_device_credential = allow;
        self
    }

    /// Subtitle shown in the prompt
    pub fn resolved_subtitle(&self) -> &str {
        self.subtitle.as_deref().unwrap_or(&self.reason)
    }
}

impl Default for AuthenticationRequest {
    fn default() -> Self {
        Self::from_defaults(&PromptDefaults::default())
    }
}
