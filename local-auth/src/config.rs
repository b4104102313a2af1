//! Mediator configuration

use local_auth_platform::descriptor::API_MARSHMALLOW;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Values used when a command omits an argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptDefaults {
    pub reason: String,
    pub preferred_type: String,
    pub title: String,
    pub description: String,
    pub cancel_button: String,
    pub allow_device_credential: bool,
}

impl Default for PromptDefaults {
    fn default() -> Self {
        Self {
            reason: "Authenticate".to_string(),
            preferred_type: "any".to_string(),
            title: "Authentication required".to_string(),
            description: String::new(),
            cancel_button: "Cancel".to_string(),
            allow_device_credential: false,
        }
    }
}

/// Mediator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthConfig {
    /// Defaults for the `authenticate` command
    pub prompt: PromptDefaults,

    /// Oldest platform API level the mediator accepts
    pub minimum_api_level: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { prompt: PromptDefaults::default(), minimum_api_level: API_MARSHMALLOW }
    }
}

impl AuthConfig {
    /// Parse a JSON configuration; missing fields keep their defaults
    pub fn from_json(json: &str) -> AuthResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AuthError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.prompt.title.is_empty() {
            return Err(AuthError::ConfigError("default prompt title must not be empty".to_string()));
        }
        if self.minimum_api_level < API_MARSHMALLOW {
            return Err(AuthError::ConfigError(format!(
                "minimum API level {} is below the supported floor {}",
                self.minimum_api_level, API_MARSHMALLOW
            )));
        }
        Ok(())
    }
}
