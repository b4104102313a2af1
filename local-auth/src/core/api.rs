//! Builder wiring platform bindings and configuration into a dispatcher

use std::sync::Arc;

use local_auth_platform::{load_platform, PlatformBindings, PlatformError};
use tracing::{debug, info};

use crate::{
    config::AuthConfig,
    core::mediator::AuthMediator,
    dispatch::CommandDispatcher,
    error::{AuthError, AuthResult},
};

pub struct LocalAuthBuilder {
    bindings: Option<PlatformBindings>,
    config: AuthConfig,
}

impl LocalAuthBuilder {
    pub fn new() -> Self {
        Self { bindings: None, config: AuthConfig::default() }
    }

    /// Use explicit platform bindings instead of the target default
    pub fn with_platform(mut self, bindings: PlatformBindings) -> Self {
        self.bindings = Some(bindings);
        self
    }

    pub fn with_config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build_mediator(self) -> AuthResult<AuthMediator> {
        let (mediator, _) = self.into_parts()?;
        Ok(mediator)
    }

    pub fn build(self) -> AuthResult<CommandDispatcher> {
        let (mediator, config) = self.into_parts()?;
        Ok(CommandDispatcher::new(Arc::new(mediator), config.prompt))
    }

    fn into_parts(self) -> AuthResult<(AuthMediator, AuthConfig)> {
        self.config.validate()?;

        let bindings = match self.bindings {
            Some(bindings) => bindings,
            None => {
                debug!("No platform bindings given, loading {}", local_auth_platform::platform_name());
                load_platform()
            }
        };

        let api_level = bindings.descriptor.api_level;
        if api_level < self.config.minimum_api_level {
            return Err(AuthError::PlatformError(PlatformError::NotSupported(format!(
                "API level {} is below the configured minimum {}",
                api_level, self.config.minimum_api_level
            ))));
        }

        info!(api_level, "Building local authentication");
        Ok((AuthMediator::new(bindings), self.config))
    }
}

impl Default for LocalAuthBuilder {
    fn default() -> Self {
        Self::new()
    }
}
