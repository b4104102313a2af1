//! Command dispatcher
//!
//! Routes named commands from the host transport to the mediator. Arguments
//! are read with defaults only; a field of the wrong type counts as absent.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::{
    config::PromptDefaults,
    core::mediator::AuthMediator,
    error::{AuthError, AuthResult},
    types::{AuthenticationRequest, BiometricType, CapabilityQuery},
};

pub const IS_BIOMETRIC_AVAILABLE: &str = "isBiometricAvailable";
pub const GET_AVAILABILITY_DETAILS: &str = "getAvailabilityDetails";
pub const IS_BIOMETRIC_TYPE_AVAILABLE: &str = "isBiometricTypeAvailable";
pub const AUTHENTICATE: &str = "authenticate";

/// Named arguments of a command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get_str(key).unwrap_or(default).to_string()
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One inbound command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Arguments,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self { method: method.into(), arguments: Arguments::new() }
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Reply sent back over the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Response {
    Success {
        value: Value,
    },
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    /// The command name is unknown; not an error
    NotImplemented,
}

impl Response {
    pub fn success(value: impl Into<Value>) -> Self {
        Response::Success { value: value.into() }
    }

    pub fn error(err: &AuthError) -> Self {
        Response::Error {
            code: err.code().to_string(),
            message: err.to_string(),
            details: err.details(),
        }
    }

    pub fn from_result<T: Into<Value>>(result: AuthResult<T>) -> Self {
        match result {
            Ok(value) => Response::success(value),
            Err(e) => Response::error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }
}

/// Single-use response sink
#[derive(Debug)]
pub struct Responder {
    tx: oneshot::Sender<Response>,
}

impl Responder {
    pub fn channel() -> (Responder, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        (Responder { tx }, rx)
    }

    pub fn send(self, response: Response) {
        if self.tx.send(response).is_err() {
            debug!("Response dropped, transport no longer listening");
        }
    }
}

/// Seam the host transport calls into
#[async_trait]
pub trait MethodCallHandler: Send + Sync {
    /// Handle `call`; `responder` is consumed exactly once, possibly after
    /// this method has returned
    async fn handle(&self, call: MethodCall, responder: Responder);
}

/// Routes commands to the mediator
pub struct CommandDispatcher {
    mediator: Arc<AuthMediator>,
    defaults: PromptDefaults,
}

impl CommandDispatcher {
    pub fn new(mediator: Arc<AuthMediator>, defaults: PromptDefaults) -> Self {
        Self { mediator, defaults }
    }

    pub fn mediator(&self) -> &Arc<AuthMediator> {
        &self.mediator
    }

    /// Handle `call` and wait for its response
    pub async fn dispatch(&self, call: MethodCall) -> Response {
        let (responder, response) = Responder::channel();
        self.handle(call, responder).await;
        response.await.unwrap_or_else(|_| {
            Response::error(&AuthError::Authentication {
                code: None,
                message: "response sink dropped".to_string(),
            })
        })
    }

    fn authentication_request(&self, args: &Arguments) -> AuthenticationRequest {
        let defaults = &self.defaults;
        AuthenticationRequest {
            reason: args.string_or("reason", &defaults.reason),
            preferred_type: BiometricType::from_name(
                args.get_str("preferredType").unwrap_or(&defaults.preferred_type),
            ),
            title: args.string_or("title", &defaults.title),
            subtitle: args.get_str("subtitle").map(str::to_string),
            description: args.string_or("description", &defaults.description),
            cancel_button_label: args.string_or("cancelButton", &defaults.cancel_button),
            allow_device_credential: args
                .get_bool("allowDeviceCredential")
                .unwrap_or(defaults.allow_device_credential),
        }
    }
}

#[async_trait]
impl MethodCallHandler for CommandDispatcher {
    async fn handle(&self, call: MethodCall, responder: Responder) {
        debug!(method = %call.method, "Dispatching command");

        match call.method.as_str() {
            IS_BIOMETRIC_AVAILABLE => {
                let available = self.mediator.check_availability(CapabilityQuery::any_biometric());
                responder.send(Response::success(available));
            }
            GET_AVAILABILITY_DETAILS => {
                let report = self.mediator.get_detailed_availability();
                let response = serde_json::to_value(report)
                    .map(Response::success)
                    .unwrap_or_else(|e| {
                        Response::error(&AuthError::Authentication { code: None, message: e.to_string() })
                    });
                responder.send(response);
            }
            IS_BIOMETRIC_TYPE_AVAILABLE => {
                let biometric_type = BiometricType::from_name(call.arguments.get_str("type").unwrap_or("any"));
                responder.send(Response::success(self.mediator.check_modality_availability(biometric_type)));
            }
            AUTHENTICATE => {
                let request = self.authentication_request(&call.arguments);
                match self.mediator.begin_authentication(request) {
                    Ok(outcome) => {
                        tokio::spawn(async move {
                            let result = outcome.await.unwrap_or_else(|_| {
                                Err(AuthError::Authentication {
                                    code: None,
                                    message: "ceremony dropped without a result".to_string(),
                                })
                            });
                            responder.send(Response::from_result(result));
                        });
                    }
                    Err(e) => {
                        warn!(code = e.code(), "Authentication rejected: {}", e);
                        responder.send(Response::error(&e));
                    }
                }
            }
            other => {
                debug!("Unknown command '{}'", other);
                responder.send(Response::NotImplemented);
            }
        }
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher").field("mediator", &self.mediator).finish()
    }
}
