//! Test-side control of simulated prompts

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::SimulationStats;
use crate::prompt::{PromptCallback, PromptErrorCode, PromptHandle, PromptInfo};
use crate::types::ForegroundContext;

/// A prompt shown by a [`super::SimulatedDevice`], driven by the test
#[derive(Clone)]
pub struct SimulatedPrompt {
    index: usize,
    surface: ForegroundContext,
    info: PromptInfo,
    callback: PromptCallback,
    cancelled: Arc<AtomicBool>,
    stats: Arc<Mutex<SimulationStats>>,
}

impl SimulatedPrompt {
    pub(super) fn new(
        index: usize,
        surface: ForegroundContext,
        info: PromptInfo,
        callback: PromptCallback,
        stats: Arc<Mutex<SimulationStats>>,
    ) -> Self {
        Self { index, surface, info, callback, cancelled: Arc::new(AtomicBool::new(false)), stats }
    }

    pub(super) fn handle(&self) -> SimulatedPromptHandle {
        SimulatedPromptHandle { prompt: self.clone() }
    }

    /// Launch order on the device
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn info(&self) -> &PromptInfo {
        &self.info
    }

    pub fn surface(&self) -> &ForegroundContext {
        &self.surface
    }

    /// Whether the prompt was dismissed through its cancel handle
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Accept the presented biometric
    pub fn succeed(&self) {
        self.callback.on_authentication_succeeded();
    }

    /// Reject one attempt; the prompt stays up
    pub fn fail_attempt(&self) {
        self.callback.on_authentication_failed();
    }

    pub fn error(&self, code: PromptErrorCode, message: impl Into<String>) {
        self.callback.on_authentication_error(code, message);
    }

    pub fn press_negative_button(&self) {
        self.error(PromptErrorCode::NEGATIVE_BUTTON, "Negative button pressed");
    }

    pub fn user_cancel(&self) {
        self.error(PromptErrorCode::USER_CANCELED, "Authentication canceled by user");
    }
}

/// Cancel handle returned from simulated launches
pub struct SimulatedPromptHandle {
    prompt: SimulatedPrompt,
}

impl PromptHandle for SimulatedPromptHandle {
    fn cancel(&self) {
        if self.prompt.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!(index = self.prompt.index, "Simulated prompt cancelled");
        self.prompt.stats.lock().prompts_cancelled += 1;
        self.prompt.error(PromptErrorCode::CANCELED, "Authentication canceled");
    }
}
