//! Scripted `TextModel` for handler and pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{LlmError, TextModel};

type Responder = dyn Fn(&str, &str) -> Result<String, LlmError> + Send + Sync;

pub struct ScriptedModel {
    responder: Box<Responder>,
    healthy: bool,
    calls: AtomicUsize,
    health_checks: AtomicUsize,
}

impl ScriptedModel {
    /// `responder` receives `(prompt, system)` and returns the raw model reply.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            healthy: true,
            calls: AtomicUsize::new(0),
            health_checks: AtomicUsize::new(0),
        }
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(prompt, system)
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        if self.healthy {
            Ok(())
        } else {
            Err(LlmError::Api {
                status: 503,
                message: "upstream unavailable".to_string(),
            })
        }
    }

    fn model_name(&self) -> &str {
        "models/scripted"
    }
}
