//! Stub [`CompletionClient`]s for tests in downstream crates.
//!
//! Enabled with the `testing` feature.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Completion, CompletionClient, CompletionError, CompletionRequest, ModelName};

const STUB_MODEL: &str = "stub-model";

fn stub_model() -> ModelName {
    ModelName::new(STUB_MODEL).expect("stub model name is not empty")
}

/// Answers every prompt with a fixed reply and records every request.
///
/// [`echo_after`](Self::echo_after) makes one agent's calls answer with the
/// part of the prompt that follows a marker instead, so a summary can carry
/// the document text through to later stages.
pub struct ScriptedClient {
    reply: String,
    echo: Option<(&'static str, &'static str)>,
    model: ModelName,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            echo: None,
            model: stub_model(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn echo_after(mut self, agent: &'static str, marker: &'static str) -> Self {
        self.echo = Some((agent, marker));
        self
    }

    fn requests(&self) -> std::sync::MutexGuard<'_, Vec<CompletionRequest>> {
        self.requests.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().iter().map(|r| r.prompt.clone()).collect()
    }

    pub fn prompts_for(&self, agent: &str) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r.agent == agent)
            .map(|r| r.prompt.clone())
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        let echoed = self
            .echo
            .filter(|(agent, _)| *agent == request.agent)
            .and_then(|(_, marker)| request.prompt.split_once(marker))
            .map(|(_, rest)| rest.to_string());
        let reply = echoed.unwrap_or_else(|| self.reply.clone());
        self.requests().push(request);
        Ok(Completion::text(reply))
    }

    fn default_model(&self) -> &ModelName {
        &self.model
    }
}

/// Fails every call with a transport error and counts the attempts.
pub struct FailingClient {
    model: ModelName,
    calls: AtomicUsize,
}

impl FailingClient {
    pub fn new() -> Self {
        Self {
            model: stub_model(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for FailingClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<Completion, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CompletionError::Transport {
            message: "connection refused".to_string(),
        })
    }

    fn default_model(&self) -> &ModelName {
        &self.model
    }
}
