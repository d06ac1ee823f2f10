//! Port traits for the pipeline's external collaborators.
//!
//! Infrastructure crates implement these; the `nodes` crate consumes them as
//! `Arc<dyn Trait>`. All three are async because every real implementation
//! waits on the network or the filesystem.

use async_trait::async_trait;

use crate::{
    CompletionError, DocumentLocation, DocumentRequest, ExtractionError, ModelName, SourceError,
    Temperature, TokenUsage,
};

// ---------------------------------------------------------------------------
// Text completion
// ---------------------------------------------------------------------------

/// One prompt for the text-completion service.
///
/// Every sampling field is an optional per-call override; `None` means "use
/// the client's configured default".
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Agent name of the caller, recorded in trace events.
    pub agent: &'static str,
    pub model: Option<ModelName>,
    pub temperature: Option<Temperature>,
    pub seed: Option<u64>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(agent: &'static str, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            agent,
            model: None,
            temperature: None,
            seed: None,
            max_tokens: None,
        }
    }
}

/// The service's answer to a [`CompletionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Model that produced the answer, as reported by the service.
    pub model: String,
    pub usage: Option<TokenUsage>,
    pub system_fingerprint: Option<String>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: String::new(),
            usage: None,
            system_fingerprint: None,
        }
    }
}

/// A generative language model behind some API.
///
/// Must fail with a [`CompletionError`] rather than panic on transport or
/// quota problems. Implementations do not retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError>;

    /// The model used when a request does not override it.
    fn default_model(&self) -> &ModelName;
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Resolves a [`DocumentRequest`] into local document locations.
///
/// The returned order is the discovery order the rest of the run preserves.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn locate(&self, request: &DocumentRequest)
        -> Result<Vec<DocumentLocation>, SourceError>;
}

/// Converts one document into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, location: &DocumentLocation) -> Result<String, ExtractionError>;
}
