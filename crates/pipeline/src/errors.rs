//! Error types for the survey pipeline domain.
//!
//! Collaborator errors ([`CompletionError`], [`SourceError`],
//! [`ExtractionError`]) are produced by infrastructure crates behind the port
//! traits. [`StageError`] is what a stage hands back to the executor; the
//! executor logs it and substitutes the stage's empty record. No error type
//! here ever terminates a run.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// Failure of a single text-completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The call exceeded its configured deadline.
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    /// The credential was rejected.
    #[error("Unauthorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Rate limit or quota exhausted. Not retried.
    #[error("Rate limited or quota exceeded: {message}")]
    RateLimited { message: String },

    /// Any other non-success status returned by the service.
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be interpreted.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

/// Failure to resolve document locations.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The remote search endpoint failed or returned a non-success status.
    #[error("Search for '{topic}' failed: {message}")]
    Search { topic: String, message: String },

    /// The search response could not be parsed.
    #[error("Search response could not be parsed: {message}")]
    Feed { message: String },

    /// A local folder could not be read or the download directory created.
    #[error("Cannot access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to extract text from one document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extractor rejected the document's content.
    #[error("Cannot extract text from '{path}': {message}")]
    Unreadable { path: PathBuf, message: String },
}

// ---------------------------------------------------------------------------
// Stage errors
// ---------------------------------------------------------------------------

/// Failure of one LLM-backed stage.
///
/// Returned by the summarizer, synthesizer and survey writer so that the
/// executor, not the stage, decides how to degrade.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage} completion failed: {source}")]
    Completion {
        /// Agent name of the failing stage.
        stage: &'static str,
        #[source]
        source: CompletionError,
    },
}

impl StageError {
    /// Short machine-readable kind, used as `error_type` in trace events.
    pub fn kind(&self) -> &'static str {
        match self {
            StageError::Completion { source, .. } => match source {
                CompletionError::Transport { .. } => "transport",
                CompletionError::Timeout { .. } => "timeout",
                CompletionError::Unauthorized { .. } => "unauthorized",
                CompletionError::RateLimited { .. } => "rate_limited",
                CompletionError::Api { .. } => "api",
                CompletionError::MalformedResponse { .. } => "malformed_response",
            },
        }
    }
}
