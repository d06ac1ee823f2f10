//! Per-document summary stage.

use std::sync::Arc;

use pipeline::{
    CompletionClient, CompletionRequest, DocumentMetadata, StageError, SummaryRecord, TraceEvent,
    TraceSink,
};
use serde_json::json;
use tracing::{debug, instrument};

use crate::prompts;

/// Turns one document's text into a [`SummaryRecord`] with a single
/// completion call.
pub struct Summarizer {
    client: Arc<dyn CompletionClient>,
    trace: Arc<dyn TraceSink>,
}

impl Summarizer {
    pub const AGENT: &'static str = "SummarizerAgent";

    pub fn new(client: Arc<dyn CompletionClient>, trace: Arc<dyn TraceSink>) -> Self {
        trace.record(TraceEvent::agent_init(Self::AGENT, None));
        Self { client, trace }
    }

    /// Summarizes `text`, of which only the first
    /// [`prompts::SUMMARY_INPUT_CHARS`] characters reach the model.
    #[instrument(skip_all, fields(document = %metadata.location))]
    pub async fn summarize(
        &self,
        text: &str,
        metadata: DocumentMetadata,
    ) -> Result<SummaryRecord, StageError> {
        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "summarize_start",
            Some(json!({ "text_length": metadata.text_chars, "metadata": &metadata })),
        ));

        let prompt = prompts::summary_prompt(text);
        let completion = self
            .client
            .complete(CompletionRequest::new(Self::AGENT, prompt))
            .await
            .map_err(|source| StageError::Completion {
                stage: Self::AGENT,
                source,
            })?;

        debug!(summary_chars = completion.text.len(), "summary received");
        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "summarize_complete",
            Some(json!({ "summary_length": completion.text.chars().count(), "metadata": &metadata })),
        ));
        Ok(SummaryRecord::new(completion.text, metadata))
    }
}
