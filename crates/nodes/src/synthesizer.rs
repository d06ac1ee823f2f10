//! Cross-document synthesis stage.

use std::sync::Arc;

use pipeline::{
    CompletionClient, CompletionRequest, StageError, SummaryRecord, SynthesisRecord, TraceEvent,
    TraceSink,
};
use serde_json::json;
use tracing::instrument;

use crate::prompts;

/// Distils all summaries into one [`SynthesisRecord`] of insights and gaps.
pub struct Synthesizer {
    client: Arc<dyn CompletionClient>,
    trace: Arc<dyn TraceSink>,
}

impl Synthesizer {
    pub const AGENT: &'static str = "SynthesizerAgent";

    pub fn new(client: Arc<dyn CompletionClient>, trace: Arc<dyn TraceSink>) -> Self {
        trace.record(TraceEvent::agent_init(Self::AGENT, None));
        Self { client, trace }
    }

    #[instrument(skip_all, fields(summaries = summaries.len()))]
    pub async fn synthesize(
        &self,
        summaries: &[SummaryRecord],
    ) -> Result<SynthesisRecord, StageError> {
        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "synthesize_start",
            Some(json!({ "num_summaries": summaries.len() })),
        ));

        let prompt = prompts::synthesis_prompt(summaries);
        let completion = self
            .client
            .complete(CompletionRequest::new(Self::AGENT, prompt))
            .await
            .map_err(|source| StageError::Completion {
                stage: Self::AGENT,
                source,
            })?;

        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "synthesize_complete",
            Some(json!({ "synthesis_length": completion.text.chars().count() })),
        ));
        Ok(SynthesisRecord::new(completion.text))
    }
}
