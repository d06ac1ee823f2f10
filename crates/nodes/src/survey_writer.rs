//! Final survey stage.

use std::sync::Arc;

use pipeline::{
    CompletionClient, CompletionRequest, StageError, SummaryRecord, SurveyText, SynthesisRecord,
    TraceEvent, TraceSink,
};
use serde_json::json;
use tracing::instrument;

use crate::prompts;

/// Writes the mini-survey from the synthesis and the per-paper summaries,
/// citing papers as `[Paper N]`.
pub struct SurveyWriter {
    client: Arc<dyn CompletionClient>,
    trace: Arc<dyn TraceSink>,
}

impl SurveyWriter {
    pub const AGENT: &'static str = "SurveyWriterAgent";

    pub fn new(client: Arc<dyn CompletionClient>, trace: Arc<dyn TraceSink>) -> Self {
        trace.record(TraceEvent::agent_init(Self::AGENT, None));
        Self { client, trace }
    }

    /// The returned text is not checked against the word limit in the prompt.
    #[instrument(skip_all, fields(summaries = summaries.len()))]
    pub async fn write_survey(
        &self,
        synthesis: &SynthesisRecord,
        summaries: &[SummaryRecord],
    ) -> Result<SurveyText, StageError> {
        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "write_survey_start",
            Some(json!({ "num_summaries": summaries.len() })),
        ));

        let prompt = prompts::survey_prompt(synthesis, summaries);
        let completion = self
            .client
            .complete(CompletionRequest::new(Self::AGENT, prompt))
            .await
            .map_err(|source| StageError::Completion {
                stage: Self::AGENT,
                source,
            })?;

        let survey = SurveyText::new(completion.text);
        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "write_survey_complete",
            Some(json!({
                "survey_length": survey.as_str().chars().count(),
                "word_count": survey.word_count(),
            })),
        ));
        Ok(survey)
    }
}

#[cfg(test)]
mod tests {
    use pipeline::testing::{FailingClient, ScriptedClient};
    use pipeline::{DocumentLocation, DocumentMetadata, InMemoryTraceSink};

    use super::*;

    fn record(summary: &str) -> SummaryRecord {
        SummaryRecord::new(
            summary,
            DocumentMetadata {
                location: DocumentLocation::new("p.pdf"),
                text_chars: 1,
            },
        )
    }

    #[tokio::test]
    async fn returns_model_text_verbatim() {
        let client = Arc::new(ScriptedClient::new("A survey [Paper 1]."));
        let writer = SurveyWriter::new(client.clone(), Arc::new(InMemoryTraceSink::new()));

        let survey = writer
            .write_survey(&SynthesisRecord::new("gaps"), &[record("only paper")])
            .await
            .unwrap();

        assert_eq!(survey.as_str(), "A survey [Paper 1].");
        assert!(client.prompts()[0].contains("Paper 1: only paper"));
    }

    #[tokio::test]
    async fn long_output_is_not_trimmed() {
        let long = "word ".repeat(2000);
        let writer = SurveyWriter::new(
            Arc::new(ScriptedClient::new(&long)),
            Arc::new(InMemoryTraceSink::new()),
        );

        let survey = writer
            .write_survey(&SynthesisRecord::default(), &[record("x")])
            .await
            .unwrap();

        assert_eq!(survey.word_count(), 2000);
    }

    #[tokio::test]
    async fn failure_surfaces_as_stage_error() {
        let writer = SurveyWriter::new(Arc::new(FailingClient::new()), Arc::new(InMemoryTraceSink::new()));
        let result = writer.write_survey(&SynthesisRecord::default(), &[]).await;
        assert!(result.is_err());
    }
}
