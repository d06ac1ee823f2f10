//! The five-stage survey run.
//!
//! [`PipelineExecutor`] sequences document discovery, text extraction,
//! per-document summaries, one synthesis and one survey. Every stage after
//! discovery degrades to its empty record on failure, so a run that finds at
//! least one document always reaches the survey stage.

use std::path::Path;
use std::sync::Arc;

use pipeline::{
    CompletionClient, DocumentLocation, DocumentRequest, DocumentSource, MessageStore,
    ParsedDocument, SummaryRecord, SurveyText, SynthesisRecord, TextExtractor, ThreadId,
    TraceEvent, TraceSink,
};
use serde_json::json;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{Summarizer, SurveyWriter, Synthesizer};

/// Why a run ended before reaching the stages.
///
/// Both are ordinary outcomes: nothing is written and the caller reports
/// that no survey was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RunAbort {
    #[error("No topic or PDF folder provided")]
    NoInput,
    #[error("No PDFs found")]
    NoDocuments,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Discovery order; every later sequence follows it.
    pub documents: Vec<DocumentLocation>,
    /// One record per document, possibly with empty summary text.
    pub summaries: Vec<SummaryRecord>,
    pub synthesis: SynthesisRecord,
    pub survey: SurveyText,
}

/// The external collaborators a run needs.
pub struct Collaborators {
    pub source: Arc<dyn DocumentSource>,
    pub extractor: Arc<dyn TextExtractor>,
    pub completion: Arc<dyn CompletionClient>,
    pub trace: Arc<dyn TraceSink>,
    pub memory: Arc<dyn MessageStore>,
}

/// Runs the stages strictly one after another.
pub struct PipelineExecutor {
    source: Arc<dyn DocumentSource>,
    extractor: Arc<dyn TextExtractor>,
    summarizer: Summarizer,
    synthesizer: Synthesizer,
    survey_writer: SurveyWriter,
    trace: Arc<dyn TraceSink>,
    memory: Arc<dyn MessageStore>,
    thread: ThreadId,
}

impl PipelineExecutor {
    pub const AGENT: &'static str = "Orchestrator";

    /// Builds the three LLM stages around `collaborators.completion`.
    ///
    /// Bookkeeping messages go to `collaborators.memory` under `thread`.
    pub fn new(collaborators: Collaborators, thread: ThreadId) -> Self {
        let Collaborators {
            source,
            extractor,
            completion,
            trace,
            memory,
        } = collaborators;

        let summarizer = Summarizer::new(completion.clone(), trace.clone());
        let synthesizer = Synthesizer::new(completion.clone(), trace.clone());
        let survey_writer = SurveyWriter::new(completion.clone(), trace.clone());

        trace.record(TraceEvent::agent_init(
            Self::AGENT,
            Some(json!({
                "agents": [
                    "DocumentSource",
                    "TextExtractor",
                    Summarizer::AGENT,
                    Synthesizer::AGENT,
                    SurveyWriter::AGENT,
                ],
                "model": completion.default_model().as_str(),
                "thread_id": thread.as_str(),
            })),
        ));

        Self {
            source,
            extractor,
            summarizer,
            synthesizer,
            survey_writer,
            trace,
            memory,
            thread,
        }
    }

    /// Runs the pipeline and returns the survey, or `None` when there was no
    /// input or no document was found.
    ///
    /// A non-empty `topic` takes precedence over `folder`. The survey may be
    /// empty if every LLM stage failed.
    pub async fn run(&self, topic: Option<&str>, folder: Option<&Path>) -> Option<SurveyText> {
        self.execute(topic, folder).await.ok().map(|report| report.survey)
    }

    /// Same as [`run`](Self::run) but keeps every intermediate record.
    #[instrument(skip_all, fields(thread = %self.thread))]
    pub async fn execute(
        &self,
        topic: Option<&str>,
        folder: Option<&Path>,
    ) -> Result<RunReport, RunAbort> {
        let Some(request) = DocumentRequest::from_inputs(topic, folder) else {
            return Err(self.abort(RunAbort::NoInput));
        };

        let documents = self.locate(&request).await;
        if documents.is_empty() {
            return Err(self.abort(RunAbort::NoDocuments));
        }

        let parsed = self.parse_all(&documents).await;
        let summaries = self.summarize_all(parsed).await;
        let synthesis = self.synthesize(&summaries).await;
        let survey = self.write_survey(&synthesis, &summaries).await;

        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "workflow_steps_complete",
            Some(json!({ "total_pdfs": documents.len(), "summaries": summaries.len() })),
        ));

        Ok(RunReport {
            documents,
            summaries,
            synthesis,
            survey,
        })
    }

    fn abort(&self, reason: RunAbort) -> RunAbort {
        warn!(%reason, "run stopped before any stage");
        self.trace
            .record(TraceEvent::error(Self::AGENT, reason.to_string(), None));
        reason
    }

    // -----------------------------------------------------------------------
    // Stage 1: discovery
    // -----------------------------------------------------------------------

    async fn locate(&self, request: &DocumentRequest) -> Vec<DocumentLocation> {
        let (decision, reason) = match request {
            DocumentRequest::Topic(topic) => ("use_pdf_miner", format!("Topic provided: {topic}")),
            DocumentRequest::Folder(folder) => (
                "use_existing_pdfs",
                format!("PDF folder provided: {}", folder.display()),
            ),
        };
        info!(decision, "locating documents");
        self.trace
            .record(TraceEvent::decision(Self::AGENT, decision, reason));

        let documents = match self.source.locate(request).await {
            Ok(documents) => documents,
            Err(err) => {
                warn!(error = %err, "document source failed");
                self.trace
                    .record(TraceEvent::error(Self::AGENT, err.to_string(), Some("source")));
                Vec::new()
            }
        };

        let details = match request {
            DocumentRequest::Topic(topic) => json!({ "count": documents.len(), "topic": topic }),
            DocumentRequest::Folder(folder) => {
                json!({ "count": documents.len(), "folder": folder.display().to_string() })
            }
        };
        let action = match request {
            DocumentRequest::Topic(_) => "pdfs_mined",
            DocumentRequest::Folder(_) => "pdfs_located",
        };
        self.trace
            .record(TraceEvent::action(Self::AGENT, action, Some(details)));
        documents
    }

    // -----------------------------------------------------------------------
    // Stage 2: extraction
    // -----------------------------------------------------------------------

    async fn parse_all(&self, documents: &[DocumentLocation]) -> Vec<ParsedDocument> {
        self.trace.record(TraceEvent::decision(
            Self::AGENT,
            "start_parsing",
            format!("Processing {} PDFs", documents.len()),
        ));

        let mut parsed = Vec::with_capacity(documents.len());
        for location in documents {
            info!(document = %location, "parsing");
            let text = match self.extractor.extract(location).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(document = %location, error = %err, "extraction failed; using empty text");
                    String::new()
                }
            };
            self.note("parser", format!("Parsed {location}"));
            parsed.push(ParsedDocument::new(location.clone(), text));
        }
        parsed
    }

    // -----------------------------------------------------------------------
    // Stage 3: per-document summaries
    // -----------------------------------------------------------------------

    async fn summarize_all(&self, parsed: Vec<ParsedDocument>) -> Vec<SummaryRecord> {
        self.trace.record(TraceEvent::decision(
            Self::AGENT,
            "start_summarization",
            format!("Summarizing {} papers", parsed.len()),
        ));

        let mut summaries = Vec::with_capacity(parsed.len());
        for document in parsed {
            info!(document = %document.location, "summarizing");
            let metadata = document.metadata();
            let record = match self.summarizer.summarize(&document.text, metadata.clone()).await {
                Ok(record) => record,
                Err(err) => {
                    self.stage_failed(&err);
                    SummaryRecord::empty(metadata)
                }
            };
            self.note("summarizer", format!("Summarized {}", document.location));
            summaries.push(record);
        }
        summaries
    }

    // -----------------------------------------------------------------------
    // Stages 4 and 5: synthesis and survey
    // -----------------------------------------------------------------------

    async fn synthesize(&self, summaries: &[SummaryRecord]) -> SynthesisRecord {
        info!("synthesizing cross-paper insights and gaps");
        self.trace.record(TraceEvent::decision(
            Self::AGENT,
            "start_synthesis",
            format!("Synthesizing insights from {} summaries", summaries.len()),
        ));

        let synthesis = self
            .synthesizer
            .synthesize(summaries)
            .await
            .unwrap_or_else(|err| {
                self.stage_failed(&err);
                SynthesisRecord::default()
            });
        self.note("synthesizer", "Synthesized insights and gaps");
        synthesis
    }

    async fn write_survey(
        &self,
        synthesis: &SynthesisRecord,
        summaries: &[SummaryRecord],
    ) -> SurveyText {
        info!("generating mini-survey");
        self.trace.record(TraceEvent::decision(
            Self::AGENT,
            "start_survey_writing",
            "All summaries and synthesis complete",
        ));

        let survey = self
            .survey_writer
            .write_survey(synthesis, summaries)
            .await
            .unwrap_or_else(|err| {
                self.stage_failed(&err);
                SurveyText::default()
            });
        self.note("survey_writer", "Generated mini-survey");
        survey
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn stage_failed(&self, err: &pipeline::StageError) {
        warn!(error = %err, "stage failed; continuing with empty result");
        let stage = match err {
            pipeline::StageError::Completion { stage, .. } => *stage,
        };
        self.trace
            .record(TraceEvent::error(stage, err.to_string(), Some(err.kind())));
    }

    fn note(&self, sender: &str, message: impl Into<String>) {
        let message = message.into();
        self.memory.store_message(&self.thread, sender, &message);
        self.trace.record(TraceEvent::MemoryOperation {
            operation: "store".to_string(),
            thread_id: self.thread.to_string(),
            message,
            sender: Some(sender.to_string()),
        });
    }
}
