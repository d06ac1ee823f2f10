//! Structured trace events.
//!
//! A trace is an append-only side channel: components describe what they did
//! as [`TraceEvent`]s and hand them to a [`TraceSink`]. Nothing in the
//! pipeline ever reads the trace back, so a sink can never change control flow.
//!
//! Each event serialises as one flat JSON object tagged by `"event"`, with a
//! `"timestamp"` added by [`TraceRecord`]:
//!
//! ```json
//! {"event":"decision","agent":"Orchestrator","decision":"start_synthesis","reason":"...","timestamp":"2026-01-01T00:00:00Z"}
//! ```

use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;

use crate::{RunId, Timestamp, TokenUsage};

/// Longest prompt or response excerpt carried in an event, in characters.
pub const PREVIEW_CHARS: usize = 200;

/// One observable step of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    WorkflowStart {
        run_id: RunId,
        config: Value,
    },
    WorkflowComplete {
        output_file: String,
        success: bool,
    },
    AgentInit {
        agent: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        params: Option<Value>,
    },
    AgentAction {
        agent: String,
        action: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
    LlmRequest {
        agent: String,
        model: String,
        prompt_preview: String,
        prompt_length: usize,
        temperature: f32,
        seed: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_tokens: Option<u32>,
    },
    LlmResponse {
        agent: String,
        response_preview: String,
        response_length: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        tokens: Option<TokenUsage>,
        #[serde(skip_serializing_if = "Option::is_none")]
        system_fingerprint: Option<String>,
    },
    Decision {
        agent: String,
        decision: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Error {
        agent: String,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_type: Option<String>,
    },
    PdfOperation {
        agent: String,
        operation: String,
        pdf_path: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    MemoryOperation {
        operation: String,
        thread_id: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sender: Option<String>,
    },
}

impl TraceEvent {
    /// The `"event"` tag this variant serialises with.
    pub fn kind(&self) -> &'static str {
        match self {
            TraceEvent::WorkflowStart { .. } => "workflow_start",
            TraceEvent::WorkflowComplete { .. } => "workflow_complete",
            TraceEvent::AgentInit { .. } => "agent_init",
            TraceEvent::AgentAction { .. } => "agent_action",
            TraceEvent::LlmRequest { .. } => "llm_request",
            TraceEvent::LlmResponse { .. } => "llm_response",
            TraceEvent::Decision { .. } => "decision",
            TraceEvent::Error { .. } => "error",
            TraceEvent::PdfOperation { .. } => "pdf_operation",
            TraceEvent::MemoryOperation { .. } => "memory_operation",
        }
    }

    pub fn agent_init(agent: &str, params: Option<Value>) -> Self {
        TraceEvent::AgentInit {
            agent: agent.to_string(),
            params,
        }
    }

    pub fn action(agent: &str, action: &str, details: Option<Value>) -> Self {
        TraceEvent::AgentAction {
            agent: agent.to_string(),
            action: action.to_string(),
            details,
        }
    }

    pub fn decision(agent: &str, decision: &str, reason: impl Into<String>) -> Self {
        TraceEvent::Decision {
            agent: agent.to_string(),
            decision: decision.to_string(),
            reason: Some(reason.into()),
        }
    }

    pub fn error(agent: &str, error: impl Into<String>, error_type: Option<&str>) -> Self {
        TraceEvent::Error {
            agent: agent.to_string(),
            error: error.into(),
            error_type: error_type.map(str::to_string),
        }
    }
}

/// A [`TraceEvent`] stamped with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    #[serde(flatten)]
    pub event: TraceEvent,
    pub timestamp: Timestamp,
}

impl TraceRecord {
    /// Stamps `event` with the current time.
    pub fn now(event: TraceEvent) -> Self {
        Self {
            event,
            timestamp: Timestamp::now(),
        }
    }
}

/// Returns the first [`PREVIEW_CHARS`] characters of `text`, with `"..."`
/// appended when anything was cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for trace events.
///
/// Implementations must not fail from the caller's point of view: a sink that
/// cannot write reports the problem through `tracing` and drops the event.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

/// Keeps every record in memory. Used by tests and embedders that inspect a
/// run after the fact.
#[derive(Debug, Default)]
pub struct InMemoryTraceSink {
    records: Mutex<Vec<TraceRecord>>,
}

impl InMemoryTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record so far, in recording order.
    pub fn records(&self) -> Vec<TraceRecord> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the `"event"` tags of every record so far, in recording order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.records().iter().map(|r| r.event.kind()).collect()
    }
}

impl TraceSink for InMemoryTraceSink {
    fn record(&self, event: TraceEvent) {
        let record = TraceRecord::now(event);
        match self.records.lock() {
            Ok(mut guard) => guard.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
