//! Core domain for the research survey pipeline.
//!
//! This crate contains every domain concept, newtype identifier, stage record,
//! error type and port trait used throughout the workspace. Infrastructure
//! crates implement the traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business types + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RunId`, `ThreadId`, `DocumentLocation`, etc.) |
//! | [`types`] | Stage records and value types (`SummaryRecord`, `Temperature`, etc.) |
//! | [`errors`] | Collaborator and stage error types |
//! | [`ports`] | `CompletionClient`, `DocumentSource`, `TextExtractor` |
//! | [`trace`] | `TraceEvent` model and the `TraceSink` trait |
//! | [`memory`] | Bookkeeping `MessageStore` |
//! | `testing` | Stub completion clients (`testing` feature) |

pub mod errors;
pub mod identifiers;
pub mod memory;
pub mod ports;
pub mod trace;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{CompletionError, ExtractionError, SourceError, StageError};
pub use identifiers::{DocumentLocation, ModelName, RunId, ThreadId};
pub use memory::{InMemoryMessageStore, MessageStore, StoredMessage};
pub use ports::{
    Completion, CompletionClient, CompletionRequest, DocumentSource, TextExtractor,
};
pub use trace::{
    preview, InMemoryTraceSink, TraceEvent, TraceRecord, TraceSink, PREVIEW_CHARS,
};
pub use types::{
    DocumentMetadata, DocumentRequest, ParsedDocument, SummaryRecord, SurveyText,
    SynthesisRecord, Temperature, Timestamp, TokenCount, TokenUsage,
};
