//! Survey pipeline stages and the executor that sequences them.
//!
//! This crate provides the three LLM-backed stages (summarizer, synthesizer,
//! survey writer), their prompt templates, and the [`PipelineExecutor`] that
//! drives a run from document discovery to the final survey.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls to the port traits defined
//! in the [`pipeline`] crate. They never touch the network or filesystem
//! directly and never retry.

pub mod executor;
pub mod prompts;
pub mod summarizer;
pub mod survey_writer;
pub mod synthesizer;

pub use executor::{Collaborators, PipelineExecutor, RunAbort, RunReport};
pub use summarizer::Summarizer;
pub use survey_writer::SurveyWriter;
pub use synthesizer::Synthesizer;
