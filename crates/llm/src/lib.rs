//! LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::CompletionClient`] trait for any OpenAI-compatible
//! chat-completions endpoint. Additional providers are added as new `impl`
//! blocks in this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response parsing
//! and status-code classification live here. The [`pipeline`] crate sees only
//! [`pipeline::CompletionClient`].
//!
//! Calls are never retried. Each one is bounded by the configured request
//! timeout. Every request and every successful response is recorded to the
//! trace sink; failures are only logged here and traced by the calling stage.

mod openai;

pub use openai::{OpenAiConfig, OpenAiProvider, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS};
