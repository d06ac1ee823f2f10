//! Shared value types for the survey pipeline domain.
//!
//! The record types here are the data contracts between stages: one
//! [`ParsedDocument`] and one [`SummaryRecord`] per discovered document, then
//! exactly one [`SynthesisRecord`] and one [`SurveyText`] per run. Each record
//! has an "empty" form that a stage degrades to when its collaborator fails.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DocumentLocation;

// ---------------------------------------------------------------------------
// Input selection
// ---------------------------------------------------------------------------

/// What a [`crate::DocumentSource`] is asked to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRequest {
    /// Search remotely for papers on a topic and download them.
    Topic(String),
    /// List the PDF files already present in a local folder.
    Folder(PathBuf),
}

impl DocumentRequest {
    /// Builds a request from the two optional inputs of a run.
    ///
    /// Any non-empty `topic` takes precedence over `folder`, including one
    /// made only of whitespace. Returns `None` when neither is usable.
    pub fn from_inputs(topic: Option<&str>, folder: Option<&std::path::Path>) -> Option<Self> {
        match (topic, folder) {
            (Some(t), _) if !t.is_empty() => Some(Self::Topic(t.to_string())),
            (_, Some(f)) if !f.as_os_str().is_empty() => Some(Self::Folder(f.to_path_buf())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage records
// ---------------------------------------------------------------------------

/// Text extracted from one document. `text` is empty when extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub location: DocumentLocation,
    pub text: String,
}

impl ParsedDocument {
    pub fn new(location: DocumentLocation, text: impl Into<String>) -> Self {
        Self {
            location,
            text: text.into(),
        }
    }

    /// Returns the metadata carried forward into the summary record.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            location: self.location.clone(),
            text_chars: self.text.chars().count(),
        }
    }
}

/// Metadata attached to a [`SummaryRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// The document the summary was produced from.
    pub location: DocumentLocation,
    /// Number of characters of extracted text before any truncation.
    pub text_chars: usize,
}

/// Per-document summary. The summary text is opaque model output; it is
/// never parsed into its requested fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub summary: String,
    pub metadata: DocumentMetadata,
}

impl SummaryRecord {
    pub fn new(summary: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            summary: summary.into(),
            metadata,
        }
    }

    /// The degraded form: no summary text, same metadata.
    pub fn empty(metadata: DocumentMetadata) -> Self {
        Self::new(String::new(), metadata)
    }

    /// Returns `true` when there is no summary text to feed into later prompts.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }
}

/// Cross-document insights and gaps. Exactly one per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRecord {
    pub synthesis: String,
}

impl SynthesisRecord {
    pub fn new(synthesis: impl Into<String>) -> Self {
        Self {
            synthesis: synthesis.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.synthesis.is_empty()
    }
}

/// The final survey, written verbatim to the output file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyText(String);

impl SurveyText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whitespace-separated word count, reported in trace events only.
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

impl std::fmt::Display for SurveyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Token accounting
// ---------------------------------------------------------------------------

/// Number of tokens consumed in an LLM API call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenCount(u64);

impl TokenCount {
    /// Creates a [`TokenCount`] from a raw integer.
    pub fn new(count: u64) -> Self {
        Self(count)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TokenCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token usage reported by the completion service for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt: TokenCount,
    pub completion: TokenCount,
    pub total: TokenCount,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Sampling temperature in the range `[0.0, 2.0]`.
///
/// Passed through to the completion service unchanged. A fixed temperature
/// and seed do not guarantee identical output across runs.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(f32);

impl Temperature {
    /// Creates a [`Temperature`], returning `None` if `value` is outside
    /// `[0.0, 2.0]` or not finite.
    #[must_use]
    pub fn new(value: f32) -> Option<Self> {
        if value.is_finite() && (0.0..=2.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn as_f32(self) -> f32 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self(0.0)
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn topic_takes_precedence_over_folder() {
        let request = DocumentRequest::from_inputs(Some("graph neural networks"), Some(Path::new("pdfs")));
        assert_eq!(
            request,
            Some(DocumentRequest::Topic("graph neural networks".to_string()))
        );
    }

    #[test]
    fn folder_is_used_when_topic_is_absent() {
        let request = DocumentRequest::from_inputs(None, Some(Path::new("pdfs")));
        assert_eq!(request, Some(DocumentRequest::Folder(PathBuf::from("pdfs"))));
    }

    #[test]
    fn empty_topic_falls_back_to_folder() {
        let request = DocumentRequest::from_inputs(Some(""), Some(Path::new("pdfs")));
        assert_eq!(request, Some(DocumentRequest::Folder(PathBuf::from("pdfs"))));
    }

    #[test]
    fn whitespace_topic_still_counts_as_a_topic() {
        let request = DocumentRequest::from_inputs(Some("   "), None);
        assert_eq!(request, Some(DocumentRequest::Topic("   ".to_string())));
    }

    #[test]
    fn no_inputs_yields_no_request() {
        assert_eq!(DocumentRequest::from_inputs(None, None), None);
    }

    #[test]
    fn metadata_counts_characters_not_bytes() {
        let doc = ParsedDocument::new(DocumentLocation::new("a.pdf"), "héllo");
        assert_eq!(doc.metadata().text_chars, 5);
    }

    #[test]
    fn temperature_rejects_out_of_range_values() {
        assert!(Temperature::new(-0.1).is_none());
        assert!(Temperature::new(2.5).is_none());
        assert!(Temperature::new(f32::NAN).is_none());
        assert_eq!(Temperature::new(0.7).map(Temperature::as_f32), Some(0.7));
    }

    #[test]
    fn survey_word_count_splits_on_whitespace() {
        assert_eq!(SurveyText::new("one two\nthree").word_count(), 3);
        assert_eq!(SurveyText::default().word_count(), 0);
    }
}
