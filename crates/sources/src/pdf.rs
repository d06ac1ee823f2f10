//! PDF text extraction via `pdf-extract`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{DocumentLocation, ExtractionError, TextExtractor, TraceEvent, TraceSink};
use serde_json::json;
use tracing::{debug, warn};

/// Extracts the text of every page of a PDF file.
pub struct PdfTextExtractor {
    trace: Arc<dyn TraceSink>,
}

impl PdfTextExtractor {
    pub const AGENT: &'static str = "PDFParserAgent";

    pub fn new(trace: Arc<dyn TraceSink>) -> Self {
        trace.record(TraceEvent::agent_init(Self::AGENT, None));
        Self { trace }
    }

    fn record_parse(&self, path: &Path, error: Option<String>) {
        self.trace.record(TraceEvent::PdfOperation {
            agent: Self::AGENT.to_string(),
            operation: "parse".to_string(),
            pdf_path: path.display().to_string(),
            success: error.is_none(),
            error,
        });
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, location: &DocumentLocation) -> Result<String, ExtractionError> {
        let path = location.as_path().to_path_buf();
        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "parse_start",
            Some(json!({ "pdf_path": location.to_string() })),
        ));

        let worker_path = path.clone();
        let result = tokio::task::spawn_blocking(move || extract_pdf_text(&worker_path))
            .await
            .unwrap_or_else(|join_error| {
                Err(ExtractionError::Unreadable {
                    path: path.clone(),
                    message: join_error.to_string(),
                })
            });

        match &result {
            Ok(text) => {
                self.record_parse(&path, None);
                self.trace.record(TraceEvent::action(
                    Self::AGENT,
                    "parse_complete",
                    Some(json!({
                        "pdf_path": location.to_string(),
                        "text_length": text.chars().count(),
                    })),
                ));
            }
            Err(err) => {
                warn!(document = %location, error = %err, "PDF parse failed");
                self.record_parse(&path, Some(err.to_string()));
            }
        }
        result
    }
}

/// Reads `path` and extracts its text on the current thread.
///
/// `pdf-extract` can panic on malformed fonts; a panic is reported as
/// [`ExtractionError::Unreadable`].
pub fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "extracting PDF text");

    let unreadable = |message: String| ExtractionError::Unreadable {
        path: PathBuf::from(path),
        message,
    };
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(&bytes)
    })) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(unreadable(e.to_string())),
        Err(_) => Err(unreadable(
            "extractor panicked, likely on a malformed font".to_string(),
        )),
    }
}
