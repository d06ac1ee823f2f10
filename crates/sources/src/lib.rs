//! Document discovery and text extraction adapters.
//!
//! Implements [`pipeline::DocumentSource`] with [`PaperSource`], which either
//! searches arXiv for a topic and downloads the matching PDFs, or lists the
//! PDFs already present in a folder. Implements [`pipeline::TextExtractor`]
//! with [`PdfTextExtractor`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP, Atom parsing, filesystem access and PDF decoding
//! all live here. The [`pipeline`] crate sees only the port traits.

pub mod arxiv;
pub mod folder;
pub mod pdf;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{DocumentLocation, DocumentRequest, DocumentSource, SourceError, TraceEvent, TraceSink};
use serde_json::json;
use tracing::{info, instrument, warn};

pub use arxiv::ArxivClient;
pub use folder::list_pdfs;
pub use pdf::{extract_pdf_text, PdfTextExtractor};

/// Default number of papers fetched for a topic.
pub const DEFAULT_MAX_PAPERS: usize = 6;

/// Resolves topics through arXiv and folders through the local filesystem.
pub struct PaperSource {
    arxiv: ArxivClient,
    download_dir: PathBuf,
    max_papers: usize,
    trace: Arc<dyn TraceSink>,
}

impl PaperSource {
    pub const AGENT: &'static str = "PDFMinerAgent";

    /// Downloads land in `download_dir` as `paper_<n>.pdf`; the directory is
    /// created on first use.
    pub fn new(
        arxiv: ArxivClient,
        download_dir: impl Into<PathBuf>,
        max_papers: usize,
        trace: Arc<dyn TraceSink>,
    ) -> Self {
        let download_dir = download_dir.into();
        trace.record(TraceEvent::agent_init(
            Self::AGENT,
            Some(json!({
                "download_dir": download_dir.display().to_string(),
                "max_papers": max_papers,
            })),
        ));
        Self {
            arxiv,
            download_dir,
            max_papers,
            trace,
        }
    }

    /// Searches arXiv and downloads up to `max_papers` PDFs. A failed
    /// download is traced and skipped; a failed search is an error.
    #[instrument(skip(self))]
    async fn mine(&self, topic: &str) -> Result<Vec<DocumentLocation>, SourceError> {
        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "search_arxiv",
            Some(json!({ "topic": topic, "max_papers": self.max_papers })),
        ));

        let links = match self.arxiv.search_pdf_links(topic, self.max_papers).await {
            Ok(links) => links,
            Err(err) => {
                self.trace
                    .record(TraceEvent::error(Self::AGENT, err.to_string(), Some("search")));
                return Err(err);
            }
        };

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|source| SourceError::Io {
                path: self.download_dir.clone(),
                source,
            })?;

        let mut downloaded = Vec::with_capacity(links.len());
        for (i, url) in links.iter().take(self.max_papers).enumerate() {
            let dest = self.download_dir.join(format!("paper_{}.pdf", i + 1));
            match self.arxiv.download(url, &dest).await {
                Ok(()) => {
                    info!(url = %url, dest = %dest.display(), "downloaded paper");
                    self.record_download(&dest.display().to_string(), None);
                    downloaded.push(DocumentLocation::new(dest));
                }
                Err(error) => {
                    warn!(url = %url, %error, "download failed; skipping");
                    self.record_download(url, Some(error));
                }
            }
        }

        self.trace.record(TraceEvent::action(
            Self::AGENT,
            "mining_complete",
            Some(json!({ "downloaded": downloaded.len(), "requested": self.max_papers })),
        ));
        Ok(downloaded)
    }

    fn record_download(&self, path: &str, error: Option<String>) {
        self.trace.record(TraceEvent::PdfOperation {
            agent: Self::AGENT.to_string(),
            operation: "download".to_string(),
            pdf_path: path.to_string(),
            success: error.is_none(),
            error,
        });
    }
}

#[async_trait]
impl DocumentSource for PaperSource {
    async fn locate(
        &self,
        request: &DocumentRequest,
    ) -> Result<Vec<DocumentLocation>, SourceError> {
        match request {
            DocumentRequest::Topic(topic) => self.mine(topic).await,
            DocumentRequest::Folder(folder) => list_pdfs(folder).await,
        }
    }
}
