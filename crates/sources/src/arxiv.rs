//! Minimal arXiv client: Atom search plus PDF download.
//!
//! arXiv exposes its search API as an Atom feed at
//! `https://export.arxiv.org/api/query`. Only the PDF link of each entry is
//! used; titles, abstracts and authors are ignored because the pipeline works
//! from the full text.

use std::path::Path;

use pipeline::SourceError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, instrument};

/// Public arXiv query endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://export.arxiv.org/api/query";

/// Thin wrapper over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ArxivClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ArxivClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Points the client at a different query endpoint (mirrors, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Searches all fields for `topic` and returns the PDF URL of each of the
    /// first `max_results` entries, in feed order.
    #[instrument(skip(self))]
    pub async fn search_pdf_links(
        &self,
        topic: &str,
        max_results: usize,
    ) -> Result<Vec<String>, SourceError> {
        let search_error = |message: String| SourceError::Search {
            topic: topic.to_string(),
            message,
        };

        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("search_query", format!("all:{topic}")),
                ("start", "0".to_string()),
                ("max_results", max_results.to_string()),
            ])
            .send()
            .await
            .map_err(|e| search_error(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(search_error(format!("arXiv API error: HTTP {}", status.as_u16())));
        }
        let body = resp.text().await.map_err(|e| search_error(e.to_string()))?;

        let links = parse_pdf_links(&body)?;
        debug!(count = links.len(), "arXiv search returned PDF links");
        Ok(links)
    }

    /// Downloads `url` into `dest`, overwriting any existing file.
    #[instrument(skip(self))]
    pub async fn download(&self, url: &str, dest: &Path) -> Result<(), String> {
        let resp = self.http.get(url).send().await.map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }
        let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| format!("cannot write {}: {e}", dest.display()))
    }
}

// ---------------------------------------------------------------------------
// Atom parsing
// ---------------------------------------------------------------------------

#[derive(Default)]
struct EntryLinks {
    titled_pdf: Option<String>,
    typed_pdf: Option<String>,
}

impl EntryLinks {
    fn observe(&mut self, link: &BytesStart<'_>) {
        let mut href = None;
        let mut title = None;
        let mut kind = None;
        for attr in link.attributes().flatten() {
            let value = attr.unescape_value().ok().map(|v| v.into_owned());
            match attr.key.as_ref() {
                b"href" => href = value,
                b"title" => title = value,
                b"type" => kind = value,
                _ => {}
            }
        }
        let Some(href) = href else { return };
        if title.as_deref() == Some("pdf") {
            self.titled_pdf.get_or_insert(href);
        } else if kind.as_deref() == Some("application/pdf") {
            self.typed_pdf.get_or_insert(href);
        }
    }

    fn best(self) -> Option<String> {
        self.titled_pdf.or(self.typed_pdf)
    }
}

/// Extracts one PDF link per `<entry>`, preferring `title="pdf"` over
/// `type="application/pdf"`. Entries without either are skipped.
pub fn parse_pdf_links(feed: &str) -> Result<Vec<String>, SourceError> {
    let mut reader = Reader::from_str(feed);
    reader.config_mut().trim_text(true);

    let mut links = Vec::new();
    let mut current: Option<EntryLinks> = None;

    loop {
        let event = reader.read_event().map_err(|e| SourceError::Feed {
            message: format!("at byte {}: {e}", reader.buffer_position()),
        })?;
        match event {
            Event::Eof => break,
            Event::Start(e) if e.local_name().as_ref() == b"entry" => {
                current = Some(EntryLinks::default());
            }
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"link" => {
                if let Some(entry) = current.as_mut() {
                    entry.observe(&e);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"entry" => {
                if let Some(link) = current.take().and_then(EntryLinks::best) {
                    links.push(link);
                }
            }
            _ => {}
        }
    }

    Ok(links)
}
