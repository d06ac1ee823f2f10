//! Stub document collaborators and the executor harness. None of them touch
//! the network or the filesystem.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nodes::{Collaborators, PipelineExecutor};
use pipeline::{
    CompletionClient, DocumentLocation, DocumentRequest, DocumentSource, ExtractionError,
    InMemoryMessageStore, InMemoryTraceSink, SourceError, TextExtractor, ThreadId,
};

// ---------------------------------------------------------------------------
// Document collaborators
// ---------------------------------------------------------------------------

/// Returns a fixed list of locations and remembers what it was asked for.
pub struct FixedSource {
    locations: Vec<DocumentLocation>,
    fail: bool,
    requests: Mutex<Vec<DocumentRequest>>,
}

impl FixedSource {
    pub fn new(paths: &[&str]) -> Self {
        Self {
            locations: paths.iter().map(|p| DocumentLocation::new(*p)).collect(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn requests(&self) -> Vec<DocumentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSource for FixedSource {
    async fn locate(
        &self,
        request: &DocumentRequest,
    ) -> Result<Vec<DocumentLocation>, SourceError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(SourceError::Search {
                topic: "anything".to_string(),
                message: "HTTP 503".to_string(),
            });
        }
        Ok(self.locations.clone())
    }
}

/// Looks texts up by path; a missing path is an extraction failure.
pub struct MapExtractor {
    texts: HashMap<PathBuf, String>,
    calls: AtomicUsize,
}

impl MapExtractor {
    pub fn new(texts: &[(&str, &str)]) -> Self {
        Self {
            texts: texts
                .iter()
                .map(|(p, t)| (PathBuf::from(p), t.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for MapExtractor {
    async fn extract(&self, location: &DocumentLocation) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts
            .get(location.as_path())
            .cloned()
            .ok_or_else(|| ExtractionError::Unreadable {
                path: location.as_path().to_path_buf(),
                message: "not a PDF".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub executor: PipelineExecutor,
    pub trace: Arc<InMemoryTraceSink>,
    pub memory: Arc<InMemoryMessageStore>,
}

pub fn harness(
    source: Arc<FixedSource>,
    extractor: Arc<MapExtractor>,
    completion: Arc<dyn CompletionClient>,
) -> Harness {
    let trace = Arc::new(InMemoryTraceSink::new());
    let memory = Arc::new(InMemoryMessageStore::new());
    let executor = PipelineExecutor::new(
        Collaborators {
            source,
            extractor,
            completion,
            trace: trace.clone(),
            memory: memory.clone(),
        },
        thread(),
    );
    Harness {
        executor,
        trace,
        memory,
    }
}

pub fn thread() -> ThreadId {
    ThreadId::new("test-thread").unwrap()
}
