//! JSONL trace log.
//!
//! [`JsonlTraceLogger`] implements [`pipeline::TraceSink`] by appending one
//! JSON object per event to a file. Each line is the event's fields plus a
//! `timestamp`. The file is truncated when the logger is created, so a trace
//! file always describes exactly one run.
//!
//! Write failures are logged through `tracing` and otherwise ignored; a broken
//! trace file never aborts a run.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use pipeline::{TraceEvent, TraceRecord, TraceSink};
use thiserror::Error;
use tracing::warn;

/// Default location of the trace file, relative to the working directory.
pub const DEFAULT_TRACE_FILE: &str = "logs/trace.jsonl";

#[derive(Debug, Error)]
pub enum TraceLogError {
    #[error("cannot create trace directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open trace file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Thread-safe JSONL writer for trace events.
#[derive(Debug)]
pub struct JsonlTraceLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlTraceLogger {
    /// Creates (or truncates) the trace file at `path`, creating any missing
    /// parent directories.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, TraceLogError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| TraceLogError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(&path).map_err(|source| TraceLogError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }
}

impl TraceSink for JsonlTraceLogger {
    fn record(&self, event: TraceEvent) {
        let kind = event.kind();
        let mut line = match serde_json::to_vec(&TraceRecord::now(event)) {
            Ok(line) => line,
            Err(error) => {
                warn!(event = kind, %error, "failed to serialise trace event");
                return;
            }
        };
        line.push(b'\n');

        // A poisoned lock only means another writer panicked mid-call; the
        // file handle itself is still usable.
        let mut file = self.file.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(error) = file.write_all(&line).and_then(|()| file.flush()) {
            warn!(event = kind, path = %self.path.display(), %error, "failed to write trace event");
        }
    }
}
