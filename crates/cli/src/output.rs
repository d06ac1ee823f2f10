//! Survey and run-configuration persistence.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pipeline::{RunId, SurveyText, Timestamp, TraceEvent, TraceSink};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Parameters of one run, written beside the survey so it can be reproduced.
///
/// Never carries the API credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub run_id: RunId,
    pub timestamp: Timestamp,
    pub model: String,
    pub temperature: f32,
    pub seed: u64,
    pub max_tokens: u32,
    pub topic: Option<String>,
    pub pdf_folder: Option<PathBuf>,
    pub output_file: PathBuf,
}

/// `outputs/mini_survey.txt` becomes `outputs/mini_survey_config.json`.
pub fn config_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "survey".to_string());
    output.with_file_name(format!("{stem}_config.json"))
}

async fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(())
}

pub async fn write_survey(path: &Path, survey: &SurveyText) -> anyhow::Result<()> {
    ensure_parent(path).await?;
    tokio::fs::write(path, survey.as_str())
        .await
        .with_context(|| format!("writing survey to {}", path.display()))
}

/// Writes `config` as pretty JSON and returns where it went.
pub async fn write_run_configuration(
    output: &Path,
    config: &RunConfiguration,
) -> anyhow::Result<PathBuf> {
    let path = config_path_for(output);
    ensure_parent(&path).await?;
    let json = serde_json::to_string_pretty(config)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("writing run configuration to {}", path.display()))?;
    Ok(path)
}

/// How a run ended from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Saved,
    NoSurvey,
}

/// Persists the result of a run and records `workflow_complete`.
///
/// `None` writes nothing. `Some` writes the survey, even when empty, and the
/// run configuration beside it. `success` is true only when both were written.
pub async fn finish_run(
    survey: Option<SurveyText>,
    config: &RunConfiguration,
    trace: &dyn TraceSink,
) -> anyhow::Result<RunOutcome> {
    let output = &config.output_file;
    let complete = |success| TraceEvent::WorkflowComplete {
        output_file: output.display().to_string(),
        success,
    };

    let Some(survey) = survey else {
        warn!("No survey generated.");
        trace.record(complete(false));
        return Ok(RunOutcome::NoSurvey);
    };

    if survey.is_empty() {
        warn!("every completion failed; writing an empty survey");
    }
    let written = async {
        write_survey(output, &survey).await?;
        write_run_configuration(output, config).await
    }
    .await;
    trace.record(complete(written.is_ok()));
    let config_path = written?;

    info!(
        output = %output.display(),
        config = %config_path.display(),
        words = survey.word_count(),
        "Mini-survey saved"
    );
    Ok(RunOutcome::Saved)
}
