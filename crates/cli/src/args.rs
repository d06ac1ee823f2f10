//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pipeline::Temperature;

/// Console log rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Generate a short literature survey from arXiv papers or a folder of PDFs.
///
/// When both `--topic` and `--pdf-folder` are given the topic wins.
#[derive(Debug, Parser)]
#[command(name = "survey", version, about)]
pub struct Args {
    /// Research topic to search arXiv for.
    #[arg(long)]
    pub topic: Option<String>,

    /// Folder of existing PDF files to survey.
    #[arg(long)]
    pub pdf_folder: Option<PathBuf>,

    /// Where the survey text is written.
    #[arg(long, default_value = "outputs/mini_survey.txt")]
    pub output: PathBuf,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, default_value = "gpt-4o")]
    pub model: String,

    /// Sampling temperature in [0.0, 2.0].
    #[arg(long, default_value = "0.0", value_parser = parse_temperature)]
    pub temperature: Temperature,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 4096)]
    pub max_tokens: u32,

    /// Number of papers fetched from arXiv for a topic.
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_papers: u64,

    #[arg(long, default_value = "pdfs_downloaded")]
    pub download_dir: PathBuf,

    /// JSON-lines trace of every pipeline step. Truncated at start-up.
    #[arg(long, default_value = trace_log::DEFAULT_TRACE_FILE)]
    pub trace_file: PathBuf,

    #[arg(long, default_value = "logs/research_copilot.log")]
    pub log_file: PathBuf,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = llm::DEFAULT_BASE_URL)]
    pub api_base_url: String,

    /// Deadline for each HTTP request, in seconds.
    #[arg(long, default_value_t = 120)]
    pub request_timeout_secs: u64,

    /// Message-store thread the run's notes are filed under.
    #[arg(long, default_value = "default-thread")]
    pub thread_id: String,
}

impl Args {
    /// Returns the API key if one was supplied and is not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn parse_temperature(raw: &str) -> Result<Temperature, String> {
    let value: f32 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    Temperature::new(value).ok_or_else(|| format!("{value} is outside [0.0, 2.0]"))
}
