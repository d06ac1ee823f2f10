//! Survey CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: `.env`, environment and command-line flags.
//! 2. **Wire observability**: `tracing-subscriber` console and file layers plus
//!    an optional OpenTelemetry OTLP exporter, and the JSONL trace file.
//! 3. **Construct infrastructure**: the arXiv/folder source, the PDF
//!    extractor, the completion client and the message store, injected into
//!    [`nodes::PipelineExecutor`].
//! 4. **Persist results**: the survey text and its run configuration.
//!
//! Exit status is 1 when no credential is available or when writing the
//! results fails. A run that finds nothing to survey still exits 0.

mod args;
mod output;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use llm::{OpenAiConfig, OpenAiProvider};
use nodes::{Collaborators, PipelineExecutor};
use pipeline::{
    InMemoryMessageStore, ModelName, RunId, ThreadId, Timestamp, TraceEvent, TraceSink,
};
use sources::{ArxivClient, PaperSource, PdfTextExtractor};
use tracing::{error, info};
use trace_log::JsonlTraceLogger;

use crate::args::Args;
use crate::output::RunConfiguration;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let _telemetry = telemetry::init(args.log_format, &args.log_file)?;

    let Some(api_key) = args.api_key().map(str::to_string) else {
        error!("OPENAI_API_KEY is not set; pass --openai-api-key or set it in the environment");
        return Ok(ExitCode::FAILURE);
    };

    run(&args, api_key).await
}

async fn run(args: &Args, api_key: String) -> anyhow::Result<ExitCode> {
    let model = ModelName::new(args.model.clone()).context("--model must not be empty")?;
    let thread = ThreadId::new(args.thread_id.clone()).context("--thread-id must not be empty")?;
    let timeout = Duration::from_secs(args.request_timeout_secs);

    let trace: Arc<dyn TraceSink> = Arc::new(
        JsonlTraceLogger::create(&args.trace_file).context("opening trace file")?,
    );

    let run_config = RunConfiguration {
        run_id: RunId::new_random(),
        timestamp: Timestamp::now(),
        model: model.to_string(),
        temperature: args.temperature.as_f32(),
        seed: args.seed,
        max_tokens: args.max_tokens,
        topic: args.topic.clone(),
        pdf_folder: args.pdf_folder.clone(),
        output_file: args.output.clone(),
    };
    info!(run_id = %run_config.run_id, model = %model, "starting survey run");
    trace.record(TraceEvent::WorkflowStart {
        run_id: run_config.run_id,
        config: serde_json::to_value(&run_config)?,
    });

    let http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("building HTTP client")?;
    let source = PaperSource::new(
        ArxivClient::new(http),
        &args.download_dir,
        usize::try_from(args.max_papers).unwrap_or(usize::MAX),
        Arc::clone(&trace),
    );
    let completion = OpenAiProvider::new(
        OpenAiConfig {
            api_key,
            base_url: args.api_base_url.clone(),
            model,
            temperature: args.temperature,
            seed: Some(args.seed),
            max_tokens: Some(args.max_tokens),
            timeout,
        },
        Arc::clone(&trace),
    )?;

    let executor = PipelineExecutor::new(
        Collaborators {
            source: Arc::new(source),
            extractor: Arc::new(PdfTextExtractor::new(Arc::clone(&trace))),
            completion: Arc::new(completion),
            trace: Arc::clone(&trace),
            memory: Arc::new(InMemoryMessageStore::new()),
        },
        thread,
    );

    let survey = executor
        .run(args.topic.as_deref(), args.pdf_folder.as_deref())
        .await;

    output::finish_run(survey, &run_config, trace.as_ref()).await?;
    Ok(ExitCode::SUCCESS)
}
