mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{harness, thread, FixedSource, MapExtractor};
use nodes::prompts::SUMMARY_INPUT_CHARS;
use nodes::{RunAbort, Summarizer};
use pipeline::testing::{FailingClient, ScriptedClient};
use pipeline::{DocumentLocation, DocumentRequest, MessageStore, TraceEvent};

/// Summaries repeat the (truncated) document text; later stages get `reply`.
fn summary_echo(reply: &str) -> ScriptedClient {
    ScriptedClient::new(reply).echo_after(Summarizer::AGENT, "Text:\n")
}

#[tokio::test]
async fn no_input_returns_none_without_touching_collaborators() {
    let source = Arc::new(FixedSource::new(&["a.pdf"]));
    let extractor = Arc::new(MapExtractor::new(&[("a.pdf", "A")]));
    let client = Arc::new(ScriptedClient::new("survey"));
    let h = harness(source.clone(), extractor.clone(), client.clone());

    assert_eq!(h.executor.run(None, None).await, None);

    assert!(source.requests().is_empty());
    assert_eq!(extractor.calls(), 0);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn empty_document_list_returns_none() {
    let source = Arc::new(FixedSource::new(&[]));
    let extractor = Arc::new(MapExtractor::new(&[]));
    let client = Arc::new(ScriptedClient::new("survey"));
    let h = harness(source, extractor.clone(), client.clone());

    let outcome = h.executor.execute(None, Some(Path::new("empty"))).await;

    assert_eq!(outcome.unwrap_err(), RunAbort::NoDocuments);
    assert_eq!(extractor.calls(), 0);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn failing_source_is_treated_as_no_documents() {
    let h = harness(
        Arc::new(FixedSource::failing()),
        Arc::new(MapExtractor::new(&[])),
        Arc::new(ScriptedClient::new("survey")),
    );

    assert_eq!(h.executor.run(Some("rust"), None).await, None);
    assert!(h.trace.kinds().contains(&"error"));
}

#[tokio::test]
async fn topic_takes_precedence_over_folder() {
    let source = Arc::new(FixedSource::new(&["paper_1.pdf"]));
    let h = harness(
        source.clone(),
        Arc::new(MapExtractor::new(&[("paper_1.pdf", "text")])),
        Arc::new(ScriptedClient::new("survey")),
    );

    h.executor
        .run(Some("protein folding"), Some(Path::new("local")))
        .await;

    assert_eq!(
        source.requests(),
        vec![DocumentRequest::Topic("protein folding".to_string())]
    );
}

#[tokio::test]
async fn whitespace_topic_is_still_a_topic() {
    let source = Arc::new(FixedSource::new(&["paper_1.pdf"]));
    let h = harness(
        source.clone(),
        Arc::new(MapExtractor::new(&[("paper_1.pdf", "text")])),
        Arc::new(ScriptedClient::new("survey")),
    );

    let survey = h.executor.run(Some("   "), Some(Path::new("local"))).await;

    assert!(survey.is_some());
    assert_eq!(source.requests(), vec![DocumentRequest::Topic("   ".to_string())]);
}

#[tokio::test]
async fn extraction_failure_keeps_the_document_in_sequence() {
    let source = Arc::new(FixedSource::new(&["a.pdf", "b.pdf", "c.pdf"]));
    // b.pdf is unknown to the extractor and fails.
    let extractor = Arc::new(MapExtractor::new(&[("a.pdf", "A"), ("c.pdf", "C")]));
    let client = Arc::new(summary_echo("final survey"));
    let h = harness(source, extractor, client.clone());

    let report = h
        .executor
        .execute(None, Some(Path::new("papers")))
        .await
        .unwrap();

    let locations: Vec<PathBuf> = report
        .summaries
        .iter()
        .map(|s| s.metadata.location.as_path().to_path_buf())
        .collect();
    assert_eq!(
        locations,
        vec![
            PathBuf::from("a.pdf"),
            PathBuf::from("b.pdf"),
            PathBuf::from("c.pdf")
        ]
    );
    let texts: Vec<&str> = report.summaries.iter().map(|s| s.summary.as_str()).collect();
    assert_eq!(texts, vec!["A", "", "C"]);

    let synthesis_prompts = client.prompts_for("SynthesizerAgent");
    assert_eq!(synthesis_prompts.len(), 1);
    assert!(synthesis_prompts[0].ends_with("Summaries:\nA\n\nC"));

    let survey_prompts = client.prompts_for("SurveyWriterAgent");
    assert_eq!(survey_prompts.len(), 1);
    assert!(survey_prompts[0].contains("Paper 1: A\n\nPaper 3: C"));
    assert!(!survey_prompts[0].contains("Paper 2:"));

    assert_eq!(report.survey.as_str(), "final survey");
}

#[tokio::test]
async fn each_document_is_summarized_exactly_once() {
    let paths = ["1.pdf", "2.pdf", "3.pdf", "4.pdf"];
    let texts: Vec<(&str, &str)> = paths.iter().map(|p| (*p, "body")).collect();
    let client = Arc::new(ScriptedClient::new("ok"));
    let h = harness(
        Arc::new(FixedSource::new(&paths)),
        Arc::new(MapExtractor::new(&texts)),
        client.clone(),
    );

    let report = h.executor.execute(Some("topic"), None).await.unwrap();

    assert_eq!(report.summaries.len(), paths.len());
    assert_eq!(client.prompts_for("SummarizerAgent").len(), paths.len());
    assert_eq!(client.calls(), paths.len() + 2);
    assert_eq!(
        report.documents,
        paths.iter().map(|p| DocumentLocation::new(*p)).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn always_failing_client_degrades_to_empty_survey() {
    let client = Arc::new(FailingClient::new());
    let h = harness(
        Arc::new(FixedSource::new(&["a.pdf", "b.pdf"])),
        Arc::new(MapExtractor::new(&[("a.pdf", "A"), ("b.pdf", "B")])),
        client.clone(),
    );

    let report = h.executor.execute(Some("topic"), None).await.unwrap();

    assert_eq!(report.summaries.len(), 2);
    assert!(report.summaries.iter().all(|s| s.is_empty()));
    assert!(report.synthesis.is_empty());
    assert!(report.survey.is_empty());
    // One call per document plus synthesis and survey; nothing is retried.
    assert_eq!(client.calls(), 4);

    let stage_errors = h
        .trace
        .records()
        .into_iter()
        .filter(|r| matches!(r.event, TraceEvent::Error { .. }))
        .count();
    assert_eq!(stage_errors, 4);
}

#[tokio::test]
async fn run_returns_empty_survey_rather_than_none_when_stages_fail() {
    let h = harness(
        Arc::new(FixedSource::new(&["a.pdf"])),
        Arc::new(MapExtractor::new(&[("a.pdf", "A")])),
        Arc::new(FailingClient::new()),
    );

    let survey = h.executor.run(Some("topic"), None).await;

    assert_eq!(survey.map(|s| s.is_empty()), Some(true));
}

#[tokio::test]
async fn long_documents_are_truncated_before_reaching_the_client() {
    let long = format!("{}{}", "x".repeat(SUMMARY_INPUT_CHARS), "OVERFLOW");
    let client = Arc::new(summary_echo("ok"));
    let h = harness(
        Arc::new(FixedSource::new(&["long.pdf"])),
        Arc::new(MapExtractor::new(&[("long.pdf", long.as_str())])),
        client.clone(),
    );

    let report = h.executor.execute(Some("topic"), None).await.unwrap();

    let prompt = &client.prompts_for("SummarizerAgent")[0];
    assert!(!prompt.contains("OVERFLOW"));
    assert_eq!(report.summaries[0].summary.len(), SUMMARY_INPUT_CHARS);
    assert_eq!(
        report.summaries[0].metadata.text_chars,
        SUMMARY_INPUT_CHARS + "OVERFLOW".len()
    );
}

#[tokio::test]
async fn bookkeeping_notes_follow_the_stages() {
    let h = harness(
        Arc::new(FixedSource::new(&["a.pdf"])),
        Arc::new(MapExtractor::new(&[("a.pdf", "A")])),
        Arc::new(ScriptedClient::new("survey")),
    );

    h.executor.run(Some("topic"), None).await;

    let senders: Vec<String> = h
        .memory
        .messages(&thread())
        .into_iter()
        .map(|m| m.sender)
        .collect();
    assert_eq!(
        senders,
        vec!["parser", "summarizer", "synthesizer", "survey_writer"]
    );

    let kinds = h.trace.kinds();
    assert_eq!(kinds.iter().filter(|k| **k == "memory_operation").count(), 4);
    assert_eq!(kinds.first(), Some(&"agent_init"));
}
