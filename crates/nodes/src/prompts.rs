//! Fixed prompt templates for the three LLM-backed stages.
//!
//! All three templates only ever embed non-empty summary texts; empty records
//! stay in the caller's sequence but contribute nothing to a prompt.

use pipeline::{SummaryRecord, SynthesisRecord};

/// Maximum number of characters of document text embedded in a summary prompt.
pub const SUMMARY_INPUT_CHARS: usize = 4000;

/// Returns at most the first `max_chars` characters of `text`.
///
/// Counts Unicode scalar values, never splitting a character. Text that is
/// already short enough is returned unchanged.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Prompt asking for a structured summary of one paper.
pub fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following research paper text in a structured format: \
         - Main contributions\n- Methods\n- Key findings\n- Limitations\n- Citation (if available)\n\
         Text:\n{}",
        truncate_chars(text, SUMMARY_INPUT_CHARS)
    )
}

/// Prompt asking for cross-paper insights and research gaps.
pub fn synthesis_prompt(summaries: &[SummaryRecord]) -> String {
    let joined = summaries
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.summary.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Given the following research paper summaries, synthesize the main cross-paper insights \
         and identify key research gaps. Present insights and gaps in a structured format.\n\n\
         Summaries:\n{joined}"
    )
}

/// Prompt asking for the final mini-survey.
///
/// Each non-empty summary is labelled `Paper N` by its 1-based position in
/// `summaries`, so labels stay stable when earlier records are empty. The
/// word limit is advisory text for the model only.
pub fn survey_prompt(synthesis: &SynthesisRecord, summaries: &[SummaryRecord]) -> String {
    let joined = summaries
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_empty())
        .map(|(i, s)| format!("Paper {}: {}", i + 1, s.summary))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Write a concise mini-survey (≤800 words) on the following topic, synthesizing the \
         provided insights and summaries. Include inline citations in the form [Paper 1], \
         [Paper 2], etc.\n\n\
         Synthesis:\n{}\n\n\
         Summaries:\n{joined}\n\n\
         The survey should be clear, well-structured, and highlight key trends, gaps, and \
         future directions.",
        synthesis.synthesis
    )
}

#[cfg(test)]
mod tests {
    use pipeline::{DocumentLocation, DocumentMetadata};

    use super::*;

    fn record(path: &str, summary: &str) -> SummaryRecord {
        SummaryRecord::new(
            summary,
            DocumentMetadata {
                location: DocumentLocation::new(path),
                text_chars: 0,
            },
        )
    }

    #[test]
    fn truncation_keeps_short_text_unchanged() {
        let text = "a".repeat(SUMMARY_INPUT_CHARS);
        assert_eq!(truncate_chars(&text, SUMMARY_INPUT_CHARS), text);
        assert_eq!(truncate_chars("", SUMMARY_INPUT_CHARS), "");
    }

    #[test]
    fn truncation_cuts_on_character_boundaries() {
        let text = "é".repeat(SUMMARY_INPUT_CHARS + 5);
        let cut = truncate_chars(&text, SUMMARY_INPUT_CHARS);
        assert_eq!(cut.chars().count(), SUMMARY_INPUT_CHARS);
    }

    #[test]
    fn summary_prompt_embeds_at_most_the_first_4000_characters() {
        let text = format!("{}{}", "k".repeat(SUMMARY_INPUT_CHARS), "TAIL");
        let prompt = summary_prompt(&text);
        assert!(prompt.contains(&"k".repeat(SUMMARY_INPUT_CHARS)));
        assert!(!prompt.contains("TAIL"));
        assert!(prompt.contains("- Limitations"));
    }

    #[test]
    fn synthesis_prompt_skips_empty_summaries() {
        let summaries = vec![record("a", "alpha"), record("b", ""), record("c", "gamma")];
        let prompt = synthesis_prompt(&summaries);
        assert!(prompt.ends_with("Summaries:\nalpha\n\ngamma"));
    }

    #[test]
    fn survey_prompt_labels_papers_by_input_position() {
        let summaries = vec![record("a", ""), record("b", "beta"), record("c", "gamma")];
        let prompt = survey_prompt(&SynthesisRecord::new("insights"), &summaries);
        assert!(prompt.contains("Synthesis:\ninsights"));
        assert!(prompt.contains("Paper 2: beta\n\nPaper 3: gamma"));
        assert!(!prompt.contains("Paper 1:"));
    }
}
