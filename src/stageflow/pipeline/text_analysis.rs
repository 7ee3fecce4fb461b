// SPDX-License-Identifier: MIT

//! Text analysis sequence
//!
//! `preprocess -> analyze_sentiment -> summarize -> generate_report`.
//! The transformations are plain functions; the stages below only move
//! their inputs and outputs in and out of the record.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

use super::sequence::{CompiledSequence, SequenceBuilder, END};
use super::stage::{single, stage, Stage};
use super::state::{FieldType, StateSchema, WorkflowState};
use crate::adk::error::{CompilationError, PipelineError};

pub const POSITIVE_WORDS: [&str; 6] = ["good", "great", "excellent", "happy", "like", "love"];
pub const NEGATIVE_WORDS: [&str; 6] = ["bad", "terrible", "awful", "sad", "dislike", "hate"];

/// Longest summary kept verbatim, in characters
pub const SUMMARY_LIMIT: usize = 100;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

/// One matched token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTag {
    pub word: String,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Positive,
    Negative,
    Neutral,
}

impl Verdict {
    pub fn from_counts(positive: usize, negative: usize) -> Self {
        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Verdict::Positive,
            std::cmp::Ordering::Less => Verdict::Negative,
            std::cmp::Ordering::Equal => Verdict::Neutral,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Positive => "Positive",
            Verdict::Negative => "Negative",
            Verdict::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

/// Fully populated record of a text analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub text: String,
    pub preprocessed_text: String,
    pub analyzed_sentiments: Vec<SentimentTag>,
    pub summarized_text: String,
    pub final_report: String,
}

impl TryFrom<WorkflowState> for TextAnalysis {
    type Error = PipelineError;

    fn try_from(state: WorkflowState) -> Result<Self, Self::Error> {
        serde_json::from_value(state.into_json()).map_err(|e| {
            PipelineError::invalid_input("generate_report", "final_report", e.to_string())
        })
    }
}

/// Trim surrounding whitespace and lowercase
pub fn preprocess(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Tag whitespace-separated tokens that exactly match a sentiment word.
///
/// Tokens with punctuation attached ("terrible.") do not match.
pub fn tag_sentiments(text: &str) -> Vec<SentimentTag> {
    text.split_whitespace()
        .filter_map(|word| {
            let sentiment = if POSITIVE_WORDS.contains(&word) {
                Sentiment::Positive
            } else if NEGATIVE_WORDS.contains(&word) {
                Sentiment::Negative
            } else {
                return None;
            };
            Some(SentimentTag {
                word: word.to_string(),
                sentiment,
            })
        })
        .collect()
}

/// Keep the first `SUMMARY_LIMIT` characters, marking the cut with "..."
pub fn summarize(text: &str) -> String {
    match text.char_indices().nth(SUMMARY_LIMIT) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Count tags of each polarity as `(positive, negative)`
pub fn count_sentiments(tags: &[SentimentTag]) -> (usize, usize) {
    tags.iter().fold((0, 0), |(pos, neg), tag| match tag.sentiment {
        Sentiment::Positive => (pos + 1, neg),
        Sentiment::Negative => (pos, neg + 1),
    })
}

pub fn compose_report(tags: &[SentimentTag], summary: &str) -> String {
    let (positive, negative) = count_sentiments(tags);
    format!(
        "SUMMARY: {}\n\nSENTIMENT ANALYSIS:\n- Positive words: {}\n- Negative words: {}\nOverall sentiment: {}",
        summary,
        positive,
        negative,
        Verdict::from_counts(positive, negative)
    )
}

pub fn preprocess_stage() -> Arc<dyn Stage> {
    stage("preprocess", |state: &WorkflowState| {
        let text = state.require_str("preprocess", "text")?;
        Ok(single("preprocessed_text", preprocess(text)))
    })
}

pub fn analyze_sentiment_stage() -> Arc<dyn Stage> {
    stage("analyze_sentiment", |state: &WorkflowState| {
        let text = state.require_str("analyze_sentiment", "preprocessed_text")?;
        Ok(single("analyzed_sentiments", json!(tag_sentiments(text))))
    })
}

pub fn summarize_stage() -> Arc<dyn Stage> {
    stage("summarize", |state: &WorkflowState| {
        let text = state.require_str("summarize", "preprocessed_text")?;
        Ok(single("summarized_text", summarize(text)))
    })
}

pub fn generate_report_stage() -> Arc<dyn Stage> {
    stage("generate_report", |state: &WorkflowState| {
        let tags: Vec<SentimentTag> =
            state.require_as("generate_report", "analyzed_sentiments")?;
        let summary = state.require_str("generate_report", "summarized_text")?;
        Ok(single("final_report", compose_report(&tags, summary)))
    })
}

pub fn text_analysis_schema() -> StateSchema {
    StateSchema::default().field("text", FieldType::String, true)
}

/// Compile the four-stage text analysis sequence
pub fn create_text_analysis_sequence() -> Result<CompiledSequence, CompilationError> {
    let mut builder =
        SequenceBuilder::new("text-analysis").with_schema(text_analysis_schema());
    builder
        .add_node("preprocess", preprocess_stage())
        .add_node("analyze_sentiment", analyze_sentiment_stage())
        .add_node("summarize", summarize_stage())
        .add_node("generate_report", generate_report_stage())
        .add_edge("preprocess", "analyze_sentiment")
        .add_edge("analyze_sentiment", "summarize")
        .add_edge("summarize", "generate_report")
        .add_edge("generate_report", END)
        .set_entry_point("preprocess");

    builder.compile()
}

/// Run the text analysis sequence on `text`
pub fn analyze_text(text: &str) -> Result<TextAnalysis, PipelineError> {
    let state = create_text_analysis_sequence()?.invoke(json!({ "text": text }))?;
    TextAnalysis::try_from(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "I really love this product. It's great and works well. However, the delivery was terrible and I hate the packaging.";

    fn tag(word: &str, sentiment: Sentiment) -> SentimentTag {
        SentimentTag {
            word: word.to_string(),
            sentiment,
        }
    }

    #[test]
    fn test_preprocess() {
        assert_eq!(preprocess("  Hello World \n"), "hello world");
        assert_eq!(preprocess(""), "");
        assert_eq!(preprocess("\t ÄÖ "), "äö");
    }

    #[test]
    fn test_tag_sentiments_exact_tokens() {
        let tags = tag_sentiments("love it. great, good good terrible. hate");
        assert_eq!(
            tags,
            vec![
                tag("love", Sentiment::Positive),
                tag("good", Sentiment::Positive),
                tag("good", Sentiment::Positive),
                tag("hate", Sentiment::Negative),
            ]
        );
    }

    #[test]
    fn test_tag_counts_bounded_by_tokens() {
        let text = "good bad meh happy sad";
        let (pos, neg) = count_sentiments(&tag_sentiments(text));
        assert!(pos + neg <= text.split_whitespace().count());
        assert_eq!((pos, neg), (2, 2));

        let all_matching = "good bad";
        let (pos, neg) = count_sentiments(&tag_sentiments(all_matching));
        assert_eq!(pos + neg, 2);
    }

    #[test]
    fn test_summarize_short_text_unchanged() {
        assert_eq!(summarize(""), "");
        let exactly = "a".repeat(SUMMARY_LIMIT);
        assert_eq!(summarize(&exactly), exactly);
    }

    #[test]
    fn test_summarize_truncates_by_characters() {
        let long = "é".repeat(150);
        let summary = summarize(&long);
        assert_eq!(summary.chars().count(), SUMMARY_LIMIT + 3);
        assert!(summary.ends_with("..."));
        assert!(summary.starts_with(&"é".repeat(SUMMARY_LIMIT)));

        let just_over = "b".repeat(SUMMARY_LIMIT + 1);
        assert_eq!(summarize(&just_over), format!("{}...", "b".repeat(100)));
    }

    #[test]
    fn test_verdict() {
        assert_eq!(Verdict::from_counts(2, 1), Verdict::Positive);
        assert_eq!(Verdict::from_counts(1, 2), Verdict::Negative);
        assert_eq!(Verdict::from_counts(3, 3), Verdict::Neutral);
        assert_eq!(Verdict::from_counts(0, 0), Verdict::Neutral);
    }

    #[test]
    fn test_compose_report_format() {
        let report = compose_report(&[tag("good", Sentiment::Positive)], "good stuff");
        assert_eq!(
            report,
            "SUMMARY: good stuff\n\nSENTIMENT ANALYSIS:\n- Positive words: 1\n- Negative words: 0\nOverall sentiment: Positive"
        );
    }

    #[test]
    fn test_sample_text_end_to_end() {
        let result = analyze_text(SAMPLE).unwrap();

        assert_eq!(result.text, SAMPLE);
        assert_eq!(result.preprocessed_text, SAMPLE.trim().to_lowercase());
        assert_eq!(
            result.analyzed_sentiments,
            vec![
                tag("love", Sentiment::Positive),
                tag("great", Sentiment::Positive),
                tag("terrible", Sentiment::Negative),
                tag("hate", Sentiment::Negative),
            ]
        );
        // "packaging." and "well." carry punctuation and are skipped anyway
        assert_eq!(
            result.summarized_text,
            format!("{}...", &result.preprocessed_text[..100])
        );
        assert!(result.final_report.contains("- Positive words: 2"));
        assert!(result.final_report.contains("- Negative words: 2"));
        assert!(result.final_report.ends_with("Overall sentiment: Neutral"));
    }

    #[test]
    fn test_empty_text() {
        let result = analyze_text("").unwrap();
        assert_eq!(result.preprocessed_text, "");
        assert!(result.analyzed_sentiments.is_empty());
        assert_eq!(result.summarized_text, "");
        assert!(result.final_report.contains("Positive words: 0"));
        assert!(result.final_report.contains("Negative words: 0"));
        assert!(result.final_report.contains("Overall sentiment: Neutral"));
    }

    #[test]
    fn test_idempotent() {
        let sequence = create_text_analysis_sequence().unwrap();
        let first = sequence.invoke(json!({ "text": SAMPLE })).unwrap();
        let second = sequence.invoke(json!({ "text": SAMPLE })).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_non_string_text_rejected() {
        let sequence = create_text_analysis_sequence().unwrap();
        let err = sequence.invoke(json!({ "text": 12 })).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidInput { ref field, .. } if field == "text"
        ));
    }

    #[test]
    fn test_later_stage_needs_earlier_output() {
        let err = summarize_stage().run(&WorkflowState::default()).unwrap_err();
        assert!(err.to_string().contains("preprocessed_text"));
    }
}
