//! Rephrase / analyze / compose wrappers with deterministic fallbacks.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assessment::scoring::RiskAssessment;
use crate::assessment::subjects::SubjectAdvice;
use crate::error::NarrativeError;

use super::NarrativeService;

/// Signals extracted from the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptAnalysis {
    pub emotional_state: String,
    #[serde(default)]
    pub has_support: Option<bool>,
    pub engagement_level: String,
    #[serde(default)]
    pub additional_risks: Vec<String>,
    pub summary: String,
}

impl TranscriptAnalysis {
    /// Neutral analysis used whenever the service cannot be reached or
    /// returns an unusable payload.
    pub fn unknown() -> Self {
        Self {
            emotional_state: "unknown".to_string(),
            has_support: None,
            engagement_level: "unknown".to_string(),
            additional_risks: Vec::new(),
            summary: "Conversation analysis unavailable.".to_string(),
        }
    }
}

/// Wraps the external text service with the three enrichment operations.
/// Every call is bounded by a timeout; expiry is treated exactly like a
/// service failure.
pub struct NarrativeAugmenter {
    service: Arc<dyn NarrativeService>,
    timeout: Duration,
}

impl NarrativeAugmenter {
    pub fn new(service: Arc<dyn NarrativeService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    async fn call(&self, prompt: &str) -> Result<String, NarrativeError> {
        match tokio::time::timeout(self.timeout, self.service.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(NarrativeError::Timeout(self.timeout)),
        }
    }

    /// Rephrase a canonical question into friendly conversational text.
    /// Falls back to the canonical text unchanged.
    pub async fn rephrase_question(&self, canonical: &str) -> String {
        let prompt = format!(
            "Rephrase this question in a friendly, conversational way (1 sentence): \"{canonical}\""
        );
        match self.call(&prompt).await {
            Ok(raw) => {
                let cleaned = strip_control_tokens(&raw);
                let flattened = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
                if flattened.is_empty() {
                    canonical.to_string()
                } else {
                    flattened
                }
            }
            Err(e) => {
                warn!(error = %e, "Question rephrasing failed, using canonical text");
                canonical.to_string()
            }
        }
    }

    /// Extract emotional-state / support / engagement signals from the
    /// transcript. Falls back to [`TranscriptAnalysis::unknown`].
    pub async fn analyze_transcript(&self, transcript: &str) -> TranscriptAnalysis {
        if transcript.trim().is_empty() {
            return TranscriptAnalysis::unknown();
        }

        let prompt = analysis_prompt(transcript);
        match self.call(&prompt).await {
            Ok(raw) => {
                let cleaned = strip_control_tokens(&raw);
                match serde_json::from_str::<TranscriptAnalysis>(cleaned.trim()) {
                    Ok(analysis) => analysis,
                    Err(e) => {
                        warn!(error = %e, "Unparseable transcript analysis, using neutral signals");
                        TranscriptAnalysis::unknown()
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Transcript analysis failed, using neutral signals");
                TranscriptAnalysis::unknown()
            }
        }
    }

    /// Compose the final user-facing message from the finished assessment.
    /// Falls back to a template built from tier and recommendation only.
    pub async fn compose_message(
        &self,
        assessment: &RiskAssessment,
        advice: &[SubjectAdvice],
    ) -> String {
        let prompt = compose_prompt(assessment, advice);
        match self.call(&prompt).await {
            Ok(raw) => {
                let cleaned = strip_control_tokens(&raw);
                if cleaned.is_empty() {
                    fallback_message(assessment)
                } else {
                    cleaned
                }
            }
            Err(e) => {
                warn!(error = %e, "Message composition failed, using template");
                fallback_message(assessment)
            }
        }
    }
}

/// Template used when the service cannot compose a message.
pub fn fallback_message(assessment: &RiskAssessment) -> String {
    format!(
        "Risk level: {}. {}",
        assessment.risk_level, assessment.recommendation
    )
}

fn analysis_prompt(transcript: &str) -> String {
    format!(
        "You are reviewing a counseling conversation with a student.\n\n\
         CONVERSATION:\n{transcript}\n\n\
         Assess the student's emotional state, support network, and engagement.\n\n\
         Respond with ONLY valid JSON, no explanation or markdown formatting:\n\
         {{\n\
           \"emotionalState\": \"one of: positive, neutral, stressed, discouraged, unknown\",\n\
           \"hasSupport\": true | false | null,\n\
           \"engagementLevel\": \"one of: high, medium, low, unknown\",\n\
           \"additionalRisks\": [\"short risk statements drawn from the conversation\"],\n\
           \"summary\": \"1-2 sentence summary of the conversation\"\n\
         }}"
    )
}

fn compose_prompt(assessment: &RiskAssessment, advice: &[SubjectAdvice]) -> String {
    let mut lines = vec![
        "You are an academic counselor writing a short message to a student.".to_string(),
        String::new(),
        format!(
            "Risk level: {} (score {:.0}/100)",
            assessment.risk_level, assessment.risk_score
        ),
        format!("Key factors: {}", assessment.reasons.join("; ")),
        format!("Recommended action: {}", assessment.recommendation),
    ];
    if !advice.is_empty() {
        lines.push("Subject advice:".to_string());
        for item in advice {
            lines.push(format!("- {}", item.recommendation));
        }
    }
    lines.push(String::new());
    lines.push(
        "Write a warm, encouraging message (2-3 sentences) summarizing the situation \
         and the next step. Plain text only."
            .to_string(),
    );
    lines.join("\n")
}

/// Strip model control tokens and code-fence markers from a raw response.
fn strip_control_tokens(raw: &str) -> String {
    static HEADER_RE: OnceLock<Regex> = OnceLock::new();
    let re = HEADER_RE
        .get_or_init(|| Regex::new(r"<\|start_header_id\|>.*?<\|end_header_id\|>").unwrap());
    re.replace_all(raw, "")
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}
