//! Question plans — the ordered list of questions a session still needs.

use serde::{Deserialize, Serialize};

use crate::marks::{MarksSet, Subject};

/// The answer type a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    YesNo,
    Number,
    Text,
}

/// A typed answer, as produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Answer {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// One entry in an assessment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique within a plan, e.g. `has_maths` or `maths_score`.
    pub id: String,
    /// Canonical prompt text. The narrative layer may rephrase it; this
    /// text is the deterministic fallback.
    pub text: String,
    pub kind: AnswerKind,
    /// Id of a yes/no question that must be answered affirmatively before
    /// this one is asked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gated_on: Option<String>,
    /// Subject whose mark this question collects, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
}

/// Options controlling plan construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Prepend the five study-habit questions to the subject section.
    pub include_baseline: bool,
}

/// Build the ordered question plan for a session.
///
/// Each subject without a known mark contributes a gating yes/no question
/// immediately followed by a gated score question. Subjects with known
/// marks contribute nothing; with every mark known (and no baseline
/// section) the plan is empty and the caller skips straight to scoring.
pub fn build_plan(known: &MarksSet, opts: PlanOptions) -> Vec<Question> {
    let mut plan = Vec::new();

    if opts.include_baseline {
        plan.extend(baseline_questions());
    }

    for subject in Subject::ALL {
        if known.is_known(subject) {
            continue;
        }
        let gate_id = format!("has_{subject}");
        plan.push(Question {
            id: gate_id.clone(),
            text: format!(
                "Do you have a mark for {}? (yes/no)",
                subject.display_name()
            ),
            kind: AnswerKind::YesNo,
            gated_on: None,
            subject: Some(subject),
        });
        plan.push(Question {
            id: format!("{subject}_score"),
            text: format!(
                "What mark did you get in {}? (0-100)",
                subject.display_name()
            ),
            kind: AnswerKind::Number,
            gated_on: Some(gate_id),
            subject: Some(subject),
        });
    }

    plan
}

/// The five study-habit questions asked before any subject questions when
/// the baseline section is enabled.
fn baseline_questions() -> Vec<Question> {
    let entries: [(&str, &str, AnswerKind); 5] = [
        (
            "study_hours",
            "How many hours do you study per day on average?",
            AnswerKind::Number,
        ),
        (
            "attendance",
            "What is your average class attendance percentage? (0-100)",
            AnswerKind::Number,
        ),
        (
            "support_system",
            "Do you have access to tutoring or academic support when you need help? (yes/no)",
            AnswerKind::YesNo,
        ),
        (
            "motivation",
            "On a scale of 1-10, how motivated do you feel about your studies?",
            AnswerKind::Number,
        ),
        (
            "challenges",
            "What is your biggest challenge in your studies? (understanding concepts/time management/lack of resources/personal issues)",
            AnswerKind::Text,
        ),
    ];

    entries.into_iter()
        .map(|(id, text, kind)| Question {
            id: id.to_string(),
            text: text.to_string(),
            kind,
            gated_on: None,
            subject: None,
        })
        .collect()
}
