//! Per-subject mark classification and prioritized advice.

use serde::{Deserialize, Serialize};

use crate::marks::{MarksSet, Subject};

/// Severity banding for a single subject mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectTier {
    Critical,
    NeedsImprovement,
    Weak,
    Strong,
}

impl SubjectTier {
    /// Exactly one tier per mark.
    pub fn classify(mark: f64) -> Self {
        if mark < 35.0 {
            Self::Critical
        } else if mark < 50.0 {
            Self::NeedsImprovement
        } else if mark < 60.0 {
            Self::Weak
        } else {
            Self::Strong
        }
    }
}

/// A single prioritized recommendation about one subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectAdvice {
    pub subject: Subject,
    pub mark: f64,
    pub tier: SubjectTier,
    /// 1 = critical, 2 = needs improvement, 3 = weak.
    pub priority: u8,
    pub recommendation: String,
}

/// Classify every known mark and return advice sorted ascending by
/// priority. The sort is stable, so subjects within the same tier keep
/// their encounter order. Strong subjects generate no advice.
pub fn analyze(marks: &MarksSet) -> Vec<SubjectAdvice> {
    let mut advice = Vec::new();

    for (subject, mark) in marks.iter() {
        let tier = SubjectTier::classify(mark);
        let (priority, recommendation) = match tier {
            SubjectTier::Critical => (
                1,
                format!(
                    "{} is at a failing level ({mark:.0}%). Arrange urgent remedial classes.",
                    subject.display_name()
                ),
            ),
            SubjectTier::NeedsImprovement => (
                2,
                format!(
                    "{} needs improvement ({mark:.0}%). Schedule regular practice sessions.",
                    subject.display_name()
                ),
            ),
            SubjectTier::Weak => (
                3,
                format!(
                    "{} is below average ({mark:.0}%). Encourage steady revision.",
                    subject.display_name()
                ),
            ),
            SubjectTier::Strong => continue,
        };
        advice.push(SubjectAdvice {
            subject,
            mark,
            tier,
            priority,
            recommendation,
        });
    }

    advice.sort_by_key(|a| a.priority);
    advice
}
