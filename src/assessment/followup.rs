//! Conditional follow-up probes after subject-score answers.
//!
//! A probe fires only immediately after a numeric subject score is
//! accepted, and at most one probe can be pending at a time. The probe's
//! answer is free text; it feeds the transcript, not the marks.

use crate::student::StudentRecord;

/// Why a follow-up probe fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Score below the pass mark.
    Failing,
    /// Borderline score from a student who never finished the tutorial.
    Struggling,
}

impl FollowUp {
    /// Canonical probe text; the deterministic fallback when rephrasing is
    /// unavailable.
    pub fn canonical_text(&self) -> &'static str {
        match self {
            Self::Failing => {
                "That sounds tough. Do you have access to tutoring or extra support when you need it?"
            }
            Self::Struggling => {
                "Would extra help working through the course material make a difference for you?"
            }
        }
    }
}

/// Decide whether an accepted subject score warrants an extra probe.
/// Rules are checked in order; the first match wins.
pub fn evaluate(score: f64, record: &StudentRecord) -> Option<FollowUp> {
    if score < 35.0 {
        Some(FollowUp::Failing)
    } else if score < 50.0 && !record.tutorial_completed {
        Some(FollowUp::Struggling)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tutorial_completed: bool) -> StudentRecord {
        StudentRecord {
            tutorial_completed,
            ..StudentRecord::unknown("STU001")
        }
    }

    #[test]
    fn failing_score_always_probes() {
        assert_eq!(evaluate(0.0, &record(true)), Some(FollowUp::Failing));
        assert_eq!(evaluate(34.9, &record(true)), Some(FollowUp::Failing));
        assert_eq!(evaluate(34.9, &record(false)), Some(FollowUp::Failing));
    }

    #[test]
    fn borderline_probes_only_without_tutorial() {
        assert_eq!(evaluate(40.0, &record(false)), Some(FollowUp::Struggling));
        assert_eq!(evaluate(49.9, &record(false)), Some(FollowUp::Struggling));
        assert_eq!(evaluate(40.0, &record(true)), None);
    }

    #[test]
    fn boundaries() {
        // 35 is no longer failing; 50 is no longer borderline.
        assert_eq!(evaluate(35.0, &record(false)), Some(FollowUp::Struggling));
        assert_eq!(evaluate(50.0, &record(false)), None);
        assert_eq!(evaluate(75.0, &record(false)), None);
    }
}
