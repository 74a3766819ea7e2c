//! Deterministic weighted-rule dropout risk scoring.
//!
//! Two rule sets are attested and both are kept, selected by
//! [`ScoringProfile`]:
//! - `Progress` (canonical): onboarding-progress, time-decay, contact, and
//!   academic rules, banded at 80/60.
//! - `Academic`: the academic/study-habit rule set, banded at 70/40.
//!
//! Scoring is a pure function of its inputs; `now` is an explicit argument
//! so results are reproducible.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScoringProfile;
use crate::marks::MarksSet;
use crate::student::StudentRecord;

use super::question::Answer;

/// Qualitative risk banding derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// The computed output of one assessment pass. Never mutated after
/// creation except for narrative reasons appended by the session layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_level: RiskTier,
    pub will_dropout: bool,
    pub reasons: Vec<String>,
    pub recommendation: String,
}

/// Compute the risk assessment for one student.
///
/// All applicable rules are additive; the total is clamped to [0,100].
/// Every fired rule contributes exactly one reason string, in
/// rule-evaluation order.
pub fn assess(
    record: &StudentRecord,
    marks: &MarksSet,
    answers: &HashMap<String, Answer>,
    profile: ScoringProfile,
    now: DateTime<Utc>,
) -> RiskAssessment {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    match profile {
        ScoringProfile::Progress => {
            progress_rules(record, now, &mut score, &mut reasons);
            academic_rules(marks, &mut score, &mut reasons, 30.0, 20.0, 25.0, 15.0);
        }
        ScoringProfile::Academic => {
            academic_rules(marks, &mut score, &mut reasons, 40.0, 25.0, 30.0, 15.0);
            habit_rules(answers, &mut score, &mut reasons);
        }
    }

    let score = score.clamp(0.0, 100.0);
    let (high, medium) = profile_bands(profile);
    let risk_level = if score >= high {
        RiskTier::High
    } else if score >= medium {
        RiskTier::Medium
    } else {
        RiskTier::Low
    };
    let will_dropout = score >= dropout_cutoff(profile);

    if reasons.is_empty() {
        reasons.push("No significant risk factors identified".to_string());
    }

    RiskAssessment {
        risk_score: score,
        risk_level,
        will_dropout,
        reasons,
        recommendation: recommendation_for(risk_level).to_string(),
    }
}

fn profile_bands(profile: ScoringProfile) -> (f64, f64) {
    match profile {
        ScoringProfile::Progress => (80.0, 60.0),
        ScoringProfile::Academic => (70.0, 40.0),
    }
}

fn dropout_cutoff(profile: ScoringProfile) -> f64 {
    match profile {
        ScoringProfile::Progress => 60.0,
        ScoringProfile::Academic => 70.0,
    }
}

/// Onboarding-progress, time-decay, and contact-validity rules.
fn progress_rules(
    record: &StudentRecord,
    now: DateTime<Utc>,
    score: &mut f64,
    reasons: &mut Vec<String>,
) {
    if !record.profile_completed {
        *score += 25.0;
        reasons.push("Profile setup was never completed".to_string());
    }
    if !record.tutorial_completed {
        *score += 20.0;
        reasons.push("Tutorial was never completed".to_string());
    }
    if !record.documents_submitted {
        *score += 15.0;
        reasons.push("Required documents were not submitted".to_string());
    }
    if !record.preferences_set {
        *score += 10.0;
        reasons.push("Preferences were never set".to_string());
    }

    if !record.current_step.is_terminal() {
        *score += record.current_step.stall_weight();
        reasons.push(format!(
            "Onboarding stalled at the {} step",
            record.current_step
        ));
    }

    let days_since_start = (now - record.onboarding_started_at).num_days();
    if days_since_start > 14 {
        *score += 25.0;
        reasons.push(format!("Onboarding open for {days_since_start} days"));
    } else if days_since_start > 7 {
        *score += 15.0;
        reasons.push(format!("Onboarding open for {days_since_start} days"));
    }

    let days_since_update = (now - record.updated_at).num_days();
    if days_since_update > 7 {
        *score += 20.0;
        reasons.push(format!("No activity for {days_since_update} days"));
    } else if days_since_update > 3 {
        *score += 10.0;
        reasons.push(format!("No activity for {days_since_update} days"));
    }

    if !record.has_contact_email() {
        *score += 15.0;
        reasons.push("No usable contact email on file".to_string());
    }
}

/// Failed-subject and average-mark rules, with weights varying by profile.
fn academic_rules(
    marks: &MarksSet,
    score: &mut f64,
    reasons: &mut Vec<String>,
    w_failed_many: f64,
    w_failed_two: f64,
    w_low_avg: f64,
    w_below_avg: f64,
) {
    let failed = marks.failed_count();
    if failed >= 3 {
        *score += w_failed_many;
        reasons.push(format!("Failed {failed} subjects"));
    } else if failed == 2 {
        *score += w_failed_two;
        reasons.push(format!("Failed {failed} subjects"));
    }

    if let Some(avg) = marks.average() {
        if avg < 40.0 {
            *score += w_low_avg;
            reasons.push(format!("Low average: {avg:.1}%"));
        } else if avg < 50.0 {
            *score += w_below_avg;
            reasons.push(format!("Below average: {avg:.1}%"));
        }
    }
}

/// Study-habit rules, fed by the baseline question answers. Absent answers
/// fire nothing.
fn habit_rules(answers: &HashMap<String, Answer>, score: &mut f64, reasons: &mut Vec<String>) {
    if let Some(hours) = answers.get("study_hours").and_then(Answer::as_number) {
        if hours < 2.0 {
            *score += 15.0;
            reasons.push("Insufficient study time".to_string());
        }
    }
    if let Some(attendance) = answers.get("attendance").and_then(Answer::as_number) {
        if attendance < 75.0 {
            *score += 20.0;
            reasons.push(format!("Low attendance: {attendance}%"));
        }
    }
    if answers.get("support_system").and_then(Answer::as_bool) == Some(false) {
        *score += 15.0;
        reasons.push("No academic support system".to_string());
    }
    if let Some(motivation) = answers.get("motivation").and_then(Answer::as_number) {
        if motivation <= 5.0 {
            *score += 20.0;
            reasons.push("Low motivation level".to_string());
        }
    }
}

fn recommendation_for(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => {
            "URGENT: Immediate intervention needed. Schedule one-on-one counseling, assign an academic mentor, and create a personalized study plan."
        }
        RiskTier::Medium => {
            "MODERATE RISK: Provide additional support. Offer tutoring sessions, monitor progress weekly, and encourage participation in study groups."
        }
        RiskTier::Low => {
            "LOW RISK: Continue regular monitoring. Provide positive reinforcement and maintain open communication channels."
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::marks::Subject;
    use crate::student::OnboardingStep;

    use super::*;

    fn clean_record(now: DateTime<Utc>) -> StudentRecord {
        StudentRecord {
            student_id: "STU001".to_string(),
            profile_completed: true,
            tutorial_completed: true,
            documents_submitted: true,
            preferences_set: true,
            current_step: OnboardingStep::Completed,
            onboarding_started_at: now,
            onboarding_completed_at: Some(now),
            created_at: now,
            updated_at: now,
            email: Some("student@example.com".to_string()),
        }
    }

    fn stalled_record(now: DateTime<Utc>) -> StudentRecord {
        StudentRecord {
            profile_completed: false,
            tutorial_completed: false,
            documents_submitted: false,
            preferences_set: false,
            current_step: OnboardingStep::ProfileSetup,
            onboarding_started_at: now - Duration::days(20),
            onboarding_completed_at: None,
            updated_at: now - Duration::days(20),
            email: None,
            ..clean_record(now)
        }
    }

    fn good_marks() -> MarksSet {
        let mut marks = MarksSet::new();
        for subject in Subject::ALL {
            marks.set(subject, 85.0);
        }
        marks
    }

    fn failing_marks() -> MarksSet {
        let mut marks = MarksSet::new();
        for subject in Subject::ALL {
            marks.set(subject, 30.0);
        }
        marks
    }

    #[test]
    fn clean_record_with_good_marks_is_low_risk() {
        let now = Utc::now();
        let result = assess(
            &clean_record(now),
            &good_marks(),
            &HashMap::new(),
            ScoringProfile::Progress,
            now,
        );
        assert_eq!(result.risk_score, 0.0);
        assert_eq!(result.risk_level, RiskTier::Low);
        assert!(!result.will_dropout);
        assert_eq!(
            result.reasons,
            vec!["No significant risk factors identified".to_string()]
        );
        assert!(result.recommendation.starts_with("LOW RISK"));
    }

    #[test]
    fn stalled_record_with_failing_marks_clamps_at_100() {
        let now = Utc::now();
        // Every progress, time-decay, contact, and academic rule fires:
        // 25+20+15+10+30+25+20+15+30+25 = 215, clamped.
        let result = assess(
            &stalled_record(now),
            &failing_marks(),
            &HashMap::new(),
            ScoringProfile::Progress,
            now,
        );
        assert_eq!(result.risk_score, 100.0);
        assert_eq!(result.risk_level, RiskTier::High);
        assert!(result.will_dropout);
        assert_eq!(result.reasons.len(), 10);
    }

    #[test]
    fn assessment_is_deterministic() {
        let now = Utc::now();
        let record = stalled_record(now);
        let marks = failing_marks();
        let a = assess(&record, &marks, &HashMap::new(), ScoringProfile::Progress, now);
        let b = assess(&record, &marks, &HashMap::new(), ScoringProfile::Progress, now);
        assert_eq!(a.risk_score, b.risk_score);
        assert_eq!(a.risk_level, b.risk_level);
        assert_eq!(a.reasons, b.reasons);
    }

    #[test]
    fn reasons_follow_rule_evaluation_order() {
        let now = Utc::now();
        let record = StudentRecord {
            tutorial_completed: false,
            email: None,
            ..clean_record(now)
        };
        let mut marks = MarksSet::new();
        marks.set(Subject::English, 30.0);
        marks.set(Subject::Maths, 30.0);

        let result = assess(
            &record,
            &marks,
            &HashMap::new(),
            ScoringProfile::Progress,
            now,
        );
        // tutorial (20) + email (15) + two failed (20) + avg 30 (25) = 80
        assert_eq!(result.risk_score, 80.0);
        assert_eq!(result.risk_level, RiskTier::High);
        assert_eq!(result.reasons[0], "Tutorial was never completed");
        assert_eq!(result.reasons[1], "No usable contact email on file");
        assert_eq!(result.reasons[2], "Failed 2 subjects");
        assert_eq!(result.reasons[3], "Low average: 30.0%");
    }

    #[test]
    fn progress_time_decay_bands() {
        let now = Utc::now();
        let record = StudentRecord {
            onboarding_started_at: now - Duration::days(10),
            updated_at: now - Duration::days(5),
            ..clean_record(now)
        };
        let result = assess(
            &record,
            &good_marks(),
            &HashMap::new(),
            ScoringProfile::Progress,
            now,
        );
        // 10 days open (+15) and 5 days quiet (+10).
        assert_eq!(result.risk_score, 25.0);
        assert_eq!(result.risk_level, RiskTier::Low);
    }

    #[test]
    fn academic_profile_uses_its_own_weights_and_bands() {
        let now = Utc::now();
        let result = assess(
            &clean_record(now),
            &failing_marks(),
            &HashMap::new(),
            ScoringProfile::Academic,
            now,
        );
        // Six failed (+40), average 30 (+30) = 70.
        assert_eq!(result.risk_score, 70.0);
        assert_eq!(result.risk_level, RiskTier::High);
        assert!(result.will_dropout);
    }

    #[test]
    fn academic_profile_reads_habit_answers() {
        let now = Utc::now();
        let mut answers = HashMap::new();
        answers.insert("study_hours".to_string(), Answer::Number(1.0));
        answers.insert("attendance".to_string(), Answer::Number(60.0));
        answers.insert("support_system".to_string(), Answer::Bool(false));
        answers.insert("motivation".to_string(), Answer::Number(3.0));

        let result = assess(
            &clean_record(now),
            &good_marks(),
            &answers,
            ScoringProfile::Academic,
            now,
        );
        // 15 + 20 + 15 + 20 = 70.
        assert_eq!(result.risk_score, 70.0);
        assert_eq!(result.reasons.len(), 4);
        assert_eq!(result.reasons[0], "Insufficient study time");
        assert_eq!(result.reasons[1], "Low attendance: 60%");
        assert_eq!(result.reasons[2], "No academic support system");
        assert_eq!(result.reasons[3], "Low motivation level");
    }

    #[test]
    fn academic_profile_medium_band() {
        let now = Utc::now();
        let mut marks = MarksSet::new();
        marks.set(Subject::English, 30.0);
        marks.set(Subject::Maths, 30.0);
        marks.set(Subject::Science, 80.0);

        let result = assess(
            &clean_record(now),
            &marks,
            &HashMap::new(),
            ScoringProfile::Academic,
            now,
        );
        // Two failed (+25), average 46.7 (+15) = 40: MEDIUM, no dropout.
        assert_eq!(result.risk_score, 40.0);
        assert_eq!(result.risk_level, RiskTier::Medium);
        assert!(!result.will_dropout);
        assert!(result.recommendation.starts_with("MODERATE RISK"));
    }

    #[test]
    fn will_dropout_tracks_profile_cutoff() {
        let now = Utc::now();
        // Progress: 60 is the cutoff.
        let record = StudentRecord {
            profile_completed: false,
            tutorial_completed: false,
            documents_submitted: false,
            ..clean_record(now)
        };
        let result = assess(
            &record,
            &good_marks(),
            &HashMap::new(),
            ScoringProfile::Progress,
            now,
        );
        assert_eq!(result.risk_score, 60.0);
        assert_eq!(result.risk_level, RiskTier::Medium);
        assert!(result.will_dropout);
    }

    #[test]
    fn tier_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&RiskTier::High).unwrap(), "\"HIGH\"");
        assert_eq!(serde_json::to_string(&RiskTier::Low).unwrap(), "\"LOW\"");
    }
}
