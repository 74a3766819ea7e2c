//! Student onboarding records and the directory they are looked up from.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a student currently sits in the onboarding funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    ProfileSetup,
    Tutorial,
    DocumentUpload,
    Preferences,
    Completed,
}

impl OnboardingStep {
    /// Whether onboarding is done.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Risk weight added when a student is stalled at this step.
    pub fn stall_weight(&self) -> f64 {
        match self {
            Self::ProfileSetup => 30.0,
            Self::Tutorial => 20.0,
            Self::DocumentUpload => 15.0,
            Self::Preferences => 10.0,
            Self::Completed => 0.0,
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ProfileSetup => "profile_setup",
            Self::Tutorial => "tutorial",
            Self::DocumentUpload => "document_upload",
            Self::Preferences => "preferences",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Identity and onboarding-progress snapshot for one student.
///
/// Immutable for the duration of a session; the scoring engine reads it,
/// nothing writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: String,
    pub profile_completed: bool,
    pub tutorial_completed: bool,
    pub documents_submitted: bool,
    pub preferences_set: bool,
    pub current_step: OnboardingStep,
    pub onboarding_started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl StudentRecord {
    /// Minimal record for a student the directory has never seen:
    /// completed onboarding, fresh timestamps, synthesized email.
    pub fn unknown(student_id: &str) -> Self {
        let now = Utc::now();
        Self {
            student_id: student_id.to_string(),
            profile_completed: true,
            tutorial_completed: true,
            documents_submitted: true,
            preferences_set: true,
            current_step: OnboardingStep::Completed,
            onboarding_started_at: now,
            onboarding_completed_at: Some(now),
            created_at: now,
            updated_at: now,
            email: Some(format!("{}@example.com", student_id.to_lowercase())),
        }
    }

    /// Whether the record carries a usable contact email. Empty strings and
    /// the literal sentinel "null" both count as missing.
    pub fn has_contact_email(&self) -> bool {
        match &self.email {
            Some(email) => {
                let trimmed = email.trim();
                !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("null")
            }
            None => false,
        }
    }
}

/// Lookup boundary for student records. In production this would be a
/// database; here it is a static in-memory table.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    async fn lookup(&self, student_id: &str) -> Option<StudentRecord>;
}

/// In-memory directory seeded with the demo students.
pub struct MockDirectory {
    records: HashMap<String, StudentRecord>,
}

fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("static timestamp")
        .with_timezone(&Utc)
}

fn seeded_record(
    student_id: &str,
    started: &str,
    completed: &str,
    updated: &str,
    email: &str,
) -> StudentRecord {
    StudentRecord {
        student_id: student_id.to_string(),
        profile_completed: true,
        tutorial_completed: true,
        documents_submitted: true,
        preferences_set: true,
        current_step: OnboardingStep::Completed,
        onboarding_started_at: ts(started),
        onboarding_completed_at: Some(ts(completed)),
        created_at: ts(started),
        updated_at: ts(updated),
        email: Some(email.to_string()),
    }
}

impl MockDirectory {
    /// The three demo students, all with completed onboarding.
    pub fn seeded() -> Self {
        let records = [
            seeded_record(
                "STU001",
                "2024-01-15T10:00:00Z",
                "2024-01-16T14:00:00Z",
                "2024-01-25T09:00:00Z",
                "student001@example.com",
            ),
            seeded_record(
                "STU002",
                "2024-01-10T08:00:00Z",
                "2024-01-11T16:00:00Z",
                "2024-01-26T11:00:00Z",
                "student002@example.com",
            ),
            seeded_record(
                "STU003",
                "2024-01-20T09:00:00Z",
                "2024-01-21T10:00:00Z",
                "2024-01-27T15:00:00Z",
                "student003@example.com",
            ),
        ]
        .into_iter()
        .map(|record| (record.student_id.clone(), record))
        .collect();

        Self { records }
    }

    /// An empty directory, for tests that supply their own records.
    pub fn empty() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    pub fn insert(&mut self, record: StudentRecord) {
        self.records.insert(record.student_id.clone(), record);
    }
}

#[async_trait]
impl StudentDirectory for MockDirectory {
    async fn lookup(&self, student_id: &str) -> Option<StudentRecord> {
        self.records.get(student_id).cloned()
    }
}
