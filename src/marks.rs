//! Subjects and the incrementally-built marks set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Marks below this count as a failed subject.
pub const FAIL_THRESHOLD: f64 = 35.0;

/// The closed set of subjects, in canonical order.
///
/// The declaration order is load-bearing: question plans and score
/// breakdowns iterate subjects in this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    English,
    Marathi,
    Hindi,
    SocialScience,
    Science,
    Maths,
}

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::English,
        Subject::Marathi,
        Subject::Hindi,
        Subject::SocialScience,
        Subject::Science,
        Subject::Maths,
    ];

    /// Wire identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Marathi => "marathi",
            Self::Hindi => "hindi",
            Self::SocialScience => "social_science",
            Self::Science => "science",
            Self::Maths => "maths",
        }
    }

    /// Human-readable name for question prompts and advice text.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Marathi => "Marathi",
            Self::Hindi => "Hindi",
            Self::SocialScience => "Social Science",
            Self::Science => "Science",
            Self::Maths => "Maths",
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-subject marks, absent entries meaning "unknown".
///
/// Seeded from marks supplied at session start; conversational answers fill
/// the gaps. Values are always clamped into [0,100].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarksSet {
    marks: BTreeMap<Subject, f64>,
}

impl MarksSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp every value into [0,100]. Applied to marks arriving over the
    /// wire before they seed a session.
    pub fn sanitized(mut self) -> Self {
        for mark in self.marks.values_mut() {
            *mark = mark.clamp(0.0, 100.0);
        }
        self
    }

    pub fn get(&self, subject: Subject) -> Option<f64> {
        self.marks.get(&subject).copied()
    }

    pub fn set(&mut self, subject: Subject, mark: f64) {
        self.marks.insert(subject, mark.clamp(0.0, 100.0));
    }

    pub fn is_known(&self, subject: Subject) -> bool {
        self.marks.contains_key(&subject)
    }

    pub fn known_count(&self) -> usize {
        self.marks.len()
    }

    /// Known marks in canonical subject order.
    pub fn iter(&self) -> impl Iterator<Item = (Subject, f64)> + '_ {
        self.marks.iter().map(|(subject, mark)| (*subject, *mark))
    }

    /// Average of all known marks, or `None` when nothing is known.
    pub fn average(&self) -> Option<f64> {
        if self.marks.is_empty() {
            return None;
        }
        Some(self.marks.values().sum::<f64>() / self.marks.len() as f64)
    }

    /// Number of known marks below the fail threshold.
    pub fn failed_count(&self) -> usize {
        self.marks
            .values()
            .filter(|mark| **mark < FAIL_THRESHOLD)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_stable() {
        let names: Vec<&str> = Subject::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec!["english", "marathi", "hindi", "social_science", "science", "maths"]
        );
    }

    #[test]
    fn subject_serde_matches_wire_names() {
        for subject in Subject::ALL {
            let json = serde_json::to_string(&subject).unwrap();
            assert_eq!(json, format!("\"{subject}\""));
        }
        let parsed: Subject = serde_json::from_str("\"social_science\"").unwrap();
        assert_eq!(parsed, Subject::SocialScience);
    }

    #[test]
    fn set_clamps_out_of_range_marks() {
        let mut marks = MarksSet::new();
        marks.set(Subject::Maths, 150.0);
        marks.set(Subject::English, -20.0);
        assert_eq!(marks.get(Subject::Maths), Some(100.0));
        assert_eq!(marks.get(Subject::English), Some(0.0));
    }

    #[test]
    fn average_and_failed_count() {
        let mut marks = MarksSet::new();
        assert_eq!(marks.average(), None);
        assert_eq!(marks.failed_count(), 0);

        marks.set(Subject::English, 30.0);
        marks.set(Subject::Maths, 34.9);
        marks.set(Subject::Science, 80.0);
        let avg = marks.average().unwrap();
        assert!((avg - 48.3).abs() < 0.1);
        assert_eq!(marks.failed_count(), 2);
    }

    #[test]
    fn iter_follows_canonical_order() {
        let mut marks = MarksSet::new();
        marks.set(Subject::Maths, 50.0);
        marks.set(Subject::English, 60.0);
        marks.set(Subject::Hindi, 70.0);
        let order: Vec<Subject> = marks.iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec![Subject::English, Subject::Hindi, Subject::Maths]);
    }

    #[test]
    fn marks_set_deserializes_from_wire_object() {
        let marks: MarksSet =
            serde_json::from_str(r#"{"english": 90, "social_science": 91}"#).unwrap();
        assert_eq!(marks.get(Subject::English), Some(90.0));
        assert_eq!(marks.get(Subject::SocialScience), Some(91.0));
        assert!(!marks.is_known(Subject::Maths));
    }

    #[test]
    fn sanitized_clamps_wire_values() {
        let marks: MarksSet = serde_json::from_str(r#"{"maths": 250}"#).unwrap();
        let marks = marks.sanitized();
        assert_eq!(marks.get(Subject::Maths), Some(100.0));
    }
}
