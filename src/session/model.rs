//! Per-student conversation state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::question::{Answer, Question};
use crate::marks::MarksSet;
use crate::student::StudentRecord;

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    Student,
    Assistant,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Student => "Student",
            Self::Assistant => "Assistant",
        };
        f.write_str(s)
    }
}

/// One entry in the conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub id: Uuid,
    pub role: TurnRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl TranscriptTurn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// Where the conversation currently stands.
///
/// `AwaitingFollowUp` is an explicit sub-state: the cursor does not move
/// while a follow-up probe is pending, and the next student message is
/// consumed as the probe's free-text answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum ConversationPhase {
    AwaitingAnswer,
    AwaitingFollowUp { for_question: String },
    Completed,
}

/// The mutable aggregate for one in-progress assessment.
#[derive(Debug, Clone)]
pub struct Session {
    pub record: StudentRecord,
    pub marks: MarksSet,
    pub answers: HashMap<String, Answer>,
    pub plan: Vec<Question>,
    /// Index of the next question to ask. Only ever moves forward.
    pub cursor: usize,
    pub phase: ConversationPhase,
    pub transcript: Vec<TranscriptTurn>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(record: StudentRecord, marks: MarksSet, plan: Vec<Question>) -> Self {
        Self {
            record,
            marks,
            answers: HashMap::new(),
            plan,
            cursor: 0,
            phase: ConversationPhase::AwaitingAnswer,
            transcript: Vec::new(),
            last_active: Utc::now(),
        }
    }

    /// The question at the cursor, if any.
    pub fn current_question(&self) -> Option<&Question> {
        self.plan.get(self.cursor)
    }

    /// Move the cursor forward past questions whose gate was not answered
    /// affirmatively, stopping at the next active question. Returns `None`
    /// when the plan is exhausted.
    pub fn advance_to_active(&mut self) -> Option<Question> {
        while self.cursor < self.plan.len() {
            if self.gate_satisfied(&self.plan[self.cursor]) {
                return Some(self.plan[self.cursor].clone());
            }
            self.cursor += 1;
        }
        None
    }

    fn gate_satisfied(&self, question: &Question) -> bool {
        match &question.gated_on {
            None => true,
            Some(gate) => matches!(self.answers.get(gate), Some(Answer::Bool(true))),
        }
    }

    pub fn push_turn(&mut self, role: TurnRole, text: impl Into<String>) {
        self.transcript.push(TranscriptTurn::new(role, text));
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Render the transcript the way the narrative prompts expect it.
    pub fn transcript_text(&self) -> String {
        self.transcript
            .iter()
            .map(|turn| format!("{}: {}", turn.role, turn.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
