//! SessionManager — owns the per-student session map and orchestrates the
//! assessment flow across plan building, parsing, follow-ups, scoring, and
//! narrative augmentation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::assessment::followup;
use crate::assessment::parser::parse_answer;
use crate::assessment::question::{Answer, AnswerKind, PlanOptions, build_plan};
use crate::assessment::scoring::{RiskAssessment, assess};
use crate::assessment::subjects::{SubjectAdvice, analyze};
use crate::config::AssessmentConfig;
use crate::error::SessionError;
use crate::marks::MarksSet;
use crate::narrative::NarrativeAugmenter;
use crate::student::{StudentDirectory, StudentRecord};

use super::model::{ConversationPhase, Session, TurnRole};

/// What a chat turn produced.
#[derive(Debug, Clone)]
pub enum ChatOutcome {
    /// Another question for the student.
    Question { text: String, is_follow_up: bool },
    /// The assessment is finished.
    Completed {
        prediction: RiskAssessment,
        advice: Vec<SubjectAdvice>,
        message: String,
    },
}

/// Orchestrates conversations, one serialized session per student id.
///
/// The map lock is held only to look up or insert a session handle; each
/// session has its own mutex, so concurrent turns for the same student are
/// serialized while other students proceed in parallel.
pub struct SessionManager {
    directory: Arc<dyn StudentDirectory>,
    augmenter: NarrativeAugmenter,
    config: AssessmentConfig,
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    pub fn new(
        directory: Arc<dyn StudentDirectory>,
        augmenter: NarrativeAugmenter,
        config: AssessmentConfig,
    ) -> Self {
        Self {
            directory,
            augmenter,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start (or restart) an assessment session for a student.
    ///
    /// With nothing left to ask the assessment completes immediately from
    /// the known marks alone, without a single conversational turn.
    pub async fn start_session(&self, student_id: &str, provided: MarksSet) -> ChatOutcome {
        let record = match self.directory.lookup(student_id).await {
            Some(record) => record,
            None => {
                debug!(student_id, "Student not in directory, using default record");
                StudentRecord::unknown(student_id)
            }
        };

        let plan = build_plan(
            &provided,
            PlanOptions {
                include_baseline: self.config.include_baseline,
            },
        );
        info!(
            student_id,
            questions = plan.len(),
            known_marks = provided.known_count(),
            "Session started"
        );

        let mut session = Session::new(record, provided, plan);
        let outcome = match session.advance_to_active() {
            Some(question) => {
                let text = self.augmenter.rephrase_question(&question.text).await;
                session.push_turn(TurnRole::Assistant, text.as_str());
                ChatOutcome::Question {
                    text,
                    is_follow_up: false,
                }
            }
            None => self.complete(&mut session).await,
        };

        self.sessions
            .write()
            .await
            .insert(student_id.to_string(), Arc::new(Mutex::new(session)));

        outcome
    }

    /// Process one chat turn for an existing session.
    pub async fn handle_turn(
        &self,
        student_id: &str,
        message: &str,
    ) -> Result<ChatOutcome, SessionError> {
        let handle = {
            let sessions = self.sessions.read().await;
            sessions.get(student_id).cloned()
        }
        .ok_or_else(|| SessionError::UnknownSession {
            student_id: student_id.to_string(),
        })?;

        let mut session = handle.lock().await;
        session.touch();

        match session.phase.clone() {
            ConversationPhase::Completed => Err(SessionError::AlreadyComplete {
                student_id: student_id.to_string(),
            }),
            ConversationPhase::AwaitingFollowUp { for_question } => {
                session.push_turn(TurnRole::Student, message);
                // The whole message is the probe's free-text answer.
                session.answers.insert(
                    format!("{for_question}_followup"),
                    Answer::Text(message.trim().to_string()),
                );
                session.phase = ConversationPhase::AwaitingAnswer;
                session.cursor += 1;
                Ok(self.next_or_complete(&mut session).await)
            }
            ConversationPhase::AwaitingAnswer => {
                session.push_turn(TurnRole::Student, message);
                let Some(question) = session.current_question().cloned() else {
                    // Cursor past the plan without a completion signal;
                    // guarded here rather than assumed impossible.
                    debug_assert!(false, "cursor beyond plan while awaiting an answer");
                    return Ok(self.complete(&mut session).await);
                };

                match parse_answer(message, question.kind, self.config.parsing) {
                    Some(answer) => {
                        debug!(question = %question.id, "Answer accepted");
                        session.answers.insert(question.id.clone(), answer.clone());

                        // Subject score answers feed the marks set and may
                        // warrant a follow-up probe before moving on.
                        if question.kind == AnswerKind::Number {
                            if let (Some(subject), Some(value)) =
                                (question.subject, answer.as_number())
                            {
                                session.marks.set(subject, value);
                                if let Some(probe) = followup::evaluate(value, &session.record) {
                                    debug!(question = %question.id, ?probe, "Follow-up probe fired");
                                    session.phase = ConversationPhase::AwaitingFollowUp {
                                        for_question: question.id.clone(),
                                    };
                                    let text = self
                                        .augmenter
                                        .rephrase_question(probe.canonical_text())
                                        .await;
                                    session.push_turn(TurnRole::Assistant, text.as_str());
                                    return Ok(ChatOutcome::Question {
                                        text,
                                        is_follow_up: true,
                                    });
                                }
                            }
                        }
                    }
                    None => {
                        debug!(question = %question.id, "Answer not understood, recorded as unknown");
                    }
                }

                session.cursor += 1;
                Ok(self.next_or_complete(&mut session).await)
            }
        }
    }

    async fn next_or_complete(&self, session: &mut Session) -> ChatOutcome {
        match session.advance_to_active() {
            Some(question) => {
                let text = self.augmenter.rephrase_question(&question.text).await;
                session.push_turn(TurnRole::Assistant, text.as_str());
                ChatOutcome::Question {
                    text,
                    is_follow_up: false,
                }
            }
            None => self.complete(session).await,
        }
    }

    /// Run the scoring engine and narrative decoration, then close the
    /// session. The transcript analysis may append reasons; the numeric
    /// score and tier come from the rule set alone.
    async fn complete(&self, session: &mut Session) -> ChatOutcome {
        let mut prediction = assess(
            &session.record,
            &session.marks,
            &session.answers,
            self.config.scoring,
            Utc::now(),
        );
        let advice = analyze(&session.marks);

        let analysis = self
            .augmenter
            .analyze_transcript(&session.transcript_text())
            .await;
        prediction
            .reasons
            .extend(analysis.additional_risks.iter().cloned());

        let message = self.augmenter.compose_message(&prediction, &advice).await;
        session.push_turn(TurnRole::Assistant, message.as_str());
        session.phase = ConversationPhase::Completed;

        info!(
            student_id = %session.record.student_id,
            score = prediction.risk_score,
            tier = %prediction.risk_level,
            will_dropout = prediction.will_dropout,
            "Assessment completed"
        );

        ChatOutcome::Completed {
            prediction,
            advice,
            message,
        }
    }

    /// Drop sessions idle past `max_idle`. Sessions currently serving a
    /// turn hold their own mutex and are skipped. Returns how many were
    /// removed.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let max_idle =
            chrono::Duration::from_std(max_idle).unwrap_or_else(|_| chrono::Duration::hours(1));
        let cutoff = Utc::now() - max_idle;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.last_active >= cutoff,
            Err(_) => true,
        });
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Spawn the periodic idle-session sweep.
pub fn spawn_expiry_task(
    manager: Arc<SessionManager>,
    max_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let pruned = manager.prune_idle(max_idle).await;
            if pruned > 0 {
                info!(pruned, "Pruned idle sessions");
            }
        }
    })
}
