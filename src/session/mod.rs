//! Conversation sessions and their orchestration.
//!
//! A session is the mutable aggregate for one assessment pass: the student
//! record snapshot, the evolving marks set, the ordered question plan, a
//! forward-only cursor, and the transcript. The manager keys sessions by
//! student id and serializes access per key.

pub mod manager;
pub mod model;

pub use manager::{ChatOutcome, SessionManager, spawn_expiry_task};
pub use model::{ConversationPhase, Session, TranscriptTurn, TurnRole};
