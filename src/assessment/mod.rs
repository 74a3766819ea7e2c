//! The assessment core.
//!
//! A session walks an ordered question plan, parses each free-form answer
//! into a typed value, optionally injects a follow-up probe, and once the
//! plan is exhausted scores the student with a deterministic weighted rule
//! set. The narrative layer only decorates the result afterwards.

pub mod followup;
pub mod parser;
pub mod question;
pub mod scoring;
pub mod subjects;

pub use question::{Answer, AnswerKind, PlanOptions, Question, build_plan};
pub use scoring::{RiskAssessment, RiskTier, assess};
pub use subjects::{SubjectAdvice, SubjectTier, analyze};
