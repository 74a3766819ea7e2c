//! HTTP API — the two chat endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::assessment::scoring::RiskAssessment;
use crate::assessment::subjects::SubjectAdvice;
use crate::marks::MarksSet;
use crate::session::{ChatOutcome, SessionManager};

/// Shared state for the chat routes.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
}

/// POST /api/start-chat request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartChatRequest {
    pub student_id: String,
    #[serde(default)]
    pub provided_marks: MarksSet,
}

/// POST /api/chat request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub student_id: String,
    pub message: String,
}

/// Response body shared by both endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_follow_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<RiskAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_advice: Option<Vec<SubjectAdvice>>,
}

impl From<ChatOutcome> for ChatResponse {
    fn from(outcome: ChatOutcome) -> Self {
        match outcome {
            ChatOutcome::Question { text, is_follow_up } => Self {
                message: text,
                completed: false,
                is_follow_up: is_follow_up.then_some(true),
                prediction: None,
                subject_advice: None,
            },
            ChatOutcome::Completed {
                prediction,
                advice,
                message,
            } => Self {
                message,
                completed: true,
                is_follow_up: None,
                prediction: Some(prediction),
                subject_advice: Some(advice),
            },
        }
    }
}

/// POST /api/start-chat
///
/// Starts (or restarts) a session. Responds with either the first question
/// or, when nothing needs to be asked, the completed assessment.
async fn start_chat(
    State(state): State<AppState>,
    Json(request): Json<StartChatRequest>,
) -> impl IntoResponse {
    let outcome = state
        .sessions
        .start_session(&request.student_id, request.provided_marks.sanitized())
        .await;
    Json(ChatResponse::from(outcome))
}

/// POST /api/chat
///
/// One conversational turn. Unknown or finished sessions are client
/// errors; everything else answers 200.
async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    match state
        .sessions
        .handle_turn(&request.student_id, &request.message)
        .await
    {
        Ok(outcome) => Json(ChatResponse::from(outcome)).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Build the chat API router.
pub fn chat_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/start-chat", post(start_chat))
        .route("/api/chat", post(chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
