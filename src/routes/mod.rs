//! API routes

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::conversation::Message;
use crate::core::RelayError;
use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    conversations: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayQuery {
    pub text: Option<String>,
    pub conversation_id: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub conversation_id: String,
    pub messages: Vec<Message>,
}

/// Errors rendered as `{"error": ...}` bodies
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Text and conversationId are required")]
    MissingFields,

    #[error("{0}")]
    InvalidQuery(String),

    #[error("Conversation not found")]
    ConversationNotFound,

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingFields | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::ConversationNotFound => StatusCode::NOT_FOUND,
            ApiError::Relay(RelayError::Upstream(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Relay(RelayError::MalformedResponse(_)) => StatusCode::BAD_GATEWAY,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        conversations: state.relay_engine.conversation_count().await,
    })
}

async fn relay(
    State(state): State<AppState>,
    query: Result<Query<RelayQuery>, QueryRejection>,
) -> Result<Json<RelayResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))?;
    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

    let (Some(text), Some(conversation_id)) =
        (non_empty(query.text), non_empty(query.conversation_id))
    else {
        return Err(ApiError::MissingFields);
    };

    let model = non_empty(query.model).unwrap_or_else(|| state.config.default_model.clone());

    let response = state
        .relay_engine
        .send(&conversation_id, &text, &model)
        .await?;

    Ok(Json(RelayResponse { response }))
}

async fn history(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let messages = state
        .relay_engine
        .history(&conversation_id)
        .await
        .ok_or(ApiError::ConversationNotFound)?;

    Ok(Json(HistoryResponse {
        conversation_id,
        messages,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/blackbox", get(relay))
        .route("/api/blackbox/:conversation_id/history", get(history))
}
