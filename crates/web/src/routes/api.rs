//! The history API, served from the in-process backend so another instance can point `api_base` here.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use murmur_storage::ConversationId;
use murmur_transport::{ConversationPayload, SendMessageRequest, SendReply};
use snafu::ResultExt;

use crate::error::{AppResult, BackendSnafu};
use crate::state::AppState;

pub async fn history(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<ConversationPayload>>> {
    state
        .backend
        .history()
        .map(Json)
        .context(BackendSnafu { stage: "api-history" })
}

pub async fn create(State(state): State<Arc<AppState>>) -> AppResult<Json<ConversationPayload>> {
    state
        .backend
        .create()
        .map(Json)
        .context(BackendSnafu { stage: "api-create" })
}

pub async fn conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> AppResult<Json<ConversationPayload>> {
    state
        .backend
        .conversation(ConversationId::new(id))
        .map(Json)
        .context(BackendSnafu {
            stage: "api-conversation",
        })
}

pub async fn message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendMessageRequest>,
) -> AppResult<Json<SendReply>> {
    state
        .backend
        .send(ConversationId::new(request.chat_id), &request.text)
        .map(Json)
        .context(BackendSnafu { stage: "api-message" })
}
