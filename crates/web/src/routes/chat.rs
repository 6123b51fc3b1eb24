use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use murmur_chat::{ChatCommand, ChatController, ChatSnapshot, ConversationId, SendOutcome};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tokio_stream::{StreamExt, wrappers::WatchStream};

use crate::auth::UserInfo;
use crate::error::{AppResult, ChatSnafu};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub outcome: &'static str,
    pub state: ChatSnapshot,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub stopped: bool,
    pub state: ChatSnapshot,
}

async fn controller(state: &AppState, user: &UserInfo) -> AppResult<Arc<ChatController>> {
    state.sessions.controller(&user.id).await
}

fn outcome_name(outcome: SendOutcome) -> &'static str {
    match outcome {
        SendOutcome::Ignored => "ignored",
        SendOutcome::Revealing(_) => "revealing",
        SendOutcome::NoReply => "no-reply",
        SendOutcome::Dropped => "dropped",
    }
}

pub async fn snapshot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserInfo>,
) -> AppResult<Json<ChatSnapshot>> {
    let controller = controller(&state, &user).await?;
    Ok(Json(controller.snapshot().await))
}

/// Pushes the current snapshot, then one per state change, including every revealed character.
pub async fn events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserInfo>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let controller = controller(&state, &user).await?;
    let stream = WatchStream::new(controller.subscribe())
        .map(|snapshot| Event::default().event("snapshot").json_data(snapshot));

    tracing::debug!(user_id = %user.id, "chat event stream opened");
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

pub async fn send(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<TextRequest>,
) -> AppResult<Json<SendResponse>> {
    let controller = controller(&state, &user).await?;
    let outcome = controller
        .send(request.text)
        .await
        .context(ChatSnafu { stage: "chat-send" })?;

    Ok(Json(SendResponse {
        outcome: outcome_name(outcome),
        state: controller.snapshot().await,
    }))
}

pub async fn stop(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserInfo>,
) -> AppResult<Json<StopResponse>> {
    let controller = controller(&state, &user).await?;
    let stopped = controller.stop().await.is_some();

    Ok(Json(StopResponse {
        stopped,
        state: controller.snapshot().await,
    }))
}

pub async fn new_chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserInfo>,
) -> AppResult<Json<ChatSnapshot>> {
    run(&state, &user, ChatCommand::NewChat, "chat-new").await
}

pub async fn select(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<u64>,
) -> AppResult<Json<ChatSnapshot>> {
    let command = ChatCommand::SelectConversation(ConversationId::new(id));
    run(&state, &user, command, "chat-select").await
}

pub async fn input(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<TextRequest>,
) -> AppResult<StatusCode> {
    let command = ChatCommand::UpdateInput(request.text.unwrap_or_default());
    run(&state, &user, command, "chat-input").await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn run(
    state: &AppState,
    user: &UserInfo,
    command: ChatCommand,
    stage: &'static str,
) -> AppResult<Json<ChatSnapshot>> {
    let controller = controller(state, user).await?;
    controller.dispatch(command).await.context(ChatSnafu { stage })?;
    Ok(Json(controller.snapshot().await))
}
