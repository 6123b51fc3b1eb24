pub mod api;
pub mod assets;
pub mod auth;
pub mod chat;
pub mod pages;
pub mod theme;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::guard::route_guard;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::root))
        .route("/login", get(pages::login))
        .route("/home", get(pages::home))
        .route("/color", get(pages::color))
        .route("/start", get(pages::start))
        .route("/start/state", get(chat::snapshot))
        .route("/start/events", get(chat::events))
        .route("/start/send", post(chat::send))
        .route("/start/stop", post(chat::stop))
        .route("/start/new", post(chat::new_chat))
        .route("/start/select/{id}", post(chat::select))
        .route("/start/input", post(chat::input))
        .route("/theme/toggle", post(theme::toggle))
        .route("/static/app.js", get(assets::script))
        .route("/static/style.css", get(assets::style))
        .route("/static/palette.css", get(assets::palette_css))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/verify", get(auth::verify))
        .route("/api/history", get(api::history).post(api::create))
        .route("/api/history/{id}", get(api::conversation))
        .route("/api/message", post(api::message))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), route_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
