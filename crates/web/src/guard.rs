use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{TOKEN_COOKIE, read_cookie};
use crate::state::AppState;

const AUTH_API_PREFIX: &str = "/api/auth";
const PROTECTED_PREFIXES: [&str; 1] = ["/start"];
const PUBLIC_PATHS: [&str; 2] = ["/login", "/home"];

pub const LOGIN_PATH: &str = "/login";
pub const CHAT_PATH: &str = "/start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(&'static str),
}

/// Access rules for every path, given whether the request carries a valid session.
pub fn decide(path: &str, authenticated: bool) -> GuardDecision {
    if path == "/" {
        return GuardDecision::Redirect(if authenticated { CHAT_PATH } else { LOGIN_PATH });
    }
    if authenticated && path == LOGIN_PATH {
        return GuardDecision::Redirect(CHAT_PATH);
    }
    if PUBLIC_PATHS.contains(&path) {
        return GuardDecision::Pass;
    }
    if !authenticated && PROTECTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return GuardDecision::Redirect(LOGIN_PATH);
    }
    GuardDecision::Pass
}

/// Verifies the session cookie, applies [`decide`], and exposes the user to handlers.
pub async fn route_guard(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    // Auth endpoints check the cookie themselves.
    if request.uri().path().starts_with(AUTH_API_PREFIX) {
        return next.run(request).await;
    }

    let user = read_cookie(request.headers(), TOKEN_COOKIE).and_then(|token| state.tokens.verify(&token));

    match decide(request.uri().path(), user.is_some()) {
        GuardDecision::Redirect(location) => {
            tracing::debug!(path = request.uri().path(), location, "route guard redirect");
            Redirect::temporary(location).into_response()
        }
        GuardDecision::Pass => {
            if let Some(user) = user {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
    }
}
