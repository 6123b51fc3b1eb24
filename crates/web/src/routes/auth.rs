use std::sync::Arc;

use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::auth::{TOKEN_COOKIE, UserInfo, authenticate, clear_session_cookie, session_cookie};
use crate::error::{AppResult, BadRequestSnafu, InvalidCredentialsSnafu, UnauthenticatedSnafu};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    ensure!(
        !request.username.is_empty() && !request.password.is_empty(),
        BadRequestSnafu {
            stage: "login",
            message: "username and password are required",
        }
    );

    let Some(user) = authenticate(&request.username, &request.password) else {
        tracing::info!(username = %request.username, "login rejected");
        return InvalidCredentialsSnafu { stage: "login" }.fail();
    };

    let token = state.tokens.issue(&user)?;
    let cookie = session_cookie(&token, state.tokens.ttl(), state.config.secure_cookies);
    tracing::info!(user_id = %user.id, username = %user.username, "user signed in");

    let body = AuthResponse {
        success: true,
        message: Some("login successful"),
        user: Some(user),
    };
    Ok((jar.add(cookie), Json(body)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<AuthResponse>) {
    let body = AuthResponse {
        success: true,
        message: Some("logout successful"),
        user: None,
    };
    (jar.add(clear_session_cookie()), Json(body))
}

pub async fn verify(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> AppResult<Json<AuthResponse>> {
    let user = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|token| !token.is_empty())
        .and_then(|token| state.tokens.verify(token))
        .ok_or_else(|| UnauthenticatedSnafu { stage: "verify" }.build())?;

    Ok(Json(AuthResponse {
        success: true,
        message: None,
        user: Some(user),
    }))
}
