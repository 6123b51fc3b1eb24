use std::time::Duration;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const TOKEN_COOKIE: &str = "token";

/// Returns the non-empty value of cookie `name` from every `Cookie` header of the request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn max_age(ttl: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token.to_string()))
        .http_only(true)
        .path("/")
        .max_age(max_age(ttl))
        .same_site(SameSite::Strict)
        .secure(secure)
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, ""))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::ZERO)
        .same_site(SameSite::Strict)
        .build()
}
