use std::fmt;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::auth::read_cookie;

pub const THEME_COOKIE: &str = "theme";
/// Client hint sent by browsers that honour `Accept-CH: Sec-CH-Prefers-Color-Scheme`.
pub const COLOR_SCHEME_HINT: &str = "sec-ch-prefers-color-scheme";

const THEME_COOKIE_MAX_AGE_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().trim_matches('"').to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    /// Saved choice first, then the browser's color-scheme hint, then light.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        read_cookie(headers, THEME_COOKIE)
            .and_then(|value| Theme::parse(&value))
            .or_else(|| {
                headers
                    .get(COLOR_SCHEME_HINT)
                    .and_then(|value| value.to_str().ok())
                    .and_then(Theme::parse)
            })
            .unwrap_or_default()
    }

    pub fn cookie(self) -> Cookie<'static> {
        Cookie::build((THEME_COOKIE, self.as_str()))
            .path("/")
            .max_age(time::Duration::days(THEME_COOKIE_MAX_AGE_DAYS))
            .same_site(SameSite::Lax)
            .build()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
