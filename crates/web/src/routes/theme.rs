use axum::{Form, http::HeaderMap, response::Redirect};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::theme::Theme;

#[derive(Debug, Default, Deserialize)]
pub struct ToggleForm {
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Only same-site absolute paths are followed back.
fn return_path(candidate: Option<&str>) -> &str {
    match candidate {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/home",
    }
}

pub async fn toggle(
    jar: CookieJar,
    headers: HeaderMap,
    Form(form): Form<ToggleForm>,
) -> (CookieJar, Redirect) {
    let theme = Theme::from_headers(&headers).toggled();
    tracing::debug!(theme = %theme, "theme toggled");

    (
        jar.add(theme.cookie()),
        Redirect::to(return_path(form.return_to.as_deref())),
    )
}
