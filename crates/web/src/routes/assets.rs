use std::sync::LazyLock;

use axum::{http::header::CONTENT_TYPE, response::IntoResponse};

use crate::palette;

const APP_JS: &str = include_str!("../../static/app.js");
const STYLE_CSS: &str = include_str!("../../static/style.css");

static PALETTE_CSS: LazyLock<String> = LazyLock::new(palette::stylesheet);

pub async fn script() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

pub async fn style() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

pub async fn palette_css() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], PALETTE_CSS.as_str())
}
