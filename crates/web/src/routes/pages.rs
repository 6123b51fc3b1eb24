use std::sync::Arc;

use askama::Template;
use axum::{
    Extension,
    extract::State,
    http::HeaderMap,
    response::{Html, Redirect},
};
use murmur_chat::{ChatSnapshot, HistoryEntry, Role};
use snafu::ResultExt;

use crate::auth::UserInfo;
use crate::error::{AppResult, ChatSnafu, RenderSnafu};
use crate::guard::LOGIN_PATH;
use crate::palette::{self, PALETTE, ShadowSpec};
use crate::state::AppState;
use crate::theme::Theme;

pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

const FEATURES: [&str; 6] = [
    "Natural language conversations",
    "Character-by-character replies",
    "Stop a reply at any point",
    "Conversation history",
    "Light and dark themes",
    "Session sign-in",
];

const STATS: [Stat; 4] = [
    Stat {
        value: "10K+",
        label: "Active Users",
    },
    Stat {
        value: "99.8%",
        label: "Accuracy Rate",
    },
    Stat {
        value: "50+",
        label: "Languages",
    },
    Stat {
        value: "<100ms",
        label: "Response Time",
    },
];

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub theme: Theme,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub theme: Theme,
    pub username: Option<String>,
    pub active: &'static str,
    pub features: &'static [&'static str],
    pub stats: &'static [Stat],
    pub rendered_at: String,
}

pub struct Swatch {
    pub name: &'static str,
    pub css_name: String,
    pub light: &'static str,
    pub dark: &'static str,
}

pub struct SwatchGroup {
    pub label: &'static str,
    pub swatches: Vec<Swatch>,
}

pub struct ContrastRow {
    pub foreground: &'static str,
    pub background: &'static str,
    pub ratio: String,
    pub passes_aa: bool,
}

#[derive(Template)]
#[template(path = "color.html")]
pub struct ColorPage {
    pub theme: Theme,
    pub username: Option<String>,
    pub active: &'static str,
    pub groups: Vec<SwatchGroup>,
    pub gradient: String,
    pub shadow: String,
    pub contrast: Vec<ContrastRow>,
}

pub struct MessageView {
    pub class: &'static str,
    pub author: &'static str,
    pub text: String,
    pub time: String,
}

#[derive(Template)]
#[template(path = "start.html")]
pub struct StartPage {
    pub theme: Theme,
    pub username: Option<String>,
    pub active: &'static str,
    pub history: Vec<HistoryEntry>,
    pub messages: Vec<MessageView>,
    pub streaming_text: Option<String>,
    pub streaming_started_at: String,
    pub waiting: bool,
    pub loading: bool,
    pub has_messages: bool,
    pub input: String,
}

impl StartPage {
    fn new(theme: Theme, user: &UserInfo, snapshot: ChatSnapshot) -> Self {
        let has_messages = snapshot.has_messages();
        let waiting = snapshot.is_waiting_for_reply();
        let messages = snapshot
            .messages
            .into_iter()
            .map(|message| {
                let (class, author) = match message.role {
                    Role::User => ("user", "You"),
                    Role::Assistant => ("assistant", "AI"),
                };
                MessageView {
                    class,
                    author,
                    text: message.text,
                    time: message.time,
                }
            })
            .collect();

        Self {
            theme,
            username: Some(user.username.clone()),
            active: "/start",
            history: snapshot.history,
            messages,
            streaming_text: snapshot.streaming_text,
            streaming_started_at: snapshot.streaming_started_at.unwrap_or_default(),
            waiting,
            loading: snapshot.loading,
            has_messages,
            input: snapshot.input,
        }
    }
}

fn render(template: impl Template, stage: &'static str) -> AppResult<Html<String>> {
    template.render().map(Html).context(RenderSnafu { stage })
}

fn username(user: Option<Extension<UserInfo>>) -> Option<String> {
    user.map(|Extension(user)| user.username)
}

pub async fn root() -> Redirect {
    Redirect::temporary(LOGIN_PATH)
}

pub async fn login(headers: HeaderMap) -> AppResult<Html<String>> {
    render(
        LoginPage {
            theme: Theme::from_headers(&headers),
        },
        "render-login",
    )
}

pub async fn home(headers: HeaderMap, user: Option<Extension<UserInfo>>) -> AppResult<Html<String>> {
    render(
        HomePage {
            theme: Theme::from_headers(&headers),
            username: username(user),
            active: "/home",
            features: &FEATURES,
            stats: &STATS,
            rendered_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        },
        "render-home",
    )
}

pub async fn color(headers: HeaderMap, user: Option<Extension<UserInfo>>) -> AppResult<Html<String>> {
    let groups = PALETTE
        .iter()
        .map(|group| SwatchGroup {
            label: group.label,
            swatches: group
                .colors
                .iter()
                .map(|color| Swatch {
                    name: color.name,
                    css_name: color.css_name(),
                    light: color.light,
                    dark: color.dark,
                })
                .collect(),
        })
        .collect();

    let contrast = [
        ("textPrimary", "background"),
        ("textSecondary", "btnPrimary"),
        ("textMuted", "bgWhite"),
        ("textAccent", "chatBgPrimary"),
    ]
    .into_iter()
    .filter_map(|(foreground, background)| {
        let ratio = palette::contrast_ratio(
            palette::find(foreground)?.light,
            palette::find(background)?.light,
        )?;
        Some(ContrastRow {
            foreground,
            background,
            ratio: format!("{ratio:.2}:1"),
            passes_aa: ratio >= 4.5,
        })
    })
    .collect();

    render(
        ColorPage {
            theme: Theme::from_headers(&headers),
            username: username(user),
            active: "/color",
            groups,
            gradient: palette::create_gradient(
                &["var(--purple-gradient-1)", "var(--purple-gradient-2)", "var(--purple-gradient-3)"],
                "135deg",
            ),
            shadow: palette::create_shadow(
                "#8b5cf6",
                ShadowSpec {
                    opacity: 0.25,
                    blur: 24.0,
                    offset_y: 4.0,
                    ..ShadowSpec::default()
                },
            )
            .unwrap_or_default(),
            contrast,
        },
        "render-color",
    )
}

pub async fn start(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserInfo>,
    headers: HeaderMap,
) -> AppResult<Html<String>> {
    let controller = state.sessions.controller(&user.id).await?;
    controller
        .load_history()
        .await
        .context(ChatSnafu { stage: "render-start" })?;

    let page = StartPage::new(Theme::from_headers(&headers), &user, controller.snapshot().await);
    render(page, "render-start")
}
