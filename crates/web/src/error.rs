use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use murmur_chat::ChatError;
use murmur_storage::StorageError;
use murmur_transport::TransportError;
use serde_json::json;
use snafu::Snafu;

use crate::config::ConfigError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AppError {
    #[snafu(display("{message}"))]
    BadRequest {
        stage: &'static str,
        message: String,
    },
    #[snafu(display("invalid username or password"))]
    InvalidCredentials { stage: &'static str },
    #[snafu(display("not authenticated"))]
    Unauthenticated { stage: &'static str },
    #[snafu(display("failed to issue session token on `{stage}`: {source}"))]
    IssueToken {
        stage: &'static str,
        source: jsonwebtoken::errors::Error,
    },
    #[snafu(display("{source}"))]
    Chat {
        stage: &'static str,
        source: ChatError,
    },
    #[snafu(display("{source}"))]
    Backend {
        stage: &'static str,
        source: TransportError,
    },
    #[snafu(display("failed to render page on `{stage}`: {source}"))]
    Render {
        stage: &'static str,
        source: askama::Error,
    },
    #[snafu(display("configuration error: {source}"))]
    Config { source: ConfigError },
    #[snafu(display("failed to bind {address} on `{stage}`: {source}"))]
    Bind {
        stage: &'static str,
        address: String,
        source: std::io::Error,
    },
    #[snafu(display("server stopped with an error on `{stage}`: {source}"))]
    Serve {
        stage: &'static str,
        source: std::io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials { .. } | AppError::Unauthenticated { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Chat { source, .. } => match source {
                ChatError::Busy { .. } | ChatError::Reveal { .. } => StatusCode::CONFLICT,
                ChatError::Transport { source, .. } => transport_status(source),
            },
            AppError::Backend { source, .. } => transport_status(source),
            AppError::IssueToken { .. }
            | AppError::Render { .. }
            | AppError::Config { .. }
            | AppError::Bind { .. }
            | AppError::Serve { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn transport_status(error: &TransportError) -> StatusCode {
    match error {
        TransportError::Backend { source, .. } => match source {
            StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::EmptyMessage { .. } => StatusCode::BAD_REQUEST,
            StorageError::LockPoisoned { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        },
        TransportError::Status { status: 404, .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use murmur_storage::ConversationId;

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let missing = AppError::Backend {
            stage: "test",
            source: TransportError::Backend {
                stage: "test",
                source: StorageError::NotFound {
                    stage: "test",
                    id: ConversationId::new(7),
                },
            },
        };
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let busy = AppError::Chat {
            stage: "test",
            source: ChatError::Busy { stage: "test" },
        };
        assert_eq!(busy.status(), StatusCode::CONFLICT);

        let upstream = AppError::Backend {
            stage: "test",
            source: TransportError::Status {
                stage: "test",
                url: "http://upstream/history".to_string(),
                status: 500,
                body: String::new(),
            },
        };
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::InvalidCredentials { stage: "test" }.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
