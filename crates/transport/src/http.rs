use std::time::Duration;

use murmur_storage::ConversationId;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use snafu::{ResultExt, ensure};

use super::client::{BoxFuture, ChatTransport};
use super::error::{
    BuildClientSnafu, DecodeSnafu, InvalidBaseUrlSnafu, RequestSnafu, StatusSnafu,
    TransportResult,
};
use super::wire::{ConversationPayload, SendMessageRequest, SendReply};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// History API client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> TransportResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        ensure!(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            InvalidBaseUrlSnafu {
                stage: "http-transport-new",
                base_url,
            }
        );

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context(BuildClientSnafu {
                stage: "http-transport-build-client",
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        stage: &'static str,
        url: String,
        request: RequestBuilder,
    ) -> TransportResult<T> {
        let response = request.send().await.context(RequestSnafu {
            stage,
            url: url.clone(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return StatusSnafu {
                stage,
                url,
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        response.json::<T>().await.context(DecodeSnafu { stage, url })
    }
}

impl ChatTransport for HttpTransport {
    fn fetch_history<'a>(&'a self) -> BoxFuture<'a, TransportResult<Vec<ConversationPayload>>> {
        Box::pin(async move {
            let url = self.endpoint("history");
            let request = self.client.get(&url);
            self.execute("fetch-history", url, request).await
        })
    }

    fn fetch_conversation<'a>(
        &'a self,
        id: ConversationId,
    ) -> BoxFuture<'a, TransportResult<ConversationPayload>> {
        Box::pin(async move {
            let url = self.endpoint(&format!("history/{id}"));
            let request = self.client.get(&url);
            self.execute("fetch-conversation", url, request).await
        })
    }

    fn create_conversation<'a>(&'a self) -> BoxFuture<'a, TransportResult<ConversationPayload>> {
        Box::pin(async move {
            let url = self.endpoint("history");
            let request = self.client.post(&url);
            self.execute("create-conversation", url, request).await
        })
    }

    fn send_message<'a>(
        &'a self,
        id: ConversationId,
        text: &'a str,
    ) -> BoxFuture<'a, TransportResult<SendReply>> {
        Box::pin(async move {
            let url = self.endpoint("message");
            let request = self.client.post(&url).json(&SendMessageRequest {
                chat_id: id.get(),
                text: text.to_string(),
            });
            self.execute("send-message", url, request).await
        })
    }
}
