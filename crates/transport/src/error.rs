use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransportError {
    #[snafu(display("api base url '{base_url}' must start with http:// or https://"))]
    InvalidBaseUrl {
        stage: &'static str,
        base_url: String,
    },
    #[snafu(display("failed to build http client on `{stage}`: {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("request to {url} failed on `{stage}`: {source}"))]
    Request {
        stage: &'static str,
        url: String,
        source: reqwest::Error,
    },
    #[snafu(display("{url} returned status {status}: {body}"))]
    Status {
        stage: &'static str,
        url: String,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode response from {url} on `{stage}`: {source}"))]
    Decode {
        stage: &'static str,
        url: String,
        source: reqwest::Error,
    },
    #[snafu(display("chat backend failed on `{stage}`: {source}"))]
    Backend {
        stage: &'static str,
        source: murmur_storage::StorageError,
    },
}

pub type TransportResult<T> = Result<T, TransportError>;
