use murmur_transport::TransportError;
use snafu::Snafu;

use crate::reveal::RevealError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ChatError {
    #[snafu(display("chat transport failed on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        source: TransportError,
    },
    #[snafu(display("a reply is still in progress; wait for it or stop it first"))]
    Busy { stage: &'static str },
    #[snafu(display("reveal rejected on `{stage}`: {source}"))]
    Reveal {
        stage: &'static str,
        source: RevealError,
    },
}

pub type ChatResult<T> = Result<T, ChatError>;
