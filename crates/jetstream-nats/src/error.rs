use async_nats::jetstream::context::{RequestError, RequestErrorKind};
use nats_provider_jetstream::{BrokerError, BrokerErrorKind};
use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials could not be decoded or are incomplete.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Credentials were rejected by the client.
    #[error("failed to load credentials: {0}")]
    Credentials(#[from] std::io::Error),

    /// Could not connect to the server.
    #[error("failed to connect to NATS: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// The request did not get an answer.
    #[error("JetStream request {subject} failed: {source}")]
    Request {
        /// API subject, without prefix.
        subject: String,
        /// Underlying error.
        #[source]
        source: RequestError,
    },

    /// The server answered with an API error.
    #[error("JetStream request {subject} failed: {error}")]
    Api {
        /// API subject, without prefix.
        subject: String,
        /// The error returned by the server.
        error: ApiError,
    },
}

impl BrokerError for Error {
    fn kind(&self) -> BrokerErrorKind {
        match self {
            Self::InvalidCredentials(_) | Self::Credentials(_) => BrokerErrorKind::Other,
            Self::Connect(_) => BrokerErrorKind::Unavailable,
            Self::Request { source, .. } => match source.kind() {
                RequestErrorKind::TimedOut | RequestErrorKind::NoResponders => {
                    BrokerErrorKind::Unavailable
                }
                _ => BrokerErrorKind::Other,
            },
            Self::Api { error, .. } => error.kind(),
        }
    }
}
