use nats_provider_jetstream::{BrokerError, BrokerErrorKind};
use thiserror::Error;

/// Errors that can occur in this crate.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A stream with the same name but another configuration exists.
    #[error("stream {0} already exists with a different configuration")]
    StreamExists(String),

    /// No such stream.
    #[error("stream {0} not found")]
    StreamNotFound(String),

    /// A consumer with the same name but another configuration exists.
    #[error("consumer {stream}/{name} already exists with a different configuration")]
    ConsumerExists {
        /// Stream name.
        stream: String,
        /// Consumer name.
        name: String,
    },

    /// No such consumer.
    #[error("consumer {stream}/{name} not found")]
    ConsumerNotFound {
        /// Stream name.
        stream: String,
        /// Consumer name.
        name: String,
    },

    /// Names must be non-empty and free of wildcards, spaces and dots.
    #[error("invalid name {0:?}")]
    InvalidName(String),

    /// The broker was switched off with `set_unavailable`.
    #[error("broker unavailable")]
    Unavailable,
}

impl BrokerError for Error {
    fn kind(&self) -> BrokerErrorKind {
        match self {
            Self::StreamExists(_) | Self::ConsumerExists { .. } => BrokerErrorKind::AlreadyExists,
            Self::StreamNotFound(_) | Self::ConsumerNotFound { .. } => BrokerErrorKind::NotFound,
            Self::InvalidName(_) => BrokerErrorKind::Other,
            Self::Unavailable => BrokerErrorKind::Unavailable,
        }
    }
}
