use std::fmt;

use nats_provider_jetstream::{BrokerErrorKind, ConsumerConfig};
use serde::{Deserialize, Serialize};

/// `err_code` of a missing stream.
pub const STREAM_NOT_FOUND: u64 = 10059;

/// `err_code` of a missing consumer.
pub const CONSUMER_NOT_FOUND: u64 = 10014;

const STREAM_NAME_IN_USE: u64 = 10058;
const CONSUMER_NAME_EXISTS: u64 = 10013;
const CONSUMER_ALREADY_EXISTS: u64 = 10148;

/// Error body of a JetStream API response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ApiError {
    /// HTTP like status code.
    pub code: u16,

    /// JetStream specific error code.
    #[serde(default)]
    pub err_code: u64,

    /// Human readable description.
    #[serde(default)]
    pub description: String,
}

impl ApiError {
    pub(crate) const fn kind(&self) -> BrokerErrorKind {
        match self.err_code {
            STREAM_NOT_FOUND | CONSUMER_NOT_FOUND => BrokerErrorKind::NotFound,
            STREAM_NAME_IN_USE | CONSUMER_NAME_EXISTS | CONSUMER_ALREADY_EXISTS => {
                BrokerErrorKind::AlreadyExists
            }
            _ if self.code == 503 => BrokerErrorKind::Unavailable,
            _ => BrokerErrorKind::Other,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (code {}, err_code {})",
            self.description, self.code, self.err_code
        )
    }
}

/// A JetStream API response: either the payload or an error object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Err { error: ApiError },
    Ok(T),
}

/// Body of a successful delete.
#[derive(Debug, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Body of requests without parameters.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// Body of `CONSUMER.CREATE`.
#[derive(Debug, Serialize)]
pub struct CreateConsumerRequest<'a> {
    pub stream_name: &'a str,
    pub config: &'a ConsumerConfig,
    pub action: ConsumerAction,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerAction {
    Create,
    Update,
}
