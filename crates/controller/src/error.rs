use nats_provider_jetstream::BrokerError;
use thiserror::Error;

use crate::identity::MissingExternalName;

/// Errors that can occur while reconciling a resource.
#[derive(Debug, Error)]
pub enum Error<BE>
where
    BE: BrokerError,
{
    /// The desired spec could not be converted.
    #[error(transparent)]
    Convert(#[from] nats_provider_apis::Error),

    /// The resource carries no external name.
    #[error(transparent)]
    MissingExternalIdentity(#[from] MissingExternalName),

    /// The broker call failed.
    #[error("broker error: {0}")]
    Broker(BE),

    /// A configuration could not be serialized for comparison.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}
