use std::fmt::Debug;

use async_trait::async_trait;

use crate::consumer::{ConsumerConfig, ConsumerInfo};
use crate::error::BrokerError;
use crate::stream::{StreamConfig, StreamInfo};

/// A JetStream API endpoint that streams and consumers are reconciled against.
///
/// Every method maps to exactly one JetStream API request. Implementations
/// must be safe to share between concurrent reconciliations; they must not
/// retry on their own.
///
/// # Associated Types
/// - `Error`: The error type, classified through [`BrokerError::kind`].
///
/// # Required Methods
/// - `stream_info`: `Ok(None)` when the stream does not exist.
/// - `create_stream` / `update_stream` / `delete_stream`
/// - `consumer_info`: `Ok(None)` when the consumer does not exist.
/// - `create_consumer` / `update_consumer` / `delete_consumer`
#[async_trait]
pub trait Broker: Clone + Debug + Send + Sync + 'static {
    /// The error type for broker calls.
    type Error: BrokerError;

    /// Looks up a stream in the given domain.
    async fn stream_info(&self, domain: &str, name: &str)
    -> Result<Option<StreamInfo>, Self::Error>;

    /// Creates a stream. Creating an identical stream twice is not an error.
    async fn create_stream(&self, domain: &str, config: &StreamConfig) -> Result<(), Self::Error>;

    /// Replaces the configuration of an existing stream.
    async fn update_stream(&self, domain: &str, config: &StreamConfig) -> Result<(), Self::Error>;

    /// Deletes a stream and all its consumers.
    async fn delete_stream(&self, domain: &str, name: &str) -> Result<(), Self::Error>;

    /// Looks up a consumer of a stream.
    async fn consumer_info(
        &self,
        domain: &str,
        stream: &str,
        name: &str,
    ) -> Result<Option<ConsumerInfo>, Self::Error>;

    /// Creates a consumer on a stream.
    async fn create_consumer(
        &self,
        domain: &str,
        stream: &str,
        config: &ConsumerConfig,
    ) -> Result<(), Self::Error>;

    /// Replaces the configuration of an existing consumer.
    async fn update_consumer(
        &self,
        domain: &str,
        stream: &str,
        config: &ConsumerConfig,
    ) -> Result<(), Self::Error>;

    /// Deletes a consumer.
    async fn delete_consumer(&self, domain: &str, stream: &str, name: &str)
    -> Result<(), Self::Error>;
}
