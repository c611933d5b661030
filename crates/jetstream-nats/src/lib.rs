//! JetStream broker backed by a NATS connection.
//!
//! Each broker call is a single JetStream API request. Connection retries and
//! reconnects are left to `async-nats`.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod credentials;
mod error;

pub use api::ApiError;
pub use credentials::Credentials;
pub use error::Error;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_nats::jetstream::{self, Context as JetStreamContext};
use async_nats::{Client, ConnectOptions, Event};
use async_trait::async_trait;
use nats_provider_jetstream::{Broker, ConsumerConfig, ConsumerInfo, StreamConfig, StreamInfo};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::api::{
    ApiResponse, CONSUMER_NOT_FOUND, ConsumerAction, CreateConsumerRequest, DeleteResponse, Empty,
    STREAM_NOT_FOUND,
};

/// Options for configuring a `NatsBroker`.
#[derive(Clone, Debug)]
pub struct NatsBrokerOptions {
    /// Client name reported to the server.
    pub name: String,

    /// Delay between reconnect attempts.
    pub reconnect_delay: Duration,

    /// Reconnect attempts before giving up, `None` for unlimited.
    pub max_reconnects: Option<usize>,

    /// Timeout of a single JetStream API request.
    pub request_timeout: Duration,
}

impl Default for NatsBrokerOptions {
    /// One reconnect per second for up to ten minutes.
    fn default() -> Self {
        Self {
            name: "nats-provider".to_string(),
            reconnect_delay: Duration::from_secs(1),
            max_reconnects: Some(600),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Broker talking to a NATS server.
#[derive(Clone)]
pub struct NatsBroker {
    client: Client,
    request_timeout: Duration,
}

impl Debug for NatsBroker {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NatsBroker")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl NatsBroker {
    /// Creates a broker on an existing client.
    #[must_use]
    pub const fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    /// Connects to the server named in `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the connection
    /// cannot be established.
    pub async fn connect(
        credentials: &Credentials,
        options: NatsBrokerOptions,
    ) -> Result<Self, Error> {
        let NatsBrokerOptions {
            name,
            reconnect_delay,
            max_reconnects,
            request_timeout,
        } = options;

        let connect_options = ConnectOptions::with_credentials(&credentials.to_creds())?
            .name(name)
            .reconnect_delay_callback(move |_attempts| reconnect_delay)
            .max_reconnects(max_reconnects)
            .request_timeout(Some(request_timeout))
            .event_callback(|event| async move {
                match event {
                    Event::Connected => info!("connected to NATS"),
                    Event::Disconnected => warn!("disconnected from NATS"),
                    other => debug!(event = %other, "NATS connection event"),
                }
            });

        info!(address = %credentials.address, "connecting to NATS");

        let client = connect_options.connect(credentials.address.as_str()).await?;

        Ok(Self::new(client, request_timeout))
    }

    fn context(&self, domain: &str) -> JetStreamContext {
        let mut context = if domain.is_empty() {
            jetstream::new(self.client.clone())
        } else {
            jetstream::with_domain(self.client.clone(), domain)
        };
        context.set_timeout(self.request_timeout);
        context
    }

    async fn request<T, V>(&self, domain: &str, subject: String, payload: &T) -> Result<V, Error>
    where
        T: Serialize + Sync + ?Sized,
        V: DeserializeOwned,
    {
        let response = self
            .context(domain)
            .request::<_, T, ApiResponse<V>>(subject.clone(), payload)
            .await;

        match response {
            Ok(ApiResponse::Ok(value)) => Ok(value),
            Ok(ApiResponse::Err { error }) => Err(Error::Api { subject, error }),
            Err(source) => {
                warn!(subject = %subject, domain = %domain, error = %source, "JetStream request failed");
                Err(Error::Request { subject, source })
            }
        }
    }

    async fn delete(&self, domain: &str, subject: String) -> Result<(), Error> {
        let response: DeleteResponse = self.request(domain, subject.clone(), &Empty {}).await?;

        if !response.success {
            warn!(subject = %subject, domain = %domain, "JetStream delete reported no success");
        }

        Ok(())
    }
}

/// Turns a "not found" API error with the given code into `Ok(None)`.
fn not_found_as_none<T>(result: Result<T, Error>, err_code: u64) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::Api { error, .. }) if error.err_code == err_code => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl Broker for NatsBroker {
    type Error = Error;

    async fn stream_info(&self, domain: &str, name: &str) -> Result<Option<StreamInfo>, Error> {
        let result = self
            .request(domain, format!("STREAM.INFO.{name}"), &Empty {})
            .await;

        not_found_as_none(result, STREAM_NOT_FOUND)
    }

    async fn create_stream(&self, domain: &str, config: &StreamConfig) -> Result<(), Error> {
        let _: StreamInfo = self
            .request(domain, format!("STREAM.CREATE.{}", config.name), config)
            .await?;

        Ok(())
    }

    async fn update_stream(&self, domain: &str, config: &StreamConfig) -> Result<(), Error> {
        let _: StreamInfo = self
            .request(domain, format!("STREAM.UPDATE.{}", config.name), config)
            .await?;

        Ok(())
    }

    async fn delete_stream(&self, domain: &str, name: &str) -> Result<(), Error> {
        self.delete(domain, format!("STREAM.DELETE.{name}")).await
    }

    async fn consumer_info(
        &self,
        domain: &str,
        stream: &str,
        name: &str,
    ) -> Result<Option<ConsumerInfo>, Error> {
        let result = self
            .request(domain, format!("CONSUMER.INFO.{stream}.{name}"), &Empty {})
            .await;

        not_found_as_none(result, CONSUMER_NOT_FOUND)
    }

    async fn create_consumer(
        &self,
        domain: &str,
        stream: &str,
        config: &ConsumerConfig,
    ) -> Result<(), Error> {
        let request = CreateConsumerRequest {
            stream_name: stream,
            config,
            action: ConsumerAction::Create,
        };

        let _: ConsumerInfo = self
            .request(
                domain,
                format!("CONSUMER.CREATE.{stream}.{}", config.name),
                &request,
            )
            .await?;

        Ok(())
    }

    async fn update_consumer(
        &self,
        domain: &str,
        stream: &str,
        config: &ConsumerConfig,
    ) -> Result<(), Error> {
        let request = CreateConsumerRequest {
            stream_name: stream,
            config,
            action: ConsumerAction::Update,
        };

        let _: ConsumerInfo = self
            .request(
                domain,
                format!("CONSUMER.CREATE.{stream}.{}", config.name),
                &request,
            )
            .await?;

        Ok(())
    }

    async fn delete_consumer(&self, domain: &str, stream: &str, name: &str) -> Result<(), Error> {
        self.delete(domain, format!("CONSUMER.DELETE.{stream}.{name}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    fn api_error(err_code: u64) -> Error {
        Error::Api {
            subject: "STREAM.INFO.orders".to_string(),
            error: ApiError {
                code: 404,
                err_code,
                description: "not found".to_string(),
            },
        }
    }

    #[test]
    fn test_default_options() {
        let options = NatsBrokerOptions::default();

        assert_eq!(options.reconnect_delay, Duration::from_secs(1));
        assert_eq!(
            options.reconnect_delay * u32::try_from(options.max_reconnects.unwrap()).unwrap(),
            Duration::from_secs(600)
        );
    }

    #[test]
    fn test_not_found_as_none() {
        assert_matches!(not_found_as_none(Ok(1), STREAM_NOT_FOUND), Ok(Some(1)));
        assert_matches!(
            not_found_as_none::<()>(Err(api_error(STREAM_NOT_FOUND)), STREAM_NOT_FOUND),
            Ok(None)
        );
    }

    #[test]
    fn test_missing_stream_is_an_error_for_consumers() {
        assert_matches!(
            not_found_as_none::<()>(Err(api_error(STREAM_NOT_FOUND)), CONSUMER_NOT_FOUND),
            Err(Error::Api { .. })
        );
    }
}
