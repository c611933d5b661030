//! In-memory (single node) JetStream broker for local development and tests.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::Error;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use nats_provider_jetstream::{
    Broker, ConsumerConfig, ConsumerInfo, SequenceInfo, StreamConfig, StreamInfo, StreamState,
};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
struct StreamEntry {
    info: StreamInfo,
    consumers: HashMap<String, ConsumerInfo>,
}

type Domains = HashMap<String, HashMap<String, StreamEntry>>;

/// In-memory broker.
///
/// Streams are kept per domain. Like a real server, creating an object that
/// already exists with an identical configuration succeeds, while a
/// different configuration is rejected.
#[derive(Clone, Debug, Default)]
pub struct MemoryBroker {
    domains: Arc<Mutex<Domains>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryBroker {
    /// Creates a new `MemoryBroker`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with [`Error::Unavailable`] until
    /// switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Stores a message on a stream and advances its state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StreamNotFound`] if the stream does not exist.
    pub async fn publish(
        &self,
        domain: &str,
        stream: &str,
        payload: Bytes,
    ) -> Result<u64, Error> {
        self.check_available()?;

        let mut domains = self.domains.lock().await;
        let entry = find_stream(&mut domains, domain, stream)?;

        let now = Utc::now();
        let state = &mut entry.info.state;
        state.messages += 1;
        state.bytes += payload.len() as u64;
        state.last_sequence += 1;
        state.last_timestamp = Some(now);
        if state.first_sequence == 0 {
            state.first_sequence = state.last_sequence;
            state.first_timestamp = Some(now);
        }

        for consumer in entry.consumers.values_mut() {
            consumer.num_pending += 1;
        }

        debug!(stream = %stream, domain = %domain, sequence = state.last_sequence, "stored message");

        Ok(state.last_sequence)
    }

    fn check_available(&self) -> Result<(), Error> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Unavailable);
        }

        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.contains(['.', '*', '>', ' ']) {
        return Err(Error::InvalidName(name.to_string()));
    }

    Ok(())
}

fn find_stream<'a>(
    domains: &'a mut Domains,
    domain: &str,
    stream: &str,
) -> Result<&'a mut StreamEntry, Error> {
    domains
        .get_mut(domain)
        .and_then(|streams| streams.get_mut(stream))
        .ok_or_else(|| Error::StreamNotFound(stream.to_string()))
}

#[async_trait]
impl Broker for MemoryBroker {
    type Error = Error;

    async fn stream_info(&self, domain: &str, name: &str) -> Result<Option<StreamInfo>, Error> {
        self.check_available()?;

        let mut domains = self.domains.lock().await;
        let Ok(entry) = find_stream(&mut domains, domain, name) else {
            return Ok(None);
        };

        let consumer_count = entry.consumers.len() as u64;

        let mut info = entry.info.clone();
        info.state.consumers = consumer_count;

        Ok(Some(info))
    }

    async fn create_stream(&self, domain: &str, config: &StreamConfig) -> Result<(), Error> {
        self.check_available()?;
        validate_name(&config.name)?;

        let mut domains = self.domains.lock().await;
        let streams = domains.entry(domain.to_string()).or_default();

        if let Some(existing) = streams.get(&config.name) {
            if existing.info.config == *config {
                return Ok(());
            }

            return Err(Error::StreamExists(config.name.clone()));
        }

        streams.insert(
            config.name.clone(),
            StreamEntry {
                info: StreamInfo {
                    config: config.clone(),
                    created: Utc::now(),
                    state: StreamState::default(),
                    cluster: None,
                },
                consumers: HashMap::new(),
            },
        );

        debug!(stream = %config.name, domain = %domain, "created stream");

        Ok(())
    }

    async fn update_stream(&self, domain: &str, config: &StreamConfig) -> Result<(), Error> {
        self.check_available()?;

        let mut domains = self.domains.lock().await;
        let entry = find_stream(&mut domains, domain, &config.name)?;
        entry.info.config = config.clone();

        debug!(stream = %config.name, domain = %domain, "updated stream");

        Ok(())
    }

    async fn delete_stream(&self, domain: &str, name: &str) -> Result<(), Error> {
        self.check_available()?;

        let mut domains = self.domains.lock().await;
        find_stream(&mut domains, domain, name)?;

        if let Some(streams) = domains.get_mut(domain) {
            streams.remove(name);
        }

        debug!(stream = %name, domain = %domain, "deleted stream");

        Ok(())
    }

    async fn consumer_info(
        &self,
        domain: &str,
        stream: &str,
        name: &str,
    ) -> Result<Option<ConsumerInfo>, Error> {
        self.check_available()?;

        let mut domains = self.domains.lock().await;
        let entry = find_stream(&mut domains, domain, stream)?;

        Ok(entry.consumers.get(name).cloned())
    }

    async fn create_consumer(
        &self,
        domain: &str,
        stream: &str,
        config: &ConsumerConfig,
    ) -> Result<(), Error> {
        self.check_available()?;
        validate_name(&config.name)?;

        let mut domains = self.domains.lock().await;
        let entry = find_stream(&mut domains, domain, stream)?;

        if let Some(existing) = entry.consumers.get(&config.name) {
            if existing.config == *config {
                return Ok(());
            }

            return Err(Error::ConsumerExists {
                stream: stream.to_string(),
                name: config.name.clone(),
            });
        }

        let num_pending = entry.info.state.messages;

        entry.consumers.insert(
            config.name.clone(),
            ConsumerInfo {
                stream_name: stream.to_string(),
                name: config.name.clone(),
                created: Utc::now(),
                config: config.clone(),
                delivered: SequenceInfo::default(),
                ack_floor: SequenceInfo::default(),
                num_ack_pending: 0,
                num_redelivered: 0,
                num_waiting: 0,
                num_pending,
                cluster: None,
            },
        );

        debug!(stream = %stream, consumer = %config.name, domain = %domain, "created consumer");

        Ok(())
    }

    async fn update_consumer(
        &self,
        domain: &str,
        stream: &str,
        config: &ConsumerConfig,
    ) -> Result<(), Error> {
        self.check_available()?;

        let mut domains = self.domains.lock().await;
        let entry = find_stream(&mut domains, domain, stream)?;

        let consumer =
            entry
                .consumers
                .get_mut(&config.name)
                .ok_or_else(|| Error::ConsumerNotFound {
                    stream: stream.to_string(),
                    name: config.name.clone(),
                })?;
        consumer.config = config.clone();

        debug!(stream = %stream, consumer = %config.name, domain = %domain, "updated consumer");

        Ok(())
    }

    async fn delete_consumer(&self, domain: &str, stream: &str, name: &str) -> Result<(), Error> {
        self.check_available()?;

        let mut domains = self.domains.lock().await;
        let entry = find_stream(&mut domains, domain, stream)?;

        entry
            .consumers
            .remove(name)
            .ok_or_else(|| Error::ConsumerNotFound {
                stream: stream.to_string(),
                name: name.to_string(),
            })?;

        debug!(stream = %stream, consumer = %name, domain = %domain, "deleted consumer");

        Ok(())
    }
}
