use nats_provider_apis::{Condition, Consumer, Stream, consumer, stream};
use nats_provider_jetstream::{Broker, BrokerError};
use tracing::{debug, info, warn};

use crate::drift::is_up_to_date;
use crate::identity::external_name;
use crate::status::{consumer_observation, stream_observation};
use crate::{Error, Resource};

/// Outcome of an observation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Observation {
    /// The broker has an object with the resource's external name.
    pub resource_exists: bool,

    /// The object matches the desired spec.
    pub resource_up_to_date: bool,
}

impl Observation {
    const fn missing() -> Self {
        Self {
            resource_exists: false,
            resource_up_to_date: false,
        }
    }

    const fn drifted() -> Self {
        Self {
            resource_exists: true,
            resource_up_to_date: false,
        }
    }

    const fn up_to_date() -> Self {
        Self {
            resource_exists: true,
            resource_up_to_date: true,
        }
    }
}

/// What a reconcile pass did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// The object was created.
    Create,

    /// The object was updated.
    Update,

    /// The object was deleted.
    Delete,

    /// Nothing to do.
    None,
}

/// Drives broker objects towards the desired state of resources.
///
/// Holds no state besides the broker handle; every call performs at most one
/// broker round trip and never retries.
#[derive(Clone, Debug)]
pub struct External<B>
where
    B: Broker,
{
    broker: B,
}

impl<B> External<B>
where
    B: Broker,
{
    /// Creates a controller using the given broker handle.
    pub const fn new(broker: B) -> Self {
        Self { broker }
    }

    /// Compares the broker object against the desired spec.
    ///
    /// A missing object is not an error. When the object is up to date the
    /// resource status is refreshed from what the broker reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource has no external name, the broker
    /// call fails or the spec cannot be converted.
    pub async fn observe(&self, resource: &mut Resource) -> Result<Observation, Error<B::Error>> {
        let name = external_name(resource.kind(), resource.metadata())?.to_string();

        match resource {
            Resource::Stream(stream) => self.observe_stream(&name, stream).await,
            Resource::Consumer(consumer) => self.observe_consumer(&name, consumer).await,
        }
    }

    /// Creates the broker object.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource has no external name, the spec
    /// cannot be converted or the broker call fails.
    pub async fn create(&self, resource: &mut Resource) -> Result<(), Error<B::Error>> {
        let name = external_name(resource.kind(), resource.metadata())?.to_string();

        let result = match resource {
            Resource::Stream(stream) => self.create_stream(&name, stream).await,
            Resource::Consumer(consumer) => self.create_consumer(&name, consumer).await,
        };

        record_outcome(resource, &name, result)
    }

    /// Replaces the broker object's configuration with the desired one.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource has no external name, the spec
    /// cannot be converted or the broker call fails.
    pub async fn update(&self, resource: &mut Resource) -> Result<(), Error<B::Error>> {
        let name = external_name(resource.kind(), resource.metadata())?.to_string();

        let result = match resource {
            Resource::Stream(stream) => self.update_stream(&name, stream).await,
            Resource::Consumer(consumer) => self.update_consumer(&name, consumer).await,
        };

        record_outcome(resource, &name, result)
    }

    /// Deletes the broker object.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource has no external name or the broker
    /// call fails.
    pub async fn delete(&self, resource: &mut Resource) -> Result<(), Error<B::Error>> {
        let name = external_name(resource.kind(), resource.metadata())?.to_string();
        resource.set_conditions([Condition::deleting()]);

        let domain = resource.domain().to_string();
        info!(kind = resource.kind(), name = %name, domain = %domain, "deleting");

        let result = match &*resource {
            Resource::Stream(_) => self.broker.delete_stream(&domain, &name).await,
            Resource::Consumer(consumer) => {
                self.broker
                    .delete_consumer(&domain, &consumer.spec.for_provider.stream, &name)
                    .await
            }
        };

        record_outcome(resource, &name, result.map_err(Error::Broker))
    }

    /// Runs one observe-then-act pass, as a scheduler would on every poll.
    ///
    /// # Errors
    ///
    /// Returns the first error of the observation or the action.
    pub async fn reconcile(&self, resource: &mut Resource) -> Result<Action, Error<B::Error>> {
        let observation = self.observe(resource).await?;

        if resource.metadata().is_deleting() {
            if !observation.resource_exists {
                return Ok(Action::None);
            }

            self.delete(resource).await?;
            return Ok(Action::Delete);
        }

        if !observation.resource_exists {
            self.create(resource).await?;
            return Ok(Action::Create);
        }

        if !observation.resource_up_to_date {
            self.update(resource).await?;
            return Ok(Action::Update);
        }

        Ok(Action::None)
    }

    async fn observe_stream(
        &self,
        name: &str,
        resource: &mut Stream,
    ) -> Result<Observation, Error<B::Error>> {
        let domain = resource.spec.for_provider.domain.clone();

        let info = match self.broker.stream_info(&domain, name).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                debug!(stream = %name, domain = %domain, "stream not found");
                resource.status.set_conditions([Condition::unavailable()]);
                return Ok(Observation::missing());
            }
            Err(e) => {
                warn!(
                    stream = %name,
                    domain = %domain,
                    broker_error = %e.kind(),
                    error = %e,
                    "failed to observe stream"
                );
                resource
                    .status
                    .set_conditions([Condition::unavailable().with_message(&e)]);
                return Err(Error::Broker(e));
            }
        };

        let desired = match stream::to_native(name, &resource.spec.for_provider.config) {
            Ok(desired) => desired,
            Err(e) => {
                resource.status.set_conditions([Condition::reconcile_error(&e)]);
                return Err(e.into());
            }
        };

        if !is_up_to_date(&info.config, &desired)? {
            debug!(stream = %name, domain = %domain, "stream drifted");
            return Ok(Observation::drifted());
        }

        debug!(stream = %name, domain = %domain, "stream up to date");
        resource.status.at_provider = stream_observation(&domain, &info);
        resource.status.set_conditions([Condition::available()]);

        Ok(Observation::up_to_date())
    }

    async fn observe_consumer(
        &self,
        name: &str,
        resource: &mut Consumer,
    ) -> Result<Observation, Error<B::Error>> {
        let domain = resource.spec.for_provider.domain.clone();
        let stream = resource.spec.for_provider.stream.clone();

        let info = match self.broker.consumer_info(&domain, &stream, name).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                debug!(stream = %stream, consumer = %name, domain = %domain, "consumer not found");
                resource.status.set_conditions([Condition::unavailable()]);
                return Ok(Observation::missing());
            }
            Err(e) => {
                warn!(
                    stream = %stream,
                    consumer = %name,
                    domain = %domain,
                    broker_error = %e.kind(),
                    error = %e,
                    "failed to observe consumer"
                );
                resource
                    .status
                    .set_conditions([Condition::unavailable().with_message(&e)]);
                return Err(Error::Broker(e));
            }
        };

        let desired = match consumer::to_native(name, &resource.spec.for_provider.config) {
            Ok(desired) => desired,
            Err(e) => {
                resource.status.set_conditions([Condition::reconcile_error(&e)]);
                return Err(e.into());
            }
        };

        if !is_up_to_date(&info.config, &desired)? {
            debug!(stream = %stream, consumer = %name, domain = %domain, "consumer drifted");
            return Ok(Observation::drifted());
        }

        debug!(stream = %stream, consumer = %name, domain = %domain, "consumer up to date");
        resource.status.at_provider = consumer_observation(&domain, &info);
        resource.status.set_conditions([Condition::available()]);

        Ok(Observation::up_to_date())
    }

    async fn create_stream(&self, name: &str, resource: &Stream) -> Result<(), Error<B::Error>> {
        let params = &resource.spec.for_provider;
        let config = stream::to_native(name, &params.config)?;

        info!(stream = %name, domain = %params.domain, "creating stream");

        self.broker
            .create_stream(&params.domain, &config)
            .await
            .map_err(Error::Broker)
    }

    async fn update_stream(&self, name: &str, resource: &Stream) -> Result<(), Error<B::Error>> {
        let params = &resource.spec.for_provider;
        let config = stream::to_native(name, &params.config)?;

        info!(stream = %name, domain = %params.domain, "updating stream");

        self.broker
            .update_stream(&params.domain, &config)
            .await
            .map_err(Error::Broker)
    }

    async fn create_consumer(
        &self,
        name: &str,
        resource: &Consumer,
    ) -> Result<(), Error<B::Error>> {
        let params = &resource.spec.for_provider;
        let config = consumer::to_native(name, &params.config)?;

        info!(stream = %params.stream, consumer = %name, domain = %params.domain, "creating consumer");

        self.broker
            .create_consumer(&params.domain, &params.stream, &config)
            .await
            .map_err(Error::Broker)
    }

    async fn update_consumer(
        &self,
        name: &str,
        resource: &Consumer,
    ) -> Result<(), Error<B::Error>> {
        let params = &resource.spec.for_provider;
        let config = consumer::to_native(name, &params.config)?;

        info!(stream = %params.stream, consumer = %name, domain = %params.domain, "updating consumer");

        self.broker
            .update_consumer(&params.domain, &params.stream, &config)
            .await
            .map_err(Error::Broker)
    }
}

/// Records `Synced` for the outcome of a create, update or delete and passes
/// the result through.
fn record_outcome<BE>(
    resource: &mut Resource,
    name: &str,
    result: Result<(), Error<BE>>,
) -> Result<(), Error<BE>>
where
    BE: BrokerError,
{
    match &result {
        Ok(()) => resource.set_conditions([Condition::reconcile_success()]),
        Err(Error::Broker(e)) => {
            warn!(
                kind = resource.kind(),
                name = %name,
                broker_error = %e.kind(),
                error = %e,
                "broker call failed"
            );
            resource.set_conditions([Condition::reconcile_error(e)]);
        }
        Err(e) => {
            warn!(kind = resource.kind(), name = %name, error = %e, "reconcile failed");
            resource.set_conditions([Condition::reconcile_error(e)]);
        }
    }

    result
}
