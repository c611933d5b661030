use nats_provider_apis::{Condition, Consumer, ObjectMeta, Stream};

/// A resource the controller reconciles.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resource {
    /// A stream.
    Stream(Stream),

    /// A consumer.
    Consumer(Consumer),
}

impl Resource {
    /// Kind name used in logs and errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Stream(_) => "stream",
            Self::Consumer(_) => "consumer",
        }
    }

    /// Resource metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Stream(stream) => &stream.metadata,
            Self::Consumer(consumer) => &consumer.metadata,
        }
    }

    /// JetStream domain the resource lives in.
    #[must_use]
    pub fn domain(&self) -> &str {
        match self {
            Self::Stream(stream) => &stream.spec.for_provider.domain,
            Self::Consumer(consumer) => &consumer.spec.for_provider.domain,
        }
    }

    /// All recorded conditions, oldest first.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        match self {
            Self::Stream(stream) => &stream.status.conditions,
            Self::Consumer(consumer) => &consumer.status.conditions,
        }
    }

    /// Records conditions.
    pub fn set_conditions(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        match self {
            Self::Stream(stream) => stream.status.set_conditions(conditions),
            Self::Consumer(consumer) => consumer.status.set_conditions(conditions),
        }
    }
}

impl From<Stream> for Resource {
    fn from(stream: Stream) -> Self {
        Self::Stream(stream)
    }
}

impl From<Consumer> for Resource {
    fn from(consumer: Consumer) -> Self {
        Self::Consumer(consumer)
    }
}
