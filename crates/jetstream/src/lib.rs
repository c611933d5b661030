//! Native JetStream configuration and state types, plus the `Broker` trait
//! that reconciliation is performed against.
//!
//! The types here mirror the JetStream API wire format: durations are
//! nanoseconds, timestamps are RFC3339, enums are lower snake case. Fields
//! the server fills in on its own (creation time, runtime state, cluster
//! placement) live on the `*Info` types and never on the configs.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod broker;
mod error;
mod nanos;

/// Consumer configuration and observed consumer state.
pub mod consumer;

/// Stream configuration and observed stream state.
pub mod stream;

pub use broker::Broker;
pub use consumer::{
    AckPolicy, ConsumerConfig, ConsumerInfo, DeliverPolicy, ReplayPolicy, SequenceInfo,
};
pub use error::{BrokerError, BrokerErrorKind};
pub use stream::{
    ClusterInfo, DiscardPolicy, External, PeerInfo, Placement, Republish, RetentionPolicy,
    StorageType, StreamConfig, StreamInfo, StreamSource, StreamState,
};
