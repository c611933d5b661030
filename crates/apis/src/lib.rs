//! Declarative `Stream` and `Consumer` resource documents and their
//! conversion to native JetStream configuration.
//!
//! Everything the user writes is string typed here: policies are spelled
//! `"WorkQueue"`, durations `"1h2m3s"`, timestamps RFC3339. Conversion to the
//! native types happens once, at this boundary, and is pure.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod format;
mod meta;
mod observation;

/// The `Consumer` resource.
pub mod consumer;

/// The `Stream` resource.
pub mod stream;

pub use consumer::{Consumer, ConsumerParameters, DEFAULT_MAX_WAITING};
pub use error::Error;
pub use meta::{Condition, ConditionReason, ConditionStatus, ConditionType, ObjectMeta, Status};
pub use observation::{ClusterObservation, PeerObservation, SequenceObservation};
pub use stream::{Stream, StreamParameters};
