//! Convergence of JetStream streams and consumers towards their declared
//! resource documents.
//!
//! [`External`] wraps a [`Broker`](nats_provider_jetstream::Broker) and
//! offers the observe, create, update and delete steps an external scheduler
//! calls on every poll. Each step reads the broker-side name from the
//! resource's external name annotation, records its outcome as status
//! conditions and propagates failures to the caller for retry.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Canonical comparison of desired and observed configuration.
pub mod drift;

mod error;
mod external;
mod identity;
mod resource;
mod status;

pub use error::Error;
pub use external::{Action, External, Observation};
pub use identity::{EXTERNAL_NAME_ANNOTATION, MissingExternalName, external_name};
pub use resource::Resource;
