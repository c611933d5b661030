use std::error::Error;
use std::fmt::{self, Debug};

/// Marker trait for errors returned by a [`crate::Broker`].
pub trait BrokerError: Debug + Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> BrokerErrorKind;

    /// Whether the broker reported that the addressed object does not exist.
    fn is_not_found(&self) -> bool {
        self.kind() == BrokerErrorKind::NotFound
    }
}

/// The kind of broker error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BrokerErrorKind {
    /// The stream or consumer does not exist.
    NotFound,

    /// An object with the same name but a different configuration exists.
    AlreadyExists,

    /// The broker could not be reached or did not answer in time.
    Unavailable,

    /// Any other failure reported by the broker.
    Other,
}

impl fmt::Display for BrokerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
