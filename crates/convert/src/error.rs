use std::fmt;

use thiserror::Error;

/// The policy enum a value was expected to belong to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnumFamily {
    /// Stream retention policy.
    Retention,

    /// Stream discard policy.
    Discard,

    /// Stream storage type.
    Storage,

    /// Consumer deliver policy.
    DeliverPolicy,

    /// Consumer ack policy.
    AckPolicy,

    /// Consumer replay policy.
    ReplayPolicy,
}

impl fmt::Display for EnumFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Retention => "retention policy",
            Self::Discard => "discard policy",
            Self::Storage => "storage type",
            Self::DeliverPolicy => "deliver policy",
            Self::AckPolicy => "ack policy",
            Self::ReplayPolicy => "replay policy",
        };

        f.write_str(name)
    }
}

/// Errors converting declarative values to native ones.
///
/// All of these are deterministic: converting the same input again yields the
/// same error.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Not a valid duration.
    #[error("invalid duration {value:?}: {reason}")]
    InvalidDuration {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Not an RFC3339 timestamp.
    #[error("invalid timestamp {value:?}: expected RFC3339 such as 2006-01-02T15:04:05Z07:00")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
    },

    /// Not one of the known values of an enum family.
    #[error("unknown {family} {value:?}")]
    UnknownEnumValue {
        /// The enum family.
        family: EnumFamily,
        /// The rejected input.
        value: String,
    },
}
