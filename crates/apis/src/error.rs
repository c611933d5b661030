use thiserror::Error;

/// Errors converting a declarative spec to native configuration.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A field could not be parsed.
    #[error(transparent)]
    Convert(#[from] nats_provider_convert::Error),

    /// Both a pull and a push spec were given.
    #[error("a consumer must not set both a pull and a push spec")]
    PushAndPullConflict,
}
