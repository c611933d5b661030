use nats_provider_jetstream::{
    AckPolicy, DeliverPolicy, DiscardPolicy, ReplayPolicy, RetentionPolicy, StorageType,
};

use crate::{EnumFamily, Error};

/// A native enum that is spelled as a string in the declarative schema.
///
/// The mapping is total in both directions for the fixed set of names;
/// unknown names are rejected rather than replaced by a default.
pub trait SpecEnum: Copy + Sized + 'static {
    /// The family reported in errors.
    const FAMILY: EnumFamily;

    /// Every accepted spelling, in declaration order.
    const NAMES: &'static [&'static str];

    /// Maps a schema string to the native value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEnumValue`] if `value` is not one of
    /// [`Self::NAMES`].
    fn from_spec(value: &str) -> Result<Self, Error>;

    /// Maps a native value back to its schema string.
    fn to_spec(self) -> &'static str;
}

macro_rules! impl_spec_enum {
    ($native:ty, $family:expr, { $($name:literal => $variant:ident),+ $(,)? }) => {
        impl SpecEnum for $native {
            const FAMILY: EnumFamily = $family;

            const NAMES: &'static [&'static str] = &[$($name),+];

            fn from_spec(value: &str) -> Result<Self, Error> {
                match value {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(Error::UnknownEnumValue {
                        family: Self::FAMILY,
                        value: value.to_string(),
                    }),
                }
            }

            fn to_spec(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

impl_spec_enum!(RetentionPolicy, EnumFamily::Retention, {
    "Limits" => Limits,
    "Interest" => Interest,
    "WorkQueue" => WorkQueue,
});

impl_spec_enum!(DiscardPolicy, EnumFamily::Discard, {
    "Old" => Old,
    "New" => New,
});

impl_spec_enum!(StorageType, EnumFamily::Storage, {
    "File" => File,
    "Memory" => Memory,
});

impl_spec_enum!(DeliverPolicy, EnumFamily::DeliverPolicy, {
    "All" => All,
    "Last" => Last,
    "New" => New,
    "ByStartSequence" => ByStartSequence,
    "ByStartTime" => ByStartTime,
    "LastPerSubject" => LastPerSubject,
});

impl_spec_enum!(AckPolicy, EnumFamily::AckPolicy, {
    "None" => None,
    "All" => All,
    "Explicit" => Explicit,
});

impl_spec_enum!(ReplayPolicy, EnumFamily::ReplayPolicy, {
    "Instant" => Instant,
    "Original" => Original,
});

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    fn assert_bijective<T: SpecEnum + PartialEq + std::fmt::Debug>() {
        for name in T::NAMES {
            let native = T::from_spec(name).unwrap();
            assert_eq!(native.to_spec(), *name);
        }
    }

    #[test]
    fn test_tables_are_bijective() {
        assert_bijective::<RetentionPolicy>();
        assert_bijective::<DiscardPolicy>();
        assert_bijective::<StorageType>();
        assert_bijective::<DeliverPolicy>();
        assert_bijective::<AckPolicy>();
        assert_bijective::<ReplayPolicy>();
    }

    #[test]
    fn test_known_values() {
        assert_eq!(
            RetentionPolicy::from_spec("WorkQueue").unwrap(),
            RetentionPolicy::WorkQueue
        );
        assert_eq!(DeliverPolicy::from_spec("New").unwrap(), DeliverPolicy::New);
        assert_eq!(AckPolicy::from_spec("None").unwrap(), AckPolicy::None);
        assert_eq!(StorageType::Memory.to_spec(), "Memory");
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        assert_matches!(
            RetentionPolicy::from_spec("limits"),
            Err(Error::UnknownEnumValue { family: EnumFamily::Retention, value }) if value == "limits"
        );
        assert_matches!(
            DiscardPolicy::from_spec(""),
            Err(Error::UnknownEnumValue { family: EnumFamily::Discard, .. })
        );
        assert_matches!(
            ReplayPolicy::from_spec("Fast"),
            Err(Error::UnknownEnumValue { family: EnumFamily::ReplayPolicy, .. })
        );
    }

    #[test]
    fn test_error_message_names_family() {
        let err = AckPolicy::from_spec("Sometimes").unwrap_err();
        assert_eq!(err.to_string(), "unknown ack policy \"Sometimes\"");
    }
}
