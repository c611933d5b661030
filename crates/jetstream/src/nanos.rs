//! JetStream encodes every duration as a signed count of nanoseconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let nanos = i64::deserialize(deserializer)?;

    // Negative values are sentinels for "unset".
    Ok(Duration::from_nanos(u64::try_from(nanos).unwrap_or(0)))
}

pub fn is_zero(duration: &Duration) -> bool {
    duration.is_zero()
}
