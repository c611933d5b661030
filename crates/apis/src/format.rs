use std::time::Duration;

use chrono::{DateTime, Utc};
use nats_provider_convert::{format_duration, format_timestamp};

/// Zero renders as the empty string, which parses back to "not set".
pub fn duration_to_spec(duration: Duration) -> String {
    if duration.is_zero() {
        String::new()
    } else {
        format_duration(duration)
    }
}

pub fn timestamp_to_spec(timestamp: Option<&DateTime<Utc>>) -> String {
    timestamp.map(format_timestamp).unwrap_or_default()
}
