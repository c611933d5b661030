use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stream::ClusterInfo;

/// Where in the stream a consumer starts delivering.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverPolicy {
    /// From the first message.
    #[default]
    All,

    /// From the last message.
    Last,

    /// Only messages published after creation.
    New,

    /// From `opt_start_seq`.
    #[serde(rename = "by_start_sequence")]
    ByStartSequence,

    /// From `opt_start_time`.
    #[serde(rename = "by_start_time")]
    ByStartTime,

    /// The last message of every subject.
    LastPerSubject,
}

/// How messages must be acknowledged.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AckPolicy {
    /// No acknowledgement required.
    None,

    /// Acknowledging a message acknowledges every message before it.
    All,

    /// Every message is acknowledged individually.
    #[default]
    Explicit,
}

/// Pace at which messages are replayed.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayPolicy {
    /// As fast as possible.
    #[default]
    Instant,

    /// At the rate they were originally received.
    Original,
}

/// Native consumer configuration as accepted by `CONSUMER.CREATE`.
///
/// Pull-only fields (`max_waiting`, `max_batch`, `max_expires`,
/// `max_bytes`) and push-only fields (`deliver_subject`, `deliver_group`,
/// `flow_control`, `idle_heartbeat`, `rate_limit`, `headers_only`) share one
/// flat struct, as on the wire.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Consumer name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Durable name; equal to `name` for managed consumers.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub durable_name: String,

    /// Free text description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Deliver policy.
    pub deliver_policy: DeliverPolicy,

    /// Start sequence for `DeliverPolicy::ByStartSequence`.
    #[serde(rename = "opt_start_seq", skip_serializing_if = "is_zero_u64")]
    pub start_sequence: u64,

    /// Start time for `DeliverPolicy::ByStartTime`.
    #[serde(rename = "opt_start_time", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Acknowledgement policy.
    pub ack_policy: AckPolicy,

    /// Time to wait for an acknowledgement before redelivering.
    #[serde(with = "crate::nanos", skip_serializing_if = "crate::nanos::is_zero")]
    pub ack_wait: Duration,

    /// Maximum delivery attempts, `-1` for unlimited.
    pub max_deliver: i64,

    /// Only deliver messages matching this subject.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter_subject: String,

    /// Replay policy.
    pub replay_policy: ReplayPolicy,

    /// Push delivery rate limit in bits per second.
    #[serde(rename = "rate_limit_bps", skip_serializing_if = "is_zero_u64")]
    pub rate_limit: u64,

    /// Maximum outstanding pull requests.
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub max_waiting: i64,

    /// Maximum unacknowledged messages, `-1` for unlimited.
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub max_ack_pending: i64,

    /// Only deliver headers.
    #[serde(skip_serializing_if = "is_false")]
    pub headers_only: bool,

    /// Maximum batch of a single pull request.
    #[serde(rename = "max_batch", skip_serializing_if = "is_zero_i64")]
    pub max_request_batch: i64,

    /// Maximum expiry of a single pull request.
    #[serde(
        rename = "max_expires",
        with = "crate::nanos",
        skip_serializing_if = "crate::nanos::is_zero"
    )]
    pub max_request_expires: Duration,

    /// Maximum bytes of a single pull request.
    #[serde(rename = "max_bytes", skip_serializing_if = "is_zero_i64")]
    pub max_request_max_bytes: i64,

    /// Subject push consumers deliver to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deliver_subject: String,

    /// Queue group push consumers deliver to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deliver_group: String,

    /// Enable push flow control.
    #[serde(skip_serializing_if = "is_false")]
    pub flow_control: bool,

    /// Idle heartbeat interval for push consumers.
    #[serde(with = "crate::nanos", skip_serializing_if = "crate::nanos::is_zero")]
    pub idle_heartbeat: Duration,

    /// Time after which an inactive consumer is removed.
    #[serde(with = "crate::nanos", skip_serializing_if = "crate::nanos::is_zero")]
    pub inactive_threshold: Duration,

    /// Number of replicas, zero to inherit from the stream.
    pub num_replicas: i32,

    /// Force memory storage.
    #[serde(rename = "mem_storage", skip_serializing_if = "is_false")]
    pub memory_storage: bool,
}

impl ConsumerConfig {
    /// Whether this is a push consumer.
    #[must_use]
    pub fn is_push(&self) -> bool {
        !self.deliver_subject.is_empty()
    }
}

/// Consumer and stream sequence pair.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SequenceInfo {
    /// Consumer sequence.
    #[serde(rename = "consumer_seq")]
    pub consumer_sequence: u64,

    /// Stream sequence.
    #[serde(rename = "stream_seq")]
    pub stream_sequence: u64,

    /// Last activity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
}

/// Response of `CONSUMER.INFO`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConsumerInfo {
    /// Stream the consumer reads from.
    pub stream_name: String,

    /// Consumer name.
    pub name: String,

    /// Creation time.
    pub created: DateTime<Utc>,

    /// Configuration as stored by the server.
    pub config: ConsumerConfig,

    /// Last delivered sequences.
    #[serde(default)]
    pub delivered: SequenceInfo,

    /// Highest contiguous acknowledged sequences.
    #[serde(default)]
    pub ack_floor: SequenceInfo,

    /// Messages delivered but not yet acknowledged.
    #[serde(default)]
    pub num_ack_pending: u64,

    /// Messages redelivered at least once.
    #[serde(default)]
    pub num_redelivered: u64,

    /// Outstanding pull requests.
    #[serde(default)]
    pub num_waiting: u64,

    /// Messages not yet delivered.
    #[serde(default)]
    pub num_pending: u64,

    /// Cluster information, absent on single servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterInfo>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_policy_wire_names() {
        assert_eq!(
            serde_json::to_string(&DeliverPolicy::ByStartSequence).unwrap(),
            "\"by_start_sequence\""
        );
        assert_eq!(
            serde_json::to_string(&DeliverPolicy::LastPerSubject).unwrap(),
            "\"last_per_subject\""
        );
        assert_eq!(
            serde_json::from_str::<AckPolicy>("\"explicit\"").unwrap(),
            AckPolicy::Explicit
        );
    }

    #[test]
    fn test_pull_fields_use_wire_names() {
        let config = ConsumerConfig {
            max_request_batch: 100,
            max_request_expires: Duration::from_secs(60),
            max_request_max_bytes: 1024,
            max_deliver: -1,
            ..Default::default()
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["max_batch"], 100);
        assert_eq!(json["max_expires"], 60_000_000_000_i64);
        assert_eq!(json["max_bytes"], 1024);
        assert_eq!(json["max_deliver"], -1);
        assert!(json.get("deliver_subject").is_none());
    }

    #[test]
    fn test_is_push() {
        let mut config = ConsumerConfig::default();
        assert!(!config.is_push());

        config.deliver_subject = "deliver.orders".to_string();
        assert!(config.is_push());
    }
}
