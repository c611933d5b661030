use nats_provider_convert::{SpecEnum, parse_optional_duration, parse_optional_timestamp};
use nats_provider_jetstream::consumer as native;
use serde::{Deserialize, Serialize};

use crate::format::{duration_to_spec, timestamp_to_spec};
use crate::{ClusterObservation, Error, ObjectMeta, SequenceObservation, Status};

/// Outstanding pull requests a pull consumer accepts unless told otherwise.
pub const DEFAULT_MAX_WAITING: i64 = 512;

/// A JetStream consumer managed from a declarative document.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumer {
    /// Resource metadata, including the external name annotation.
    pub metadata: ObjectMeta,

    /// Desired state.
    pub spec: ConsumerSpec,

    /// Observed state and conditions.
    #[serde(default)]
    pub status: Status<ConsumerObservation>,
}

/// Desired state of a [`Consumer`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerSpec {
    /// Parameters passed to the broker.
    pub for_provider: ConsumerParameters,
}

/// Where and how the consumer is created.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerParameters {
    /// JetStream domain, empty for the default domain.
    #[serde(default)]
    pub domain: String,

    /// Stream the consumer reads from.
    pub stream: String,

    /// Consumer configuration.
    #[serde(default)]
    pub config: ConsumerConfig,
}

/// Declarative consumer configuration.
///
/// At most one of `pull` and `push` may be set. With neither, the consumer
/// is a plain pull consumer with default limits.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerConfig {
    /// Free text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// `All`, `Last`, `New`, `ByStartSequence`, `ByStartTime` or
    /// `LastPerSubject`.
    #[serde(default = "default_deliver_policy")]
    pub deliver_policy: String,

    /// Start sequence for `ByStartSequence`.
    #[serde(default)]
    pub opt_start_seq: u64,

    /// Start time for `ByStartTime`, RFC3339.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub opt_start_time: String,

    /// `None`, `All` or `Explicit`.
    #[serde(default = "default_ack_policy")]
    pub ack_policy: String,

    /// Time to wait for an acknowledgement.
    #[serde(default = "default_ack_wait")]
    pub ack_wait: String,

    /// Maximum delivery attempts, `-1` for unlimited.
    #[serde(default = "unlimited")]
    pub max_deliver: i64,

    /// Only deliver matching subjects.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filter_subject: String,

    /// `Instant` or `Original`.
    #[serde(default = "default_replay_policy")]
    pub replay_policy: String,

    /// Maximum unacknowledged messages.
    #[serde(default = "default_max_ack_pending")]
    pub max_ack_pending: i64,

    /// Remove the consumer after this much inactivity; empty to keep it.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub inactive_threshold: String,

    /// Replicas, `0` to inherit from the stream.
    #[serde(default)]
    pub replicas: i32,

    /// Force memory storage.
    #[serde(default)]
    pub mem_storage: bool,

    /// Pull specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull: Option<PullConsumerSpec>,

    /// Push specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushConsumerSpec>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            description: String::new(),
            deliver_policy: default_deliver_policy(),
            opt_start_seq: 0,
            opt_start_time: String::new(),
            ack_policy: default_ack_policy(),
            ack_wait: default_ack_wait(),
            max_deliver: unlimited(),
            filter_subject: String::new(),
            replay_policy: default_replay_policy(),
            max_ack_pending: default_max_ack_pending(),
            inactive_threshold: String::new(),
            replicas: 0,
            mem_storage: false,
            pull: None,
            push: None,
        }
    }
}

impl ConsumerConfig {
    /// Fills in defaults for fields left at their zero value.
    pub fn set_defaults(&mut self) {
        if self.deliver_policy.is_empty() {
            self.deliver_policy = default_deliver_policy();
        }
        if self.ack_policy.is_empty() {
            self.ack_policy = default_ack_policy();
        }
        if self.ack_wait.is_empty() {
            self.ack_wait = default_ack_wait();
        }
        if self.replay_policy.is_empty() {
            self.replay_policy = default_replay_policy();
        }
    }
}

/// Settings only meaningful for pull consumers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullConsumerSpec {
    /// Maximum outstanding pull requests, [`DEFAULT_MAX_WAITING`] if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_waiting: Option<i64>,

    /// Maximum expiry of one pull request.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub max_request_expires: String,

    /// Maximum batch of one pull request.
    #[serde(default)]
    pub max_request_batch: i64,

    /// Maximum bytes of one pull request.
    #[serde(default)]
    pub max_request_max_bytes: i64,
}

/// Settings only meaningful for push consumers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushConsumerSpec {
    /// Delivery rate limit in bits per second.
    #[serde(default)]
    pub rate_limit: u64,

    /// Only deliver headers.
    #[serde(default)]
    pub headers_only: bool,

    /// Subject to deliver to.
    pub deliver_subject: String,

    /// Queue group to deliver to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deliver_group: String,

    /// Enable flow control.
    #[serde(default)]
    pub flow_control: bool,

    /// Idle heartbeat interval.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub idle_heartbeat: String,
}

/// What was last observed of a consumer.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerObservation {
    /// Domain the consumer was observed in.
    #[serde(default)]
    pub domain: String,

    /// Stream the consumer reads from.
    #[serde(default)]
    pub stream_name: String,

    /// Consumer name.
    #[serde(default)]
    pub name: String,

    /// Durable name.
    #[serde(default)]
    pub durable_name: String,

    /// Creation time, RFC3339.
    #[serde(default)]
    pub created: String,

    /// Whether this is a push consumer.
    #[serde(default)]
    pub push_bound: bool,

    /// Last delivered sequences.
    #[serde(default)]
    pub delivered: SequenceObservation,

    /// Highest contiguous acknowledged sequences.
    #[serde(default)]
    pub ack_floor: SequenceObservation,

    /// Delivered but unacknowledged messages.
    #[serde(default)]
    pub num_ack_pending: u64,

    /// Redelivered messages.
    #[serde(default)]
    pub num_redelivered: u64,

    /// Outstanding pull requests.
    #[serde(default)]
    pub num_waiting: u64,

    /// Messages not yet delivered.
    #[serde(default)]
    pub num_pending: u64,

    /// Raft group.
    #[serde(default)]
    pub cluster_info: ClusterObservation,
}

fn default_deliver_policy() -> String {
    "All".to_string()
}

fn default_ack_policy() -> String {
    "Explicit".to_string()
}

fn default_ack_wait() -> String {
    "30s".to_string()
}

fn default_replay_policy() -> String {
    "Instant".to_string()
}

const fn default_max_ack_pending() -> i64 {
    1000
}

const fn unlimited() -> i64 {
    -1
}

/// Builds the native configuration of the consumer called `name`.
///
/// `name` is used as both the consumer name and its durable name.
///
/// # Errors
///
/// Returns [`Error::PushAndPullConflict`] if both sub-specs are set,
/// otherwise the first enum, duration or timestamp that fails to parse.
pub fn to_native(name: &str, config: &ConsumerConfig) -> Result<native::ConsumerConfig, Error> {
    if config.pull.is_some() && config.push.is_some() {
        return Err(Error::PushAndPullConflict);
    }

    let deliver_policy = native::DeliverPolicy::from_spec(&config.deliver_policy)?;
    let ack_policy = native::AckPolicy::from_spec(&config.ack_policy)?;
    let replay_policy = native::ReplayPolicy::from_spec(&config.replay_policy)?;

    let ack_wait = parse_optional_duration(&config.ack_wait)?.unwrap_or_default();
    let inactive_threshold =
        parse_optional_duration(&config.inactive_threshold)?.unwrap_or_default();
    let start_time = parse_optional_timestamp(&config.opt_start_time)?;

    let mut consumer = native::ConsumerConfig {
        name: name.to_string(),
        durable_name: name.to_string(),
        description: config.description.clone(),
        deliver_policy,
        start_sequence: config.opt_start_seq,
        start_time,
        ack_policy,
        ack_wait,
        max_deliver: config.max_deliver,
        filter_subject: config.filter_subject.clone(),
        replay_policy,
        max_waiting: DEFAULT_MAX_WAITING,
        max_ack_pending: config.max_ack_pending,
        inactive_threshold,
        num_replicas: config.replicas,
        memory_storage: config.mem_storage,
        ..Default::default()
    };

    if let Some(pull) = &config.pull {
        consumer.max_waiting = pull.max_waiting.unwrap_or(DEFAULT_MAX_WAITING);
        consumer.max_request_expires =
            parse_optional_duration(&pull.max_request_expires)?.unwrap_or_default();
        consumer.max_request_batch = pull.max_request_batch;
        consumer.max_request_max_bytes = pull.max_request_max_bytes;
    }

    if let Some(push) = &config.push {
        consumer.max_waiting = 0;
        consumer.rate_limit = push.rate_limit;
        consumer.headers_only = push.headers_only;
        consumer.deliver_subject.clone_from(&push.deliver_subject);
        consumer.deliver_group.clone_from(&push.deliver_group);
        consumer.flow_control = push.flow_control;
        consumer.idle_heartbeat = parse_optional_duration(&push.idle_heartbeat)?.unwrap_or_default();
    }

    Ok(consumer)
}

/// Renders a native configuration back into declarative form.
#[must_use]
pub fn from_native(config: &native::ConsumerConfig) -> ConsumerConfig {
    let push = config.is_push().then(|| PushConsumerSpec {
        rate_limit: config.rate_limit,
        headers_only: config.headers_only,
        deliver_subject: config.deliver_subject.clone(),
        deliver_group: config.deliver_group.clone(),
        flow_control: config.flow_control,
        idle_heartbeat: duration_to_spec(config.idle_heartbeat),
    });

    let has_pull_settings = config.max_waiting != DEFAULT_MAX_WAITING
        || !config.max_request_expires.is_zero()
        || config.max_request_batch != 0
        || config.max_request_max_bytes != 0;

    let pull = (!config.is_push() && has_pull_settings).then(|| PullConsumerSpec {
        max_waiting: Some(config.max_waiting),
        max_request_expires: duration_to_spec(config.max_request_expires),
        max_request_batch: config.max_request_batch,
        max_request_max_bytes: config.max_request_max_bytes,
    });

    ConsumerConfig {
        description: config.description.clone(),
        deliver_policy: config.deliver_policy.to_spec().to_string(),
        opt_start_seq: config.start_sequence,
        opt_start_time: timestamp_to_spec(config.start_time.as_ref()),
        ack_policy: config.ack_policy.to_spec().to_string(),
        ack_wait: duration_to_spec(config.ack_wait),
        max_deliver: config.max_deliver,
        filter_subject: config.filter_subject.clone(),
        replay_policy: config.replay_policy.to_spec().to_string(),
        max_ack_pending: config.max_ack_pending,
        inactive_threshold: duration_to_spec(config.inactive_threshold),
        replicas: config.num_replicas,
        mem_storage: config.memory_storage,
        pull,
        push,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use nats_provider_convert::EnumFamily;
    use pretty_assertions::assert_eq;

    fn minimal() -> ConsumerConfig {
        ConsumerConfig {
            description: "my consumer".to_string(),
            deliver_policy: "New".to_string(),
            ack_policy: "Explicit".to_string(),
            ack_wait: "2m".to_string(),
            max_deliver: -1,
            filter_subject: "foo".to_string(),
            replay_policy: "Instant".to_string(),
            max_ack_pending: 5000,
            inactive_threshold: "1m".to_string(),
            replicas: 0,
            mem_storage: false,
            ..Default::default()
        }
    }

    fn pull() -> PullConsumerSpec {
        PullConsumerSpec {
            max_waiting: Some(100),
            max_request_expires: "1m".to_string(),
            max_request_batch: 100,
            max_request_max_bytes: 1024,
        }
    }

    fn push() -> PushConsumerSpec {
        PushConsumerSpec {
            rate_limit: 1000,
            headers_only: true,
            deliver_subject: "mysubject".to_string(),
            deliver_group: "mydelivergroup".to_string(),
            flow_control: true,
            idle_heartbeat: "30s".to_string(),
        }
    }

    fn assert_common(native: &native::ConsumerConfig) {
        assert_eq!(native.name, "mystream");
        assert_eq!(native.durable_name, "mystream");
        assert_eq!(native.description, "my consumer");
        assert_eq!(native.deliver_policy, native::DeliverPolicy::New);
        assert_eq!(native.ack_policy, native::AckPolicy::Explicit);
        assert_eq!(native.ack_wait, Duration::from_secs(120));
        assert_eq!(native.max_deliver, -1);
        assert_eq!(native.filter_subject, "foo");
        assert_eq!(native.replay_policy, native::ReplayPolicy::Instant);
        assert_eq!(native.max_ack_pending, 5000);
        assert_eq!(native.inactive_threshold, Duration::from_secs(60));
        assert_eq!(native.num_replicas, 0);
        assert!(!native.memory_storage);
    }

    #[test]
    fn test_minimal() {
        let native = to_native("mystream", &minimal()).unwrap();

        assert_common(&native);
        assert_eq!(native.max_waiting, DEFAULT_MAX_WAITING);
        assert!(!native.is_push());
    }

    #[test]
    fn test_pull() {
        let config = ConsumerConfig {
            pull: Some(pull()),
            ..minimal()
        };

        let native = to_native("mystream", &config).unwrap();

        assert_common(&native);
        assert_eq!(native.max_waiting, 100);
        assert_eq!(native.max_request_expires, Duration::from_secs(60));
        assert_eq!(native.max_request_batch, 100);
        assert_eq!(native.max_request_max_bytes, 1024);
    }

    #[test]
    fn test_pull_without_max_waiting_uses_default() {
        let config = ConsumerConfig {
            pull: Some(PullConsumerSpec {
                max_waiting: None,
                ..pull()
            }),
            ..minimal()
        };

        let native = to_native("mystream", &config).unwrap();

        assert_eq!(native.max_waiting, DEFAULT_MAX_WAITING);
    }

    #[test]
    fn test_push() {
        let config = ConsumerConfig {
            push: Some(push()),
            ..minimal()
        };

        let native = to_native("mystream", &config).unwrap();

        assert_common(&native);
        assert_eq!(native.max_waiting, 0);
        assert_eq!(native.rate_limit, 1000);
        assert!(native.headers_only);
        assert_eq!(native.deliver_subject, "mysubject");
        assert_eq!(native.deliver_group, "mydelivergroup");
        assert!(native.flow_control);
        assert_eq!(native.idle_heartbeat, Duration::from_secs(30));
        assert!(native.is_push());
    }

    #[test]
    fn test_push_and_pull_conflict() {
        let config = ConsumerConfig {
            pull: Some(pull()),
            push: Some(push()),
            ..minimal()
        };

        assert_matches!(
            to_native("mystream", &config),
            Err(Error::PushAndPullConflict)
        );
    }

    #[test]
    fn test_start_time() {
        let config = ConsumerConfig {
            deliver_policy: "ByStartTime".to_string(),
            opt_start_time: "2023-01-09T14:48:32+00:00".to_string(),
            ..minimal()
        };

        let native = to_native("mystream", &config).unwrap();

        assert_eq!(native.deliver_policy, native::DeliverPolicy::ByStartTime);
        assert_eq!(
            native.start_time,
            Some(Utc.with_ymd_and_hms(2023, 1, 9, 14, 48, 32).unwrap())
        );
    }

    #[test]
    fn test_invalid_fields() {
        let config = ConsumerConfig {
            ack_policy: "explicit".to_string(),
            ..minimal()
        };
        assert_matches!(
            to_native("mystream", &config),
            Err(Error::Convert(nats_provider_convert::Error::UnknownEnumValue {
                family: EnumFamily::AckPolicy,
                ..
            }))
        );

        let config = ConsumerConfig {
            ack_wait: "two minutes".to_string(),
            ..minimal()
        };
        assert_matches!(
            to_native("mystream", &config),
            Err(Error::Convert(
                nats_provider_convert::Error::InvalidDuration { .. }
            ))
        );
    }

    #[test]
    fn test_from_native_round_trips() {
        for config in [
            minimal(),
            ConsumerConfig {
                pull: Some(pull()),
                ..minimal()
            },
            ConsumerConfig {
                push: Some(push()),
                ..minimal()
            },
        ] {
            let native = to_native("mystream", &config).unwrap();
            let spec = from_native(&native);

            assert_eq!(to_native("mystream", &spec).unwrap(), native);
            assert_eq!(spec.pull.is_some(), config.pull.is_some());
            assert_eq!(spec.push.is_some(), config.push.is_some());
        }
    }

    #[test]
    fn test_document_defaults() {
        let params: ConsumerParameters =
            serde_json::from_str(r#"{ "stream": "orders", "config": {} }"#).unwrap();

        assert_eq!(params.stream, "orders");
        assert_eq!(params.config, ConsumerConfig::default());
        assert_eq!(params.config.deliver_policy, "All");
        assert_eq!(params.config.ack_wait, "30s");
        assert_eq!(params.config.max_deliver, -1);
    }
}
