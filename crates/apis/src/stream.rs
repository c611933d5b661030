use nats_provider_convert::{SpecEnum, parse_optional_duration, parse_optional_timestamp};
use nats_provider_jetstream::stream as native;
use serde::{Deserialize, Serialize};

use crate::format::{duration_to_spec, timestamp_to_spec};
use crate::{ClusterObservation, Error, ObjectMeta, Status};

/// A JetStream stream managed from a declarative document.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    /// Resource metadata, including the external name annotation.
    pub metadata: ObjectMeta,

    /// Desired state.
    pub spec: StreamSpec,

    /// Observed state and conditions.
    #[serde(default)]
    pub status: Status<StreamObservation>,
}

/// Desired state of a [`Stream`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSpec {
    /// Parameters passed to the broker.
    pub for_provider: StreamParameters,
}

/// Where and how the stream is created.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamParameters {
    /// JetStream domain, empty for the default domain.
    #[serde(default)]
    pub domain: String,

    /// Stream configuration.
    #[serde(default)]
    pub config: StreamConfig,
}

/// Declarative stream configuration.
///
/// Absent fields take their defaults at deserialization time; see
/// [`StreamConfig::set_defaults`] for documents assembled in code.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConfig {
    /// Free text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Subjects the stream listens on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,

    /// `Limits`, `Interest` or `WorkQueue`.
    #[serde(default = "default_retention")]
    pub retention: String,

    /// Maximum number of consumers, `-1` for unlimited.
    #[serde(default = "unlimited")]
    pub max_consumers: i64,

    /// Maximum number of messages, `-1` for unlimited.
    #[serde(default = "unlimited")]
    pub max_msgs: i64,

    /// Maximum total size in bytes, `-1` for unlimited.
    #[serde(default = "unlimited")]
    pub max_bytes: i64,

    /// `Old` or `New`.
    #[serde(default = "default_discard")]
    pub discard: String,

    /// Apply `New` discard per subject.
    #[serde(default)]
    pub discard_new_per_subject: bool,

    /// Maximum message age such as `"24h"`, empty for unlimited.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub max_age: String,

    /// Maximum messages per subject, `-1` for unlimited.
    #[serde(default = "unlimited")]
    pub max_msgs_per_subject: i64,

    /// Maximum size of one message, `-1` for unlimited.
    #[serde(default = "unlimited_i32")]
    pub max_msg_size: i32,

    /// Duplicate detection window.
    #[serde(default = "default_duplicates")]
    pub duplicates: String,

    /// `File` or `Memory`.
    #[serde(default = "default_storage")]
    pub storage: String,

    /// Number of replicas.
    #[serde(default = "default_replicas")]
    pub replicas: i32,

    /// Disable publish acknowledgements.
    #[serde(default)]
    pub no_ack: bool,

    /// Placement constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,

    /// Stream to mirror.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<StreamSource>,

    /// Streams to source from. An empty list is kept apart from an absent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<StreamSource>>,

    /// Refuse all further changes.
    #[serde(default)]
    pub sealed: bool,

    /// Refuse message deletion.
    #[serde(default)]
    pub deny_delete: bool,

    /// Refuse purges.
    #[serde(default)]
    pub deny_purge: bool,

    /// Allow rollup headers.
    #[serde(default)]
    pub allow_rollup: bool,

    /// Re-publish rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_publish: Option<RePublish>,

    /// Allow direct get.
    #[serde(default)]
    pub allow_direct: bool,

    /// Allow direct get on mirrors.
    #[serde(default)]
    pub mirror_direct: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            description: String::new(),
            subjects: Vec::new(),
            retention: default_retention(),
            max_consumers: unlimited(),
            max_msgs: unlimited(),
            max_bytes: unlimited(),
            discard: default_discard(),
            discard_new_per_subject: false,
            max_age: String::new(),
            max_msgs_per_subject: unlimited(),
            max_msg_size: unlimited_i32(),
            duplicates: default_duplicates(),
            storage: default_storage(),
            replicas: default_replicas(),
            no_ack: false,
            placement: None,
            mirror: None,
            sources: None,
            sealed: false,
            deny_delete: false,
            deny_purge: false,
            allow_rollup: false,
            re_publish: None,
            allow_direct: false,
            mirror_direct: false,
        }
    }
}

impl StreamConfig {
    /// Fills in defaults for fields left at their zero value.
    ///
    /// Numeric limits are left alone: `0` is a legal limit.
    pub fn set_defaults(&mut self) {
        if self.retention.is_empty() {
            self.retention = default_retention();
        }
        if self.discard.is_empty() {
            self.discard = default_discard();
        }
        if self.duplicates.is_empty() {
            self.duplicates = default_duplicates();
        }
        if self.storage.is_empty() {
            self.storage = default_storage();
        }
        if self.replicas == 0 {
            self.replicas = default_replicas();
        }
    }
}

/// Cluster and tag placement.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Target cluster.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster: String,

    /// Required server tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A mirror or source.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSource {
    /// Name of the origin stream.
    pub name: String,

    /// Sequence to start from.
    #[serde(default)]
    pub opt_start_seq: u64,

    /// Time to start from, RFC3339.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub opt_start_time: String,

    /// Only replicate matching subjects.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filter_subject: String,

    /// API prefixes of a remote origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalStream>,

    /// JetStream domain of the origin. Used to derive `external` when that
    /// is not given.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
}

/// API prefixes of a stream in another account or domain.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalStream {
    /// API prefix.
    pub api_prefix: String,

    /// Delivery prefix.
    #[serde(default)]
    pub deliver_prefix: String,
}

/// Re-publish rule.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RePublish {
    /// Source subject filter.
    #[serde(default)]
    pub source: String,

    /// Destination subject.
    #[serde(default)]
    pub destination: String,

    /// Only republish headers.
    #[serde(default)]
    pub headers_only: bool,
}

/// What was last observed of a stream.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamObservation {
    /// Domain the stream was observed in.
    #[serde(default)]
    pub domain: String,

    /// Runtime state.
    #[serde(default)]
    pub state: StreamStateObservation,

    /// Raft group.
    #[serde(default)]
    pub cluster_info: ClusterObservation,
}

/// Runtime state of a stream as reported in status.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStateObservation {
    /// Stored messages.
    pub messages: u64,

    /// Stored size, humanized, e.g. `"1.2 KiB"`.
    pub bytes: String,

    /// First sequence.
    pub first_sequence: u64,

    /// Time of the first message, RFC3339.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_timestamp: String,

    /// Last sequence.
    pub last_sequence: u64,

    /// Time of the last message, RFC3339.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_timestamp: String,

    /// Attached consumers.
    pub consumer_count: u64,

    /// Deleted sequences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<u64>,

    /// Number of deleted messages.
    pub num_deleted: i64,

    /// Distinct subjects.
    pub subjects: u64,
}

fn default_retention() -> String {
    "Limits".to_string()
}

fn default_discard() -> String {
    "Old".to_string()
}

fn default_storage() -> String {
    "File".to_string()
}

fn default_duplicates() -> String {
    "2m".to_string()
}

const fn default_replicas() -> i32 {
    1
}

const fn unlimited() -> i64 {
    -1
}

const fn unlimited_i32() -> i32 {
    -1
}

/// Builds the native configuration of the stream called `name`.
///
/// # Errors
///
/// Returns the first enum, duration or timestamp that fails to parse.
pub fn to_native(name: &str, config: &StreamConfig) -> Result<native::StreamConfig, Error> {
    let retention = native::RetentionPolicy::from_spec(&config.retention)?;
    let discard = native::DiscardPolicy::from_spec(&config.discard)?;
    let storage = native::StorageType::from_spec(&config.storage)?;

    let max_age = parse_optional_duration(&config.max_age)?.unwrap_or_default();
    let duplicate_window = parse_optional_duration(&config.duplicates)?.unwrap_or_default();

    let mirror = config.mirror.as_ref().map(source_to_native).transpose()?;
    let sources = config
        .sources
        .as_ref()
        .map(|sources| sources.iter().map(source_to_native).collect::<Result<Vec<_>, _>>())
        .transpose()?;

    Ok(native::StreamConfig {
        name: name.to_string(),
        description: config.description.clone(),
        subjects: config.subjects.clone(),
        retention,
        max_consumers: config.max_consumers,
        max_messages: config.max_msgs,
        max_bytes: config.max_bytes,
        discard,
        discard_new_per_subject: config.discard_new_per_subject,
        max_age,
        max_messages_per_subject: config.max_msgs_per_subject,
        max_message_size: config.max_msg_size,
        storage,
        num_replicas: config.replicas,
        no_ack: config.no_ack,
        duplicate_window,
        placement: config.placement.as_ref().map(|p| native::Placement {
            cluster: p.cluster.clone(),
            tags: p.tags.clone(),
        }),
        mirror,
        sources,
        sealed: config.sealed,
        deny_delete: config.deny_delete,
        deny_purge: config.deny_purge,
        allow_rollup: config.allow_rollup,
        republish: config.re_publish.as_ref().map(|r| native::Republish {
            source: r.source.clone(),
            destination: r.destination.clone(),
            headers_only: r.headers_only,
        }),
        allow_direct: config.allow_direct,
        mirror_direct: config.mirror_direct,
    })
}

fn source_to_native(source: &StreamSource) -> Result<native::StreamSource, Error> {
    let start_time = parse_optional_timestamp(&source.opt_start_time)?;
    let domain = Some(source.domain.clone()).filter(|d| !d.is_empty());

    let external = match (&source.external, &domain) {
        (Some(external), _) => Some(native::External {
            api_prefix: external.api_prefix.clone(),
            deliver_prefix: external.deliver_prefix.clone(),
        }),
        (None, Some(domain)) => Some(native::External {
            api_prefix: format!("$JS.{domain}.API"),
            deliver_prefix: String::new(),
        }),
        (None, None) => None,
    };

    Ok(native::StreamSource {
        name: source.name.clone(),
        start_sequence: source.opt_start_seq,
        start_time,
        filter_subject: source.filter_subject.clone(),
        external,
        domain,
    })
}

/// Renders a native configuration back into declarative form.
///
/// The stream name is not part of the declarative config and is dropped.
#[must_use]
pub fn from_native(config: &native::StreamConfig) -> StreamConfig {
    StreamConfig {
        description: config.description.clone(),
        subjects: config.subjects.clone(),
        retention: config.retention.to_spec().to_string(),
        max_consumers: config.max_consumers,
        max_msgs: config.max_messages,
        max_bytes: config.max_bytes,
        discard: config.discard.to_spec().to_string(),
        discard_new_per_subject: config.discard_new_per_subject,
        max_age: duration_to_spec(config.max_age),
        max_msgs_per_subject: config.max_messages_per_subject,
        max_msg_size: config.max_message_size,
        duplicates: duration_to_spec(config.duplicate_window),
        storage: config.storage.to_spec().to_string(),
        replicas: config.num_replicas,
        no_ack: config.no_ack,
        placement: config.placement.as_ref().map(|p| Placement {
            cluster: p.cluster.clone(),
            tags: p.tags.clone(),
        }),
        mirror: config.mirror.as_ref().map(source_from_native),
        sources: config
            .sources
            .as_ref()
            .map(|sources| sources.iter().map(source_from_native).collect()),
        sealed: config.sealed,
        deny_delete: config.deny_delete,
        deny_purge: config.deny_purge,
        allow_rollup: config.allow_rollup,
        re_publish: config.republish.as_ref().map(|r| RePublish {
            source: r.source.clone(),
            destination: r.destination.clone(),
            headers_only: r.headers_only,
        }),
        allow_direct: config.allow_direct,
        mirror_direct: config.mirror_direct,
    }
}

fn source_from_native(source: &native::StreamSource) -> StreamSource {
    StreamSource {
        name: source.name.clone(),
        opt_start_seq: source.start_sequence,
        opt_start_time: timestamp_to_spec(source.start_time.as_ref()),
        filter_subject: source.filter_subject.clone(),
        external: source.external.as_ref().map(|e| ExternalStream {
            api_prefix: e.api_prefix.clone(),
            deliver_prefix: e.deliver_prefix.clone(),
        }),
        domain: source.domain.clone().unwrap_or_default(),
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

    fn sample() -> StreamConfig {
        StreamConfig {
            description: "this is a test stream".to_string(),
            subjects: vec!["foo".to_string(), "bar".to_string(), "baz.>".to_string()],
            retention: "Limits".to_string(),
            max_consumers: 2,
            max_msgs: 100,
            max_bytes: 1024,
            discard: "New".to_string(),
            discard_new_per_subject: false,
            max_age: "1h2m3s".to_string(),
            max_msgs_per_subject: -1,
            max_msg_size: -1,
            duplicates: "2m".to_string(),
            storage: "File".to_string(),
            replicas: 1,
            no_ack: false,
            placement: Some(Placement::default()),
            mirror: Some(StreamSource {
                name: "mymirror".to_string(),
                opt_start_seq: 0,
                opt_start_time: "2023-01-09T14:48:32Z".to_string(),
                external: Some(ExternalStream {
                    api_prefix: "$JS.mydomain.API,".to_string(),
                    deliver_prefix: String::new(),
                }),
                domain: "mydomain".to_string(),
                ..Default::default()
            }),
            sources: Some(Vec::new()),
            sealed: false,
            deny_delete: false,
            deny_purge: false,
            allow_rollup: false,
            re_publish: Some(RePublish::default()),
            allow_direct: false,
            mirror_direct: false,
        }
    }

    #[test]
    fn test_to_native() {
        let native = to_native("mystream", &sample()).unwrap();

        assert_eq!(native.name, "mystream");
        assert_eq!(native.description, "this is a test stream");
        assert_eq!(native.subjects, vec!["foo", "bar", "baz.>"]);
        assert_eq!(native.retention, native::RetentionPolicy::Limits);
        assert_eq!(native.max_consumers, 2);
        assert_eq!(native.max_messages, 100);
        assert_eq!(native.max_bytes, 1024);
        assert_eq!(native.discard, native::DiscardPolicy::New);
        assert_eq!(native.max_age, Duration::from_secs(3723));
        assert_eq!(native.max_messages_per_subject, -1);
        assert_eq!(native.max_message_size, -1);
        assert_eq!(native.duplicate_window, Duration::from_secs(120));
        assert_eq!(native.storage, native::StorageType::File);
        assert_eq!(native.num_replicas, 1);
        assert_eq!(native.placement, Some(native::Placement::default()));
        assert_eq!(
            native.mirror,
            Some(native::StreamSource {
                name: "mymirror".to_string(),
                start_sequence: 0,
                start_time: Some(Utc.with_ymd_and_hms(2023, 1, 9, 14, 48, 32).unwrap()),
                filter_subject: String::new(),
                external: Some(native::External {
                    api_prefix: "$JS.mydomain.API,".to_string(),
                    deliver_prefix: String::new(),
                }),
                domain: Some("mydomain".to_string()),
            })
        );
        assert_eq!(native.sources, Some(Vec::new()));
        assert_eq!(native.republish, Some(native::Republish::default()));
    }

    #[test]
    fn test_sources_and_mirror() {
        let mut config = sample();
        config.sources = Some(
            ["a", "b", "c"]
                .into_iter()
                .map(|name| StreamSource {
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect(),
        );

        let native = to_native("mystream", &config).unwrap();

        assert_eq!(native.sources.as_ref().map(Vec::len), Some(3));
        assert_eq!(
            native.mirror.and_then(|m| m.start_time),
            Some(Utc.timestamp_opt(1_673_275_712, 0).unwrap())
        );
    }

    #[test]
    fn test_empty_and_absent_sources_differ() {
        let mut absent = sample();
        absent.sources = None;

        let empty = to_native("mystream", &sample()).unwrap();
        let absent = to_native("mystream", &absent).unwrap();

        assert_eq!(empty.sources, Some(Vec::new()));
        assert_eq!(absent.sources, None);
    }

    #[test]
    fn test_domain_derives_external() {
        let source = StreamSource {
            name: "origin".to_string(),
            domain: "hub".to_string(),
            ..Default::default()
        };

        let native = source_to_native(&source).unwrap();

        assert_eq!(native.external.unwrap().api_prefix, "$JS.hub.API");
    }

    #[test]
    fn test_unknown_enum_is_rejected() {
        let mut config = sample();
        config.retention = "Forever".to_string();

        assert_matches!(
            to_native("mystream", &config),
            Err(Error::Convert(nats_provider_convert::Error::UnknownEnumValue {
                family: EnumFamily::Retention,
                ..
            }))
        );
    }

    #[test]
    fn test_bad_mirror_start_time_is_rejected() {
        let mut config = sample();
        if let Some(mirror) = config.mirror.as_mut() {
            mirror.opt_start_time = "Mon, 09 Jan 2023 14:48:32 +0000".to_string();
        }

        assert_matches!(
            to_native("mystream", &config),
            Err(Error::Convert(
                nats_provider_convert::Error::InvalidTimestamp { .. }
            ))
        );
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let mut config = sample();
        config.sources = Some(vec![StreamSource {
            name: "origin".to_string(),
            domain: "hub".to_string(),
            opt_start_time: "2023-01-09T14:48:32Z".to_string(),
            ..Default::default()
        }]);

        let first = to_native("mystream", &config).unwrap();
        let second = to_native("mystream", &config).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_from_native_round_trips() {
        let native = to_native("mystream", &sample()).unwrap();
        let spec = from_native(&native);

        assert_eq!(to_native("mystream", &spec).unwrap(), native);
        assert_eq!(spec.retention, "Limits");
        assert_eq!(spec.discard, "New");
        assert_eq!(
            spec.mirror.unwrap().opt_start_time,
            "2023-01-09T14:48:32Z"
        );
    }

    #[test]
    fn test_document_defaults() {
        let params: StreamParameters = serde_json::from_str(
            r#"{ "config": { "subjects": ["orders.>"] } }"#,
        )
        .unwrap();

        assert_eq!(params.domain, "");
        assert_eq!(params.config.retention, "Limits");
        assert_eq!(params.config.max_msgs, -1);
        assert_eq!(params.config.max_msg_size, -1);
        assert_eq!(params.config.duplicates, "2m");
        assert_eq!(params.config.replicas, 1);
        assert_eq!(params.config.sources, None);
        assert_eq!(params.config, StreamConfig {
            subjects: vec!["orders.>".to_string()],
            ..Default::default()
        });
    }

    #[test]
    fn test_set_defaults() {
        let mut config = StreamConfig {
            retention: String::new(),
            storage: String::new(),
            replicas: 0,
            max_msgs: 0,
            ..Default::default()
        };

        config.set_defaults();

        assert_eq!(config.retention, "Limits");
        assert_eq!(config.storage, "File");
        assert_eq!(config.replicas, 1);
        assert_eq!(config.max_msgs, 0);
    }
}
