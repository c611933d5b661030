use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How messages are retained in a stream.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    /// Messages are kept until a limit is reached.
    #[default]
    Limits,

    /// Messages are kept while there are consumers interested in them.
    Interest,

    /// Messages are removed once acknowledged by a consumer.
    #[serde(rename = "workqueue")]
    WorkQueue,
}

/// What a stream does once a limit is reached.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscardPolicy {
    /// Drop the oldest messages to make room.
    #[default]
    Old,

    /// Reject new messages.
    New,
}

/// Where a stream keeps its messages.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// On disk.
    #[default]
    File,

    /// In memory.
    Memory,
}

/// Cluster and tag placement of a stream.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Placement {
    /// Target cluster name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster: String,

    /// Server tags the stream must be placed on.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// API prefixes used to reach a stream in another account or domain.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct External {
    /// API prefix of the remote JetStream.
    #[serde(rename = "api")]
    pub api_prefix: String,

    /// Delivery prefix for pushed messages.
    #[serde(rename = "deliver", skip_serializing_if = "String::is_empty")]
    pub deliver_prefix: String,
}

/// A mirror or source of a stream.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StreamSource {
    /// Name of the origin stream.
    pub name: String,

    /// Sequence to start replicating from.
    #[serde(rename = "opt_start_seq", skip_serializing_if = "is_zero")]
    pub start_sequence: u64,

    /// Time to start replicating from.
    #[serde(rename = "opt_start_time", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Only replicate messages matching this subject.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter_subject: String,

    /// Remote API prefixes when the origin lives elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<External>,

    /// JetStream domain of the origin. Client side only: it is folded into
    /// `external` and never sent over the wire.
    #[serde(skip)]
    pub domain: Option<String>,
}

/// Re-publish stored messages to another subject.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Republish {
    /// Source subject filter.
    #[serde(rename = "src")]
    pub source: String,

    /// Destination subject.
    #[serde(rename = "dest")]
    pub destination: String,

    /// Only republish headers.
    #[serde(skip_serializing_if = "is_false")]
    pub headers_only: bool,
}

/// Native stream configuration as accepted by `STREAM.CREATE` / `STREAM.UPDATE`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Stream name.
    pub name: String,

    /// Free text description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Subjects the stream listens on.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,

    /// Retention policy.
    pub retention: RetentionPolicy,

    /// Maximum number of consumers, `-1` for unlimited.
    pub max_consumers: i64,

    /// Maximum number of messages, `-1` for unlimited.
    #[serde(rename = "max_msgs")]
    pub max_messages: i64,

    /// Maximum total size in bytes, `-1` for unlimited.
    pub max_bytes: i64,

    /// Discard policy.
    pub discard: DiscardPolicy,

    /// Apply `DiscardPolicy::New` per subject.
    #[serde(skip_serializing_if = "is_false")]
    pub discard_new_per_subject: bool,

    /// Maximum message age, zero for unlimited.
    #[serde(with = "crate::nanos")]
    pub max_age: Duration,

    /// Maximum messages per subject, `-1` for unlimited.
    #[serde(rename = "max_msgs_per_subject")]
    pub max_messages_per_subject: i64,

    /// Maximum size of a single message, `-1` for unlimited.
    #[serde(rename = "max_msg_size")]
    pub max_message_size: i32,

    /// Storage backend.
    pub storage: StorageType,

    /// Number of replicas.
    pub num_replicas: i32,

    /// Disable publish acknowledgements.
    #[serde(skip_serializing_if = "is_false")]
    pub no_ack: bool,

    /// Window used for duplicate detection.
    #[serde(with = "crate::nanos", skip_serializing_if = "crate::nanos::is_zero")]
    pub duplicate_window: Duration,

    /// Placement constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,

    /// Stream this stream mirrors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror: Option<StreamSource>,

    /// Streams this stream sources from. `Some(vec![])` and `None` are kept
    /// apart in memory but share one wire form, as on the server.
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub sources: Option<Vec<StreamSource>>,

    /// Refuse all further changes.
    #[serde(skip_serializing_if = "is_false")]
    pub sealed: bool,

    /// Refuse message deletion.
    #[serde(skip_serializing_if = "is_false")]
    pub deny_delete: bool,

    /// Refuse purges.
    #[serde(skip_serializing_if = "is_false")]
    pub deny_purge: bool,

    /// Allow `Nats-Rollup` headers.
    #[serde(rename = "allow_rollup_hdrs", skip_serializing_if = "is_false")]
    pub allow_rollup: bool,

    /// Re-publish rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub republish: Option<Republish>,

    /// Allow direct get.
    pub allow_direct: bool,

    /// Allow direct get on mirrors.
    pub mirror_direct: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            subjects: Vec::new(),
            retention: RetentionPolicy::default(),
            max_consumers: -1,
            max_messages: -1,
            max_bytes: -1,
            discard: DiscardPolicy::default(),
            discard_new_per_subject: false,
            max_age: Duration::ZERO,
            max_messages_per_subject: -1,
            max_message_size: -1,
            storage: StorageType::default(),
            num_replicas: 1,
            no_ack: false,
            duplicate_window: Duration::ZERO,
            placement: None,
            mirror: None,
            sources: None,
            sealed: false,
            deny_delete: false,
            deny_purge: false,
            allow_rollup: false,
            republish: None,
            allow_direct: false,
            mirror_direct: false,
        }
    }
}

/// Runtime state of a stream.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StreamState {
    /// Number of stored messages.
    pub messages: u64,

    /// Total stored bytes.
    pub bytes: u64,

    /// First sequence in the stream.
    #[serde(rename = "first_seq")]
    pub first_sequence: u64,

    /// Time of the first message.
    #[serde(rename = "first_ts", skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<DateTime<Utc>>,

    /// Last sequence in the stream.
    #[serde(rename = "last_seq")]
    pub last_sequence: u64,

    /// Time of the last message.
    #[serde(rename = "last_ts", skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<DateTime<Utc>>,

    /// Deleted sequences inside the stream.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<u64>,

    /// Number of deleted messages.
    pub num_deleted: i64,

    /// Number of distinct subjects.
    #[serde(rename = "num_subjects")]
    pub subjects: u64,

    /// Number of attached consumers.
    #[serde(rename = "consumer_count")]
    pub consumers: u64,
}

/// A peer that participates in a replicated stream or consumer.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PeerInfo {
    /// Server name of the peer.
    pub name: String,

    /// Whether the peer is up to date.
    pub current: bool,

    /// Whether the peer is offline.
    #[serde(skip_serializing_if = "is_false")]
    pub offline: bool,

    /// Time since the peer was last seen.
    #[serde(with = "crate::nanos")]
    pub active: Duration,

    /// Operations the peer is behind by.
    #[serde(skip_serializing_if = "is_zero")]
    pub lag: u64,
}

/// Raft group information.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ClusterInfo {
    /// Cluster name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Current leader.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub leader: String,

    /// Followers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replicas: Vec<PeerInfo>,
}

/// Response of `STREAM.INFO`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StreamInfo {
    /// Configuration as stored by the server.
    pub config: StreamConfig,

    /// Creation time.
    pub created: DateTime<Utc>,

    /// Runtime state.
    #[serde(default)]
    pub state: StreamState,

    /// Cluster information, absent on single servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterInfo>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[allow(clippy::ref_option)]
fn is_none_or_empty(sources: &Option<Vec<StreamSource>>) -> bool {
    sources.as_ref().is_none_or(Vec::is_empty)
}
