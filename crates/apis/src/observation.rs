use serde::{Deserialize, Serialize};

/// A replica as last observed.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerObservation {
    /// Server name.
    pub name: String,

    /// Whether it is caught up.
    pub current: bool,

    /// Whether it is offline.
    pub offline: bool,

    /// Time since it was last seen, e.g. `"1s200ms"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub active: String,

    /// Operations behind the leader.
    pub lag: u64,
}

/// Raft group as last observed.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterObservation {
    /// Cluster name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Current leader.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub leader: String,

    /// Followers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replicas: Vec<PeerObservation>,
}

/// Consumer and stream sequence pair as last observed.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceObservation {
    /// Consumer sequence.
    pub consumer_sequence: u64,

    /// Stream sequence.
    pub stream_sequence: u64,

    /// Last activity, RFC3339.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_active: String,
}
