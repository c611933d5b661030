use bytesize::ByteSize;
use nats_provider_apis::consumer::ConsumerObservation;
use nats_provider_apis::stream::{StreamObservation, StreamStateObservation};
use nats_provider_apis::{ClusterObservation, PeerObservation, SequenceObservation};
use nats_provider_convert::{format_duration, format_timestamp};
use nats_provider_jetstream::{ClusterInfo, ConsumerInfo, PeerInfo, SequenceInfo, StreamInfo};

pub fn stream_observation(domain: &str, info: &StreamInfo) -> StreamObservation {
    let state = &info.state;

    StreamObservation {
        domain: domain.to_string(),
        state: StreamStateObservation {
            messages: state.messages,
            bytes: ByteSize::b(state.bytes).to_string(),
            first_sequence: state.first_sequence,
            first_timestamp: state
                .first_timestamp
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
            last_sequence: state.last_sequence,
            last_timestamp: state
                .last_timestamp
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
            consumer_count: state.consumers,
            deleted: state.deleted.clone(),
            num_deleted: state.num_deleted,
            subjects: state.subjects,
        },
        cluster_info: cluster_observation(info.cluster.as_ref()),
    }
}

pub fn consumer_observation(domain: &str, info: &ConsumerInfo) -> ConsumerObservation {
    ConsumerObservation {
        domain: domain.to_string(),
        stream_name: info.stream_name.clone(),
        name: info.name.clone(),
        durable_name: info.config.durable_name.clone(),
        created: format_timestamp(&info.created),
        push_bound: info.config.is_push(),
        delivered: sequence_observation(&info.delivered),
        ack_floor: sequence_observation(&info.ack_floor),
        num_ack_pending: info.num_ack_pending,
        num_redelivered: info.num_redelivered,
        num_waiting: info.num_waiting,
        num_pending: info.num_pending,
        cluster_info: cluster_observation(info.cluster.as_ref()),
    }
}

fn sequence_observation(info: &SequenceInfo) -> SequenceObservation {
    SequenceObservation {
        consumer_sequence: info.consumer_sequence,
        stream_sequence: info.stream_sequence,
        last_active: info
            .last_active
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_default(),
    }
}

fn cluster_observation(cluster: Option<&ClusterInfo>) -> ClusterObservation {
    cluster.map_or_else(ClusterObservation::default, |cluster| ClusterObservation {
        name: cluster.name.clone(),
        leader: cluster.leader.clone(),
        replicas: cluster.replicas.iter().map(peer_observation).collect(),
    })
}

fn peer_observation(peer: &PeerInfo) -> PeerObservation {
    PeerObservation {
        name: peer.name.clone(),
        current: peer.current,
        offline: peer.offline,
        active: format_duration(peer.active),
        lag: peer.lag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use nats_provider_jetstream::{ConsumerConfig, StreamConfig, StreamState};

    #[test]
    fn test_stream_observation() {
        let info = StreamInfo {
            config: StreamConfig::default(),
            created: Utc.timestamp_opt(1_673_275_712, 0).unwrap(),
            state: StreamState {
                messages: 3,
                bytes: 120,
                first_sequence: 1,
                first_timestamp: Some(Utc.timestamp_opt(1_673_275_712, 0).unwrap()),
                last_sequence: 3,
                consumers: 2,
                ..Default::default()
            },
            cluster: Some(ClusterInfo {
                name: "east".to_string(),
                leader: "n1".to_string(),
                replicas: vec![PeerInfo {
                    name: "n2".to_string(),
                    current: true,
                    active: Duration::from_millis(1500),
                    ..Default::default()
                }],
            }),
        };

        let observation = stream_observation("hub", &info);

        assert_eq!(observation.domain, "hub");
        assert_eq!(observation.state.messages, 3);
        assert_eq!(observation.state.bytes, "120 B");
        assert_eq!(observation.state.first_timestamp, "2023-01-09T14:48:32Z");
        assert_eq!(observation.state.last_timestamp, "");
        assert_eq!(observation.state.consumer_count, 2);
        assert_eq!(observation.cluster_info.leader, "n1");
        assert_eq!(observation.cluster_info.replicas[0].active, "1s500ms");
    }

    #[test]
    fn test_consumer_observation() {
        let info = ConsumerInfo {
            stream_name: "orders".to_string(),
            name: "worker".to_string(),
            created: Utc.timestamp_opt(1_673_275_712, 0).unwrap(),
            config: ConsumerConfig {
                durable_name: "worker".to_string(),
                deliver_subject: "deliver.worker".to_string(),
                ..Default::default()
            },
            delivered: SequenceInfo {
                consumer_sequence: 4,
                stream_sequence: 7,
                last_active: None,
            },
            ack_floor: SequenceInfo::default(),
            num_ack_pending: 1,
            num_redelivered: 0,
            num_waiting: 0,
            num_pending: 9,
            cluster: None,
        };

        let observation = consumer_observation("", &info);

        assert_eq!(observation.stream_name, "orders");
        assert_eq!(observation.durable_name, "worker");
        assert_eq!(observation.created, "2023-01-09T14:48:32Z");
        assert!(observation.push_bound);
        assert_eq!(observation.delivered.stream_sequence, 7);
        assert_eq!(observation.num_pending, 9);
        assert_eq!(observation.cluster_info, ClusterObservation::default());
    }
}
