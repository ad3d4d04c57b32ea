//! JSON shapes returned by `nsqlookupd` and `nsqd`.
//!
//! Only the fields the dashboard consumes are modelled; everything else in
//! the responses is ignored. Lists that the server may send as `null` are
//! decoded as empty, and missing names or counters decode as their defaults so
//! one odd entry never costs a node its whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Response body of `GET <lookupd>/nodes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub producers: Vec<Producer>,
}

/// A data node as advertised by a registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Producer {
    #[serde(default)]
    pub broadcast_address: String,
    #[serde(default)]
    pub http_port: u16,
}

/// Normalized statistics payload of a single `nsqd`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<TopicStats>,
}

/// Per-topic statistics.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopicStats {
    #[serde(default)]
    pub topic_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: Vec<ChannelStats>,
}

/// Per-channel statistics as reported by one node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChannelStats {
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub depth: u64,
    #[serde(default)]
    pub backend_depth: u64,
    #[serde(default)]
    pub in_flight_count: u64,
    #[serde(default)]
    pub message_count: u64,
}

/// Raw `/stats?format=json` body before shape selection.
///
/// Older `nsqd` releases put `topics` at the top level; newer ones wrap the
/// whole payload in a `data` object.
#[derive(Debug, Deserialize)]
pub struct StatsEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    topics: Vec<TopicStats>,
    #[serde(default)]
    data: Option<Value>,
}

/// Which response layout a node used.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsShape {
    /// `topics` at the top level.
    Flat(StatsPayload),
    /// Payload wrapped under a non-empty `data` object.
    Nested(StatsPayload),
}

impl StatsEnvelope {
    /// Pick the payload: a non-empty `data` object wins over top-level fields.
    pub fn select(self) -> Result<StatsShape, serde_json::Error> {
        match self.data {
            Some(Value::Object(map)) if !map.is_empty() => {
                let payload = serde_json::from_value(Value::Object(map))?;
                Ok(StatsShape::Nested(payload))
            }
            _ => Ok(StatsShape::Flat(StatsPayload {
                topics: self.topics,
            })),
        }
    }
}

impl StatsShape {
    pub fn into_payload(self) -> StatsPayload {
        match self {
            StatsShape::Flat(payload) | StatsShape::Nested(payload) => payload,
        }
    }
}

/// Decode a stats body in either layout.
pub fn decode_stats(body: &[u8]) -> Result<StatsShape, serde_json::Error> {
    let envelope: StatsEnvelope = serde_json::from_slice(body)?;
    envelope.select()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = r#"{
        "version": "0.3.8",
        "topics": [
            {
                "topic_name": "orders",
                "channels": [
                    {
                        "channel_name": "email",
                        "depth": 5,
                        "backend_depth": 3,
                        "in_flight_count": 2,
                        "message_count": 100
                    }
                ]
            }
        ]
    }"#;

    const NESTED: &str = r#"{
        "status_code": 200,
        "status_txt": "OK",
        "data": {
            "version": "1.2.1",
            "health": "OK",
            "topics": [
                {
                    "topic_name": "orders",
                    "channels": [
                        {
                            "channel_name": "email",
                            "depth": 5,
                            "backend_depth": 3,
                            "in_flight_count": 2,
                            "message_count": 100
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_flat_shape_detected() {
        let shape = decode_stats(FLAT.as_bytes()).unwrap();
        assert!(matches!(shape, StatsShape::Flat(_)));
        let payload = shape.into_payload();
        assert_eq!(payload.topics.len(), 1);
        assert_eq!(payload.topics[0].channels[0].backend_depth, 3);
    }

    #[test]
    fn test_nested_shape_unwrapped() {
        let shape = decode_stats(NESTED.as_bytes()).unwrap();
        assert!(matches!(shape, StatsShape::Nested(_)));
        let flat = decode_stats(FLAT.as_bytes()).unwrap().into_payload();
        assert_eq!(shape.into_payload(), flat);
    }

    #[test]
    fn test_empty_data_object_falls_back_to_flat() {
        let body = r#"{"data": {}, "topics": [{"topic_name": "t", "channels": []}]}"#;
        let shape = decode_stats(body.as_bytes()).unwrap();
        match shape {
            StatsShape::Flat(payload) => assert_eq!(payload.topics[0].topic_name, "t"),
            other => panic!("expected flat shape, got {:?}", other),
        }
    }

    #[test]
    fn test_null_lists_are_empty() {
        let body = r#"{"data": {"topics": [{"topic_name": "t", "channels": null}]}}"#;
        let payload = decode_stats(body.as_bytes()).unwrap().into_payload();
        assert!(payload.topics[0].channels.is_empty());

        let body = r#"{"data": {"topics": null, "health": "OK"}}"#;
        let payload = decode_stats(body.as_bytes()).unwrap().into_payload();
        assert!(payload.topics.is_empty());
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let body = r#"{"topics": [{"topic_name": "t", "channels": [{"channel_name": "c"}]}]}"#;
        let payload = decode_stats(body.as_bytes()).unwrap().into_payload();
        assert_eq!(payload.topics[0].channels[0], ChannelStats {
            channel_name: "c".to_string(),
            ..Default::default()
        });
    }

    #[test]
    fn test_malformed_body_is_error() {
        assert!(decode_stats(b"<html>oops</html>").is_err());
        assert!(decode_stats(br#"{"topics": "orders"}"#).is_err());
    }

    #[test]
    fn test_nameless_entries_do_not_drop_the_node() {
        let body = r#"{"topics": [
            {"topic_name": "orders", "channels": [
                {"channel_name": "email", "depth": 5},
                {"depth": 7}
            ]},
            {"channels": [{"channel_name": "audit", "depth": 1}]}
        ]}"#;
        let payload = decode_stats(body.as_bytes()).unwrap().into_payload();

        let orders = &payload.topics[0];
        assert_eq!(orders.channels[0].channel_name, "email");
        assert_eq!(orders.channels[0].depth, 5);
        assert_eq!(orders.channels[1].channel_name, "");
        assert_eq!(orders.channels[1].depth, 7);
        assert_eq!(payload.topics[1].topic_name, "");
        assert_eq!(payload.topics[1].channels[0].channel_name, "audit");
    }

    #[test]
    fn test_nodes_response() {
        let body = r#"{"producers": [
            {"remote_address": "10.0.0.1:40000", "broadcast_address": "nsqd-1", "http_port": 4151, "tcp_port": 4150}
        ]}"#;
        let nodes: NodesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(nodes.producers, vec![Producer {
            broadcast_address: "nsqd-1".to_string(),
            http_port: 4151,
        }]);

        let empty: NodesResponse = serde_json::from_str(r#"{"producers": null}"#).unwrap();
        assert!(empty.producers.is_empty());

        let partial: NodesResponse =
            serde_json::from_str(r#"{"producers": [{"http_port": 4151}, {"broadcast_address": "nsqd-2", "http_port": 4151}]}"#)
                .unwrap();
        assert_eq!(partial.producers.len(), 2);
        assert_eq!(partial.producers[1].broadcast_address, "nsqd-2");
    }
}
