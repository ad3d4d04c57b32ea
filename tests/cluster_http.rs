//! Discovery and stats fetching against local HTTP stubs.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nsqtop::{ClusterClient, ClusterError, Node, Pipeline};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Routes = Arc<Mutex<HashMap<String, (u16, String)>>>;

/// Minimal HTTP/1.1 server answering fixed bodies by request target.
struct Stub {
    addr: SocketAddr,
    routes: Routes,
    hits: Arc<AtomicUsize>,
}

impl Stub {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Routes = Arc::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let (task_routes, task_hits) = (routes.clone(), hits.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                task_hits.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(respond(stream, task_routes.clone()));
            }
        });

        Self { addr, routes, hits }
    }

    fn route(&self, target: &str, status: u16, body: serde_json::Value) {
        self.routes.lock().unwrap().insert(target.to_string(), (status, body.to_string()));
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn node(&self) -> Node {
        Node::new("127.0.0.1", self.addr.port())
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn respond(mut stream: TcpStream, routes: Routes) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let (status, body) = routes
        .lock()
        .unwrap()
        .get(&target)
        .cloned()
        .unwrap_or((404, "{}".to_string()));

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// An address nothing listens on.
async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn producers(nodes: &[Node]) -> serde_json::Value {
    let producers: Vec<serde_json::Value> = nodes
        .iter()
        .map(|n| {
            json!({
                "broadcast_address": n.address,
                "hostname": "stub",
                "tcp_port": 4150,
                "http_port": n.port,
                "version": "1.2.1"
            })
        })
        .collect();
    json!({ "producers": producers })
}

fn topics(message_count: u64) -> serde_json::Value {
    json!([{
        "topic_name": "orders",
        "channels": [{
            "channel_name": "email",
            "depth": 4,
            "backend_depth": 6,
            "in_flight_count": 2,
            "message_count": message_count,
            "clients": null
        }]
    }])
}

fn client(registries: Vec<String>) -> ClusterClient {
    ClusterClient::builder()
        .registries(registries)
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_failing_registry_does_not_hide_healthy_one() {
    let broken = Stub::start().await;
    broken.route("/nodes", 500, json!({ "message": "INTERNAL_ERROR" }));

    let healthy = Stub::start().await;
    let nsqd_1 = Node::new("nsqd-1", 4151);
    let nsqd_2 = Node::new("nsqd-2", 4151);
    healthy.route("/nodes", 200, producers(&[nsqd_1.clone(), nsqd_2.clone(), nsqd_1.clone()]));

    let nodes = client(vec![broken.url(), healthy.url()]).discover().await.unwrap();

    assert_eq!(nodes, vec![nsqd_1, nsqd_2]);
    assert_eq!(broken.hits(), 1);
}

#[tokio::test]
async fn test_all_registries_unreachable() {
    let first = closed_url().await;
    let second = closed_url().await;

    let err = client(vec![first.clone(), second.clone()]).discover().await.unwrap_err();

    let message = match err {
        ClusterError::Discovery(message) => message,
        other => panic!("expected discovery error, got {:?}", other),
    };
    let notes: Vec<&str> = message.split("; ").collect();
    assert_eq!(notes.len(), 2);
    assert!(notes[0].starts_with(&format!("Failed to connect to {}", first)));
    assert!(notes[1].starts_with(&format!("Failed to connect to {}", second)));
}

#[tokio::test]
async fn test_invalid_registry_json_is_reported() {
    let registry = Stub::start().await;
    registry.route("/nodes", 200, json!("not a node list"));

    let err = client(vec![registry.url()]).discover().await.unwrap_err();
    assert_eq!(err.to_string(), format!("Invalid JSON from {}", registry.url()));
}

#[tokio::test]
async fn test_stats_shapes_and_failed_nodes() {
    let nested = Stub::start().await;
    nested.route(
        "/stats?format=json",
        200,
        json!({ "status_code": 200, "status_txt": "OK", "data": { "topics": topics(10) } }),
    );
    let flat = Stub::start().await;
    flat.route("/stats?format=json", 200, json!({ "topics": topics(5) }));
    let garbage = Stub::start().await;
    garbage.route("/stats?format=json", 200, json!([1, 2, 3]));

    let silent = Node::new("127.0.0.1", 1);
    let nodes = vec![nested.node(), silent, flat.node(), garbage.node()];

    let stats = client(vec![]).fetch_stats(&nodes).await;

    let answered: Vec<Node> = stats.iter().map(|s| s.node.clone()).collect();
    assert_eq!(answered, vec![nested.node(), flat.node()]);
    assert_eq!(stats[0].payload.topics[0].channels[0].message_count, 10);
    assert_eq!(stats[1].payload.topics[0].channels[0].message_count, 5);
}

#[tokio::test]
async fn test_pipeline_against_stub_cluster() {
    let nsqd_1 = Stub::start().await;
    let nsqd_2 = Stub::start().await;
    let registry = Stub::start().await;
    registry.route("/nodes", 200, producers(&[nsqd_1.node(), nsqd_2.node()]));
    nsqd_1.route("/stats?format=json", 200, json!({ "topics": topics(100) }));
    nsqd_2.route("/stats?format=json", 200, json!({ "data": { "topics": topics(50) } }));

    let mut pipeline = Pipeline::new(client(vec![registry.url()]), Duration::from_secs(1));

    let first = pipeline.run_cycle().await;
    assert!(first.error.is_none());
    assert_eq!(first.nodes.len(), 2);
    assert_eq!(first.reporting_nodes(), 2);
    assert_eq!(first.channels.len(), 1);
    assert_eq!(first.channels[0].snapshot.depth, 20);
    assert_eq!(first.channels[0].snapshot.node_count, 2);
    assert!(first.channels[0].rate.is_none());

    nsqd_1.route("/stats?format=json", 200, json!({ "topics": topics(130) }));
    nsqd_2.route("/stats?format=json", 500, json!({}));
    tokio::time::sleep(Duration::from_millis(50)).await;

    // nsqd-2 drops out, so the merged count falls from 150 to 130
    let second = pipeline.run_cycle().await;
    assert_eq!(second.reporting_nodes(), 1);
    assert_eq!(second.channels[0].snapshot.message_count, 130);
    assert!(second.channels[0].rate.is_none());

    nsqd_1.route("/stats?format=json", 200, json!({ "topics": topics(160) }));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let third = pipeline.run_cycle().await;
    let rate = third.channels[0].rate.unwrap();
    assert!(rate.per_second > 0.0);
    assert!((rate.per_minute - rate.per_second * 60.0).abs() < 1e-6);
    assert_eq!(third.trend, vec![4, 2, 2]);
}

#[tokio::test]
async fn test_discovery_failure_skips_stats_fetch() {
    let nsqd = Stub::start().await;
    nsqd.route("/stats?format=json", 200, json!({ "topics": topics(1) }));
    let registry = Stub::start().await;
    registry.route("/nodes", 200, producers(&[nsqd.node()]));

    let mut pipeline = Pipeline::new(client(vec![registry.url()]), Duration::from_secs(1));
    let first = pipeline.run_cycle().await;
    assert_eq!(first.channels.len(), 1);
    assert_eq!(nsqd.hits(), 1);

    registry.route("/nodes", 503, json!({}));
    let failed = pipeline.run_cycle().await;

    assert_eq!(
        failed.error.as_deref(),
        Some(format!("{}/nodes returned status 503", registry.url()).as_str())
    );
    // previous view stays up, no new stats request went out
    assert_eq!(failed.channels.len(), 1);
    assert_eq!(failed.trend, vec![2]);
    assert_eq!(nsqd.hits(), 1);
}

#[tokio::test]
async fn test_nameless_channel_keeps_node_reporting() {
    let nsqd = Stub::start().await;
    nsqd.route(
        "/stats?format=json",
        200,
        json!({ "topics": [{
            "topic_name": "orders",
            "channels": [
                { "channel_name": "email", "depth": 5 },
                { "depth": 7 }
            ]
        }] }),
    );

    let stats = client(vec![]).fetch_stats(&[nsqd.node()]).await;

    assert_eq!(stats.len(), 1);
    let channels = &stats[0].payload.topics[0].channels;
    assert_eq!(channels[0].channel_name, "email");
    assert_eq!(channels[0].depth, 5);
    assert_eq!(channels[1].depth, 7);
}
