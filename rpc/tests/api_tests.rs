//! API tests: requests are driven through the router with `oneshot`, plus one
//! end-to-end check over a real socket with the HTTP peer client.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use poaw_ledger::{Block, Ledger};
use poaw_messages::BlockAnnouncement;
use poaw_network::{HttpPeerClient, PeerClient};
use poaw_node::{Node, NodeConfig, ShutdownController};
use poaw_nullables::{NullOracle, NullPeerClient, Verdict};
use poaw_rpc::{router, RpcServer};
use poaw_types::{Timestamp, WorkPayload};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn node_with(config: NodeConfig, oracle: Arc<NullOracle>) -> Arc<Node> {
    Arc::new(Node::with_parts(config, oracle, Arc::new(NullPeerClient::new())).unwrap())
}

fn app() -> (Router, Arc<Node>, Arc<NullOracle>) {
    let oracle = Arc::new(NullOracle::accepting());
    let node = node_with(NodeConfig::default(), oracle.clone());
    (router(node.clone()), node, oracle)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

fn next_block(head: &Block) -> Block {
    Block::new(
        head.index + 1,
        Timestamp::new(500),
        vec![],
        head.hash,
        Some(WorkPayload::new(b"task".to_vec())),
        Some(WorkPayload::new(b"solution".to_vec())),
        "peer",
    )
}

// ---------------------------------------------------------------------------
// Chain and transactions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chain_starts_with_genesis() {
    let (app, _, _) = app();
    let (status, body) = call(&app, Method::GET, "/chain", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["length"], 1);
    assert_eq!(body["chain"][0]["index"], 0);
    assert_eq!(body["chain"][0]["previous_hash"], "0".repeat(64));
}

#[tokio::test]
async fn transaction_is_queued_with_next_index() {
    let (app, _, _) = app();
    let tx = json!({"sender": "alice", "recipient": "bob", "amount": 2.5});
    let (status, body) = call(&app, Method::POST, "/transactions", Some(tx)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["block_index"], 1);

    let (_, pending) = call(&app, Method::GET, "/transactions/pending", None).await;
    assert_eq!(pending["count"], 1);
    assert_eq!(pending["transactions"][0]["amount"], 2.5);
}

#[tokio::test]
async fn bad_transactions_are_400() {
    let (app, _, _) = app();
    let negative = json!({"sender": "alice", "recipient": "bob", "amount": -1.0});
    let (status, body) = call(&app, Method::POST, "/transactions", Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("negative"));

    let missing = json!({"sender": "alice", "amount": 1.0});
    let (status, body) = call(&app, Method::POST, "/transactions", Some(missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ---------------------------------------------------------------------------
// Mining and blocks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mine_forges_block_and_empties_pool() {
    let (app, node, _) = app();
    let tx = json!({"sender": "alice", "recipient": "bob", "amount": 1.0});
    call(&app, Method::POST, "/transactions", Some(tx)).await;

    let (status, body) = call(&app, Method::POST, "/mine", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["block"]["index"], 1);
    assert_eq!(body["block"]["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(node.pending().await.count, 0);
}

#[tokio::test]
async fn mine_with_rejected_solution_is_422() {
    let (app, node, oracle) = app();
    oracle.script([Verdict::Reject]);
    let (status, body) = call(&app, Method::POST, "/mine", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    assert_eq!(node.chain().await.length, 1);
}

#[tokio::test]
async fn oracle_failure_during_verification_is_422() {
    let (app, _, oracle) = app();
    oracle.script([Verdict::Fail("offline".into())]);
    let (status, body) = call(&app, Method::POST, "/mine", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("offline"));
}

#[tokio::test]
async fn oracle_timeout_is_503() {
    let config = NodeConfig {
        oracle_timeout_ms: 50,
        ..NodeConfig::default()
    };
    let slow = Arc::new(NullOracle::accepting());
    slow.set_solve_delay(Duration::from_millis(400));
    let app = router(node_with(config, slow));
    let (status, body) = call(&app, Method::POST, "/mine", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn pushed_block_extending_head_is_201() {
    let (app, node, _) = app();
    let genesis = node.chain().await.chain[0].clone();
    let announcement = BlockAnnouncement {
        block: next_block(&genesis),
        origin: Some("10.1.1.1:5000".into()),
    };
    let body = serde_json::to_value(&announcement).unwrap();
    let (status, resp) = call(&app, Method::POST, "/blocks", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["accepted"], true);
    assert_eq!(resp["length"], 2);

    let (_, peers) = call(&app, Method::GET, "/peers", None).await;
    assert_eq!(peers["nodes"], json!(["10.1.1.1:5000"]));
}

#[tokio::test]
async fn pushed_block_not_extending_head_is_409() {
    let (app, node, _) = app();
    let genesis = node.chain().await.chain[0].clone();
    let orphan = next_block(&next_block(&genesis));
    let body = json!({ "block": orphan });
    let (status, resp) = call(&app, Method::POST, "/blocks", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(resp["accepted"], false);
    assert!(resp["reason"].is_string());
    assert_eq!(node.chain().await.length, 1);
}

// ---------------------------------------------------------------------------
// Peers, sync, telemetry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_peers_roundtrip() {
    let (app, _, _) = app();
    let body = json!({"nodes": ["http://10.0.0.1:5000/", "10.0.0.2:5001"]});
    let (status, resp) = call(&app, Method::POST, "/peers", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["total_nodes"], json!(["10.0.0.1:5000", "10.0.0.2:5001"]));

    let (status, _) = call(&app, Method::POST, "/peers", Some(json!({"nodes": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/peers", Some(json!({"nodes": ["no-port"]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sync_reports_unreachable_peers() {
    let (app, _, _) = app();
    call(&app, Method::POST, "/peers", Some(json!({"nodes": ["10.9.9.9:5000"]}))).await;
    let (status, resp) = call(&app, Method::POST, "/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["peers_polled"], 1);
    assert_eq!(resp["unreachable"], 1);
    assert_eq!(resp["replaced"], false);
}

#[tokio::test]
async fn health_reports_length_and_peers() {
    let (app, _, _) = app();
    let (status, resp) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({"status": "ok", "length": 1, "peers": 0}));
}

#[tokio::test]
async fn metrics_follow_config_switch() {
    let (app, _, _) = app();
    let (status, _) = call(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let config = NodeConfig {
        enable_metrics: true,
        ..NodeConfig::default()
    };
    let app = router(node_with(config, Arc::new(NullOracle::accepting())));
    let (status, body) = call(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("poaw_chain_height 1"));
}

// ---------------------------------------------------------------------------
// Over the wire
// ---------------------------------------------------------------------------

#[tokio::test]
async fn peer_client_talks_to_server() {
    let node = node_with(NodeConfig::default(), Arc::new(NullOracle::accepting()));
    node.mine().await.unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let stop = ShutdownController::new();
    let server = tokio::spawn(RpcServer::new(node.clone()).serve(listener, stop.listener()));

    let client = HttpPeerClient::new(Duration::from_secs(2)).unwrap();
    let response = client.fetch_chain(&addr).await.unwrap();
    assert_eq!(response.length, 2);
    assert!(Ledger::validate(&response.chain, node.engine()));

    let head = response.chain.last().unwrap().clone();
    let announcement = BlockAnnouncement {
        block: next_block(&head),
        origin: None,
    };
    client.announce_block(&addr, &announcement).await.unwrap();
    assert_eq!(node.chain().await.length, 3);

    stop.raise();
    server.await.unwrap().unwrap();
}
