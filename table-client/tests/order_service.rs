// table-client/tests/order_service.rs
// Store and push channel against an in-process mock order service

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use table_client::{
    ClientConfig, ClientError, NetworkOrderApi, OrderApi, PushSubscription, TableNumber,
    TableOrderRecord, TableStore,
};
use tokio::sync::{broadcast, mpsc};

#[derive(Clone, Default)]
struct MockService {
    orders: Arc<Mutex<BTreeMap<i64, Vec<String>>>>,
    fail_writes: Arc<AtomicBool>,
    garbage_reads: Arc<AtomicBool>,
    push: Arc<Mutex<Option<broadcast::Sender<String>>>>,
}

impl MockService {
    fn seed(&self, table: i64, items: &[&str]) {
        self.orders
            .lock()
            .unwrap()
            .insert(table, items.iter().map(|s| s.to_string()).collect());
    }

    fn snapshot_json(&self) -> String {
        let records: Vec<TableOrderRecord> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .map(|(n, items)| TableOrderRecord {
                table_number: *n,
                orders: items.clone(),
            })
            .collect();
        serde_json::to_string(&records).unwrap()
    }

    fn push_sender(&self) -> broadcast::Sender<String> {
        self.push
            .lock()
            .unwrap()
            .get_or_insert_with(|| broadcast::channel(16).0)
            .clone()
    }

    fn broadcast_snapshot(&self) {
        let _ = self.push_sender().send(self.snapshot_json());
    }
}

async fn list_orders(State(svc): State<MockService>) -> Response {
    if svc.garbage_reads.load(Ordering::SeqCst) {
        return (StatusCode::OK, r#"{"table_number": 1}"#).into_response();
    }
    (
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        svc.snapshot_json(),
    )
        .into_response()
}

async fn save_order(State(svc): State<MockService>, Json(body): Json<serde_json::Value>) -> StatusCode {
    if svc.fail_writes.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let table = body["tableNumber"].as_i64().unwrap();
    let items: Vec<String> = serde_json::from_value(body["orders"].clone()).unwrap();
    svc.orders.lock().unwrap().insert(table, items);
    svc.broadcast_snapshot();
    StatusCode::CREATED
}

async fn clear_order(State(svc): State<MockService>, Path(table): Path<i64>) -> StatusCode {
    if svc.fail_writes.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    svc.orders.lock().unwrap().remove(&table);
    svc.broadcast_snapshot();
    StatusCode::NO_CONTENT
}

async fn push_channel(ws: WebSocketUpgrade, State(svc): State<MockService>) -> Response {
    ws.on_upgrade(move |socket| forward_snapshots(socket, svc))
}

async fn forward_snapshots(mut socket: WebSocket, svc: MockService) {
    let mut rx = svc.push_sender().subscribe();
    if socket
        .send(Message::Text(svc.snapshot_json().into()))
        .await
        .is_err()
    {
        return;
    }
    while let Ok(frame) = rx.recv().await {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            break;
        }
    }
}

async fn start_mock(svc: MockService) -> String {
    let app = Router::new()
        .route("/orders", get(list_orders).post(save_order))
        .route("/orders/{table}", delete(clear_order))
        .route("/ws", get(push_channel))
        .with_state(svc);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn items(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn network_store(base_url: &str) -> TableStore<NetworkOrderApi> {
    let config = ClientConfig::new(base_url).with_timeout(5);
    TableStore::new(config.build_api().unwrap(), config.table_count)
}

#[tokio::test]
async fn test_load_then_save_end_to_end() {
    let svc = MockService::default();
    svc.seed(3, &["Pizza"]);
    let base_url = start_mock(svc.clone()).await;
    let mut store = network_store(&base_url);

    store.load_all().await.unwrap();
    assert_eq!(store.table_count(), 16);
    assert_eq!(store.table(2), Some(&items(&["Pizza"])[..]));
    for index in (0..16).filter(|i| *i != 2) {
        assert!(store.table(index).unwrap().is_empty());
    }

    store.save_order(2, items(&["Pizza", "Burger"])).await.unwrap();
    assert_eq!(store.table(2), Some(&items(&["Pizza", "Burger"])[..]));
    assert_eq!(
        svc.orders.lock().unwrap().get(&3),
        Some(&items(&["Pizza", "Burger"]))
    );
}

#[tokio::test]
async fn test_clear_uses_table_number_path() {
    let svc = MockService::default();
    svc.seed(5, &["Steak", "Salad"]);
    svc.seed(6, &["Sushi"]);
    let base_url = start_mock(svc.clone()).await;
    let mut store = network_store(&base_url);
    store.load_all().await.unwrap();

    store.clear_order(4).await.unwrap();

    assert!(store.table(4).unwrap().is_empty());
    assert_eq!(store.table(5), Some(&items(&["Sushi"])[..]));
    assert!(!svc.orders.lock().unwrap().contains_key(&5));
}

#[tokio::test]
async fn test_server_errors_leave_state_unchanged() {
    let svc = MockService::default();
    svc.seed(1, &["Pasta"]);
    let base_url = start_mock(svc.clone()).await;
    let mut store = network_store(&base_url);
    store.load_all().await.unwrap();
    let before = store.state().clone();

    svc.fail_writes.store(true, Ordering::SeqCst);

    let err = store.save_order(0, items(&["Burger"])).await.unwrap_err();
    assert_eq!(err.to_string(), "Error saving order.");
    match err {
        ClientError::WriteFailed { source, .. } => {
            assert!(matches!(
                *source,
                ClientError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = store.clear_order(0).await.unwrap_err();
    assert_eq!(err.to_string(), "Error clearing order.");
    assert_eq!(store.state(), &before);
}

#[tokio::test]
async fn test_malformed_snapshot_keeps_last_known_state() {
    let svc = MockService::default();
    svc.seed(2, &["Pizza"]);
    let base_url = start_mock(svc.clone()).await;
    let mut store = network_store(&base_url);
    store.load_all().await.unwrap();

    svc.garbage_reads.store(true, Ordering::SeqCst);
    let err = store.load_all().await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
    assert_eq!(store.table(1), Some(&items(&["Pizza"])[..]));
}

#[tokio::test]
async fn test_unreachable_service_is_a_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut store = network_store(&format!("http://{addr}"));
    let err = store.load_all().await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
    assert!(store.state().iter().all(|t| t.is_empty()));

    let api = store.api().clone();
    assert!(api.save_order(TableNumber::from_index(0), &[]).await.is_err());
}

#[tokio::test]
async fn test_push_updates_replace_store_state() {
    let svc = MockService::default();
    svc.seed(1, &["Salad"]);
    let base_url = start_mock(svc.clone()).await;
    let config = ClientConfig::new(&base_url).with_table_count(4);
    let mut store = TableStore::new(config.build_api().unwrap(), config.table_count);

    let (tx, mut rx) = mpsc::channel(8);
    let subscription =
        PushSubscription::subscribe(&config.push_url(), config.request_timeout(), tx)
            .await
            .unwrap();
    assert!(subscription.is_active());

    // Initial frame mirrors the current snapshot
    let frame = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    store.apply_push_update(&frame).unwrap();
    assert_eq!(store.table(0), Some(&items(&["Salad"])[..]));

    // Another client changes table 4; the push overwrites every table
    svc.orders.lock().unwrap().clear();
    svc.seed(4, &["Steak"]);
    svc.broadcast_snapshot();

    let frame = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    store.apply_push_update(&frame).unwrap();
    assert!(store.table(0).unwrap().is_empty());
    assert_eq!(store.table(3), Some(&items(&["Steak"])[..]));

    subscription.shutdown().await;
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_push_subscribe_fails_without_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (tx, _rx) = mpsc::channel(1);
    let err = PushSubscription::subscribe(&format!("ws://{addr}/ws"), Duration::from_secs(5), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Push(_)));
}

#[tokio::test]
async fn test_push_subscribe_times_out_on_stalled_handshake() {
    // Accepts TCP connections but never answers the upgrade request
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stalled = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });

    let (tx, _rx) = mpsc::channel(1);
    let started = std::time::Instant::now();
    let err = PushSubscription::subscribe(
        &format!("ws://{addr}/ws"),
        Duration::from_millis(200),
        tx,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ClientError::Push(_)));
    assert!(started.elapsed() < Duration::from_secs(5));
    stalled.abort();
}
