//! Shared utilities for integration testing.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use worker_router::lifecycle::Shutdown;
use worker_router::{HttpServer, RouterConfig};

/// A mock worker whose behavior can be flipped while the test runs.
#[derive(Clone)]
pub struct MockWorker {
    pub addr: SocketAddr,
    pub name: &'static str,
    failing: Arc<AtomicBool>,
    up: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockWorker {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer `/process` with 500 instead of echoing.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Report `UP` (or `DOWN`) from the health endpoint.
    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn process(State(worker): State<MockWorker>, Json(mut body): Json<Map<String, Value>>) -> (StatusCode, Json<Value>) {
    worker.calls.fetch_add(1, Ordering::SeqCst);
    if worker.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"})));
    }
    body.insert("handled_by".into(), json!(worker.name));
    (StatusCode::OK, Json(Value::Object(body)))
}

async fn health(State(worker): State<MockWorker>) -> Json<Value> {
    let status = if worker.up.load(Ordering::SeqCst) { "UP" } else { "DOWN" };
    Json(json!({ "status": status }))
}

/// Start a mock worker on an ephemeral port.
pub async fn start_worker(name: &'static str) -> MockWorker {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let worker = MockWorker {
        addr: listener.local_addr().unwrap(),
        name,
        failing: Arc::new(AtomicBool::new(false)),
        up: Arc::new(AtomicBool::new(true)),
        calls: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/process", post(process))
        .route("/actuator/health", get(health))
        .with_state(worker.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    worker
}

/// Router config pointing at `workers`, with the probe off unless enabled.
pub fn router_config(workers: &[&MockWorker]) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.balancer.instances = workers.iter().map(|w| w.url()).collect();
    config.health_check.enabled = false;
    config.timeouts.request_secs = 2;
    config.timeouts.connect_secs = 1;
    config.observability.metrics_enabled = false;
    config
}

/// A running router under test.
pub struct RunningRouter {
    pub base_url: String,
    pub tracker: Arc<worker_router::InstanceTracker>,
    pub shutdown: Shutdown,
}

/// Start the router on an ephemeral port.
pub async fn start_router(config: RouterConfig) -> RunningRouter {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let tracker = server.tracker();
    let shutdown = Shutdown::new();

    tokio::spawn(server.run(listener, shutdown.clone()));
    tokio::time::sleep(Duration::from_millis(50)).await;

    RunningRouter {
        base_url: format!("http://{}", addr),
        tracker,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// An address nothing is listening on.
pub async fn unused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
