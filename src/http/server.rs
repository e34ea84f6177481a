//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, limits, timeout, panics)
//! - Build the routing engine, tracker and health probe
//! - Bind server to listener and stop on shutdown

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{Request, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::health::{HealthProbe, InstanceTracker};
use crate::http::request::{parse_payload, reject_body, request_id, MakeRequestUuid};
use crate::lifecycle::Shutdown;
use crate::load_balancer::{LoadBalancerError, StrategyRegistry};
use crate::observability::metrics;
use crate::routing::{RoutingEngine, RoutingError};
use crate::upstream::{HttpWorkerClient, Payload, UpstreamError, UpstreamSettings, WorkerClient};

/// Fatal errors while assembling the server.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("strategy configuration error: {0}")]
    Strategy(#[from] LoadBalancerError),

    #[error("failed to build worker client: {0}")]
    Client(#[from] UpstreamError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RoutingEngine>,
}

/// HTTP server for the worker router.
pub struct HttpServer {
    router: Router,
    engine: Arc<RoutingEngine>,
    probe: Option<HealthProbe>,
}

impl HttpServer {
    /// Create a server that talks to workers over HTTP.
    pub fn new(config: RouterConfig) -> Result<Self, StartupError> {
        let client = HttpWorkerClient::new(UpstreamSettings::from(&config))?;
        Self::with_client(config, Arc::new(client))
    }

    /// Create a server around any worker client.
    pub fn with_client(config: RouterConfig, client: Arc<dyn WorkerClient>) -> Result<Self, StartupError> {
        let tracker = Arc::new(InstanceTracker::new());
        let registry = Arc::new(StrategyRegistry::with_builtin(tracker.clone()));
        let engine = Arc::new(RoutingEngine::new(
            registry,
            config.balancer.algorithm.clone(),
            config.balancer.instance_set(),
            tracker.clone(),
            client.clone(),
        )?);

        let probe = if config.health_check.enabled {
            Some(HealthProbe::new(
                tracker,
                client,
                Duration::from_secs(config.health_check.interval_secs),
            ))
        } else {
            tracing::info!("Health probe disabled");
            None
        };

        tracing::info!(
            strategy = %engine.strategy_name(),
            instances = engine.instances().len(),
            "Routing engine ready"
        );

        let state = AppState { engine: engine.clone() };
        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            engine,
            probe,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route("/route", post(route_handler))
            .route("/instances", get(instances_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(map_response(render_timeout))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, e.g. for driving it without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared health state of the configured instances.
    pub fn tracker(&self) -> Arc<InstanceTracker> {
        self.engine.tracker().clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(probe) = self.probe {
            tokio::spawn(probe.run(shutdown.subscribe()));
        }

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Route a JSON payload to a worker instance.
async fn route_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Payload>, RoutingError> {
    let start = Instant::now();

    let payload = match body.map_err(reject_body).and_then(|body| parse_payload(&body)) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected invalid payload");
            metrics::record_request("invalid", start);
            return Err(e);
        }
    };

    let result = state.engine.route(&payload).await;
    let outcome = match &result {
        Ok(_) => "success",
        Err(RoutingError::NoAvailableInstance(_)) => "unavailable",
        Err(_) => "error",
    };
    metrics::record_request(outcome, start);

    if let Err(e) = &result {
        tracing::error!(error = %e, "Request could not be routed");
    }
    result.map(Json)
}

#[derive(Debug, Serialize)]
struct InstanceStatus {
    url: String,
    healthy: bool,
}

#[derive(Debug, Serialize)]
struct InstancesView {
    strategy: String,
    unhealthy: usize,
    instances: Vec<InstanceStatus>,
}

/// Configured instances with their current health.
async fn instances_handler(State(state): State<AppState>) -> Json<InstancesView> {
    let tracker = state.engine.tracker();
    let instances = state
        .engine
        .instances()
        .iter()
        .map(|instance| InstanceStatus {
            url: instance.to_string(),
            healthy: !tracker.is_unhealthy(instance),
        })
        .collect();

    Json(InstancesView {
        strategy: state.engine.strategy_name(),
        unhealthy: tracker.unhealthy_count(),
        instances,
    })
}

/// Liveness of the router itself.
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP" }))
}

/// Give the timeout layer's bare 408 the error envelope.
async fn render_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!("Request timed out before routing completed");
        return RoutingError::Timeout("Request timed out before a worker responded".into()).into_response();
    }
    response
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    RoutingError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ErrorResponse;
    use crate::load_balancer::Instance;
    use crate::upstream::testing::{Reply, ScriptedClient};
    use tower::ServiceExt;

    fn config(instances: &[&str]) -> RouterConfig {
        let mut config = RouterConfig::default();
        config.balancer.instances = instances.iter().map(|s| s.to_string()).collect();
        config.health_check.enabled = false;
        config
    }

    fn post_route(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/route")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_routes_payload_to_worker() {
        let a = Instance::new("http://localhost:8081");
        let client = Arc::new(ScriptedClient::new().on_forward(&a, Reply::Echo));
        let server = HttpServer::with_client(config(&["http://localhost:8081"]), client).unwrap();

        let response = server
            .router()
            .oneshot(post_route(r#"{"game":"Mobile Legends","points":20}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body: serde_json::Value = body_json(response).await;
        assert_eq!(body, json!({"game": "Mobile Legends", "points": 20}));
    }

    #[tokio::test]
    async fn test_empty_payload_rejected_before_any_worker_call() {
        let client = Arc::new(ScriptedClient::new());
        let server = HttpServer::with_client(config(&["http://localhost:8081"]), client.clone()).unwrap();

        for body in ["", "{}"] {
            let response = server.router().oneshot(post_route(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let error: ErrorResponse = body_json(response).await;
            assert_eq!(error.code, "INVALID_REQUEST");
            assert_eq!(error.message, "Payload cannot be empty");
        }
        assert_eq!(client.forward_calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_gets_error_envelope() {
        let client = Arc::new(ScriptedClient::new());
        let mut config = config(&["http://localhost:8081"]);
        config.listener.max_body_bytes = 16;
        let server = HttpServer::with_client(config, client.clone()).unwrap();

        let response = server
            .router()
            .oneshot(post_route(r#"{"game":"Mobile Legends","points":20}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = body_json(response).await;
        assert_eq!(error.code, "INVALID_REQUEST");
        assert_eq!(error.message, "Payload exceeds the maximum allowed size");
        assert_eq!(client.forward_calls(), 0);
    }

    #[tokio::test]
    async fn test_request_deadline_gets_error_envelope() {
        let a = Instance::new("http://localhost:8081");
        let client = Arc::new(ScriptedClient::new().on_forward(&a, Reply::Stall));
        let mut config = config(&["http://localhost:8081"]);
        config.listener.request_timeout_secs = 1;
        let server = HttpServer::with_client(config, client).unwrap();

        let response = server.router().oneshot(post_route(r#"{"k":"v"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let error: ErrorResponse = body_json(response).await;
        assert_eq!(error.code, "REQUEST_TIMEOUT");
    }

    #[tokio::test]
    async fn test_all_workers_failing_is_503() {
        let client = Arc::new(ScriptedClient::new());
        let server = HttpServer::with_client(
            config(&["http://localhost:8081", "http://localhost:8082"]),
            client.clone(),
        )
        .unwrap();

        let response = server.router().oneshot(post_route(r#"{"k":"v"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let error: ErrorResponse = body_json(response).await;
        assert_eq!(error.code, "NO_AVAILABLE_INSTANCE");
        assert_eq!(client.forward_calls(), 2);
        assert_eq!(server.tracker().unhealthy_count(), 2);
    }

    #[tokio::test]
    async fn test_instances_view_reflects_tracker() {
        let client = Arc::new(ScriptedClient::new());
        let server = HttpServer::with_client(
            config(&["http://localhost:8081", "http://localhost:8082"]),
            client,
        )
        .unwrap();
        server.tracker().mark_unhealthy(&Instance::new("http://localhost:8082"));

        let request = Request::builder().uri("/instances").body(Body::empty()).unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        let view: serde_json::Value = body_json(response).await;

        assert_eq!(
            view,
            json!({
                "strategy": "roundrobin",
                "unhealthy": 1,
                "instances": [
                    {"url": "http://localhost:8081", "healthy": true},
                    {"url": "http://localhost:8082", "healthy": false},
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_router_health_is_up() {
        let server = HttpServer::with_client(config(&["http://localhost:8081"]), Arc::new(ScriptedClient::new())).unwrap();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response).await;
        assert_eq!(body, json!({"status": "UP"}));
    }

    #[test]
    fn test_panic_renders_internal_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
