//! In-memory worker client for unit tests.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::load_balancer::Instance;
use crate::upstream::{Payload, UpstreamError, WorkerClient};

/// How a scripted worker answers.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Echo the forwarded payload back.
    Echo,
    /// Answer with a fixed JSON value.
    Json(Value),
    /// Fail with the given status.
    Status(u16),
    /// Fail as if the deadline elapsed.
    Timeout,
    /// Never answer.
    Stall,
}

/// Answers per instance from a script; unknown instances time out.
#[derive(Debug, Default)]
pub(crate) struct ScriptedClient {
    forward: DashMap<Instance, Reply>,
    health: DashMap<Instance, Reply>,
    forward_calls: AtomicUsize,
    health_calls: AtomicUsize,
    forwarded_to: Mutex<Vec<Instance>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_forward(self, instance: &Instance, reply: Reply) -> Self {
        self.forward.insert(instance.clone(), reply);
        self
    }

    pub(crate) fn on_health(self, instance: &Instance, reply: Reply) -> Self {
        self.health.insert(instance.clone(), reply);
        self
    }

    pub(crate) fn forward_calls(&self) -> usize {
        self.forward_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    /// Instances in the order they were forwarded to.
    pub(crate) fn forwarded_to(&self) -> Vec<Instance> {
        self.forwarded_to.lock().unwrap().clone()
    }

    fn answer(reply: Option<Reply>, payload: Option<&Payload>) -> Result<Value, UpstreamError> {
        match reply {
            Some(Reply::Echo) => Ok(Value::Object(payload.cloned().unwrap_or_default())),
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Status(code)) => Err(UpstreamError::Status(code)),
            Some(Reply::Timeout) | Some(Reply::Stall) | None => Err(UpstreamError::Timeout(Duration::from_secs(5))),
        }
    }
}

#[async_trait]
impl WorkerClient for ScriptedClient {
    async fn forward(&self, instance: &Instance, payload: &Payload) -> Result<Payload, UpstreamError> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        self.forwarded_to.lock().unwrap().push(instance.clone());
        let reply = self.forward.get(instance).map(|r| r.value().clone());
        if let Some(Reply::Stall) = reply {
            std::future::pending::<()>().await;
        }
        match Self::answer(reply, Some(payload))? {
            Value::Object(map) => Ok(map),
            other => Err(UpstreamError::Decode(format!("expected object, got {}", other))),
        }
    }

    async fn health(&self, instance: &Instance) -> Result<Value, UpstreamError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.health.get(instance).map(|r| r.value().clone());
        Self::answer(reply, None)
    }
}
