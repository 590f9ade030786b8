//! Isolated query executor.
//!
//! Every query runs on its own freshly spawned OS thread (a "unit"). The unit
//! reports back over three oneshot channels:
//!
//! - message: the worker posted a [`WorkerMessage`]
//! - fault: the worker panicked
//! - exit: the worker returned without posting a message
//!
//! Whichever resolves first decides the [`QueryOutcome`]; the rest are dropped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::panic_message;
use crate::backend::DiscoveryBackend;
use crate::config::ExecutorConfig;
use crate::error::DiscoveryError;
use crate::types::{DiscoveredDevice, DiscoveryQuery, QueryOutcome};

/// Message a unit posts back to the executor.
///
/// On the wire this is `{ "success": true, "services": [...] }` or
/// `{ "success": false, "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireMessage", try_from = "WireMessage")]
pub enum WorkerMessage {
    Success { services: Vec<DiscoveredDevice> },
    Failure { message: String },
}

impl WorkerMessage {
    pub fn success(services: Vec<DiscoveredDevice>) -> Self {
        WorkerMessage::Success { services }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        WorkerMessage::Failure {
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    services: Option<Vec<DiscoveredDevice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl From<WorkerMessage> for WireMessage {
    fn from(message: WorkerMessage) -> Self {
        match message {
            WorkerMessage::Success { services } => WireMessage {
                success: true,
                services: Some(services),
                message: None,
            },
            WorkerMessage::Failure { message } => WireMessage {
                success: false,
                services: None,
                message: Some(message),
            },
        }
    }
}

impl TryFrom<WireMessage> for WorkerMessage {
    type Error = String;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        match (wire.success, wire.services, wire.message) {
            (true, Some(services), _) => Ok(WorkerMessage::Success { services }),
            (true, None, _) => Err("success message without services".to_string()),
            (false, _, message) => Ok(WorkerMessage::Failure {
                message: message.unwrap_or_default(),
            }),
        }
    }
}

impl From<WorkerMessage> for QueryOutcome {
    fn from(message: WorkerMessage) -> Self {
        match message {
            WorkerMessage::Success { services } => QueryOutcome::Success { devices: services },
            WorkerMessage::Failure { message } => QueryOutcome::Failure { reason: message },
        }
    }
}

/// The unit's end of the message channel. Consumed by the first post.
pub struct WorkerPort {
    tx: oneshot::Sender<WorkerMessage>,
}

impl WorkerPort {
    pub fn post_message(self, message: WorkerMessage) {
        // The executor may already have given up on this unit.
        let _ = self.tx.send(message);
    }
}

/// Body of an isolated unit.
///
/// Runs on the unit's own thread. The return value is the unit's exit code;
/// returning without posting a message is reported as an abnormal exit.
pub trait QueryWorker: Send + Sync + 'static {
    fn run(&self, query: DiscoveryQuery, port: WorkerPort) -> i32;
}

impl<F> QueryWorker for F
where
    F: Fn(DiscoveryQuery, WorkerPort) -> i32 + Send + Sync + 'static,
{
    fn run(&self, query: DiscoveryQuery, port: WorkerPort) -> i32 {
        self(query, port)
    }
}

/// Default unit body: one backend search, result posted as a message.
pub struct SearchWorker {
    backend: Arc<dyn DiscoveryBackend>,
}

impl SearchWorker {
    pub fn new(backend: Arc<dyn DiscoveryBackend>) -> Self {
        Self { backend }
    }
}

impl QueryWorker for SearchWorker {
    fn run(&self, query: DiscoveryQuery, port: WorkerPort) -> i32 {
        debug!(interface = %query.interface_address, "worker unit searching");

        match self.backend.search_services(&query) {
            Ok(services) => port.post_message(WorkerMessage::success(services)),
            Err(e) => port.post_message(WorkerMessage::failure(format!(
                "Error during service search: {e}"
            ))),
        }

        0
    }
}

struct UnitChannels {
    message: oneshot::Receiver<WorkerMessage>,
    fault: oneshot::Receiver<String>,
    exit: oneshot::Receiver<i32>,
}

impl UnitChannels {
    async fn race(self) -> QueryOutcome {
        let UnitChannels {
            message: message_rx,
            fault: fault_rx,
            exit: exit_rx,
        } = self;

        // A posted message is always sent before the unit exits, so checking
        // it first keeps a normal exit from shadowing it.
        tokio::select! {
            biased;
            Ok(message) = message_rx => QueryOutcome::from(message),
            Ok(reason) = fault_rx => QueryOutcome::from(DiscoveryError::WorkerFault(reason)),
            Ok(code) = exit_rx => QueryOutcome::from(DiscoveryError::AbnormalTermination(code)),
            else => QueryOutcome::from(DiscoveryError::WorkerFault(
                "unit ended without reporting".to_string(),
            )),
        }
    }
}

/// Runs one query per isolated unit and normalizes the result.
pub struct QueryExecutor {
    worker: Arc<dyn QueryWorker>,
    config: ExecutorConfig,
    next_unit: AtomicU64,
}

impl QueryExecutor {
    pub fn new(worker: Arc<dyn QueryWorker>, config: ExecutorConfig) -> Self {
        Self {
            worker,
            config,
            next_unit: AtomicU64::new(0),
        }
    }

    /// Executor whose units run [`SearchWorker`] against `backend`.
    pub fn for_backend(backend: Arc<dyn DiscoveryBackend>, config: ExecutorConfig) -> Self {
        Self::new(Arc::new(SearchWorker::new(backend)), config)
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `query` in a fresh unit. Always resolves to an outcome; exactly one
    /// attempt is made.
    ///
    /// Without a supervision grace this waits for the unit to finish, so a
    /// backend that ignores `timeout_ms` stalls the caller.
    pub async fn run_query(&self, query: DiscoveryQuery) -> QueryOutcome {
        let unit = self.next_unit.fetch_add(1, Ordering::Relaxed);
        let limit = self
            .config
            .supervision_grace
            .map(|grace| Duration::from_millis(u64::from(query.timeout_ms)) + grace);

        debug!(
            unit,
            interface = %query.interface_address,
            service = %query.service_query,
            timeout_ms = query.timeout_ms,
            "starting query unit"
        );

        let channels = match self.spawn_unit(unit, query) {
            Ok(channels) => channels,
            Err(e) => {
                warn!(unit, error = %e, "failed to spawn query unit");
                return DiscoveryError::WorkerFault(e.to_string()).into();
            }
        };

        let outcome = match limit {
            Some(limit) => match tokio::time::timeout(limit, channels.race()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(unit, limit_ms = limit.as_millis() as u64, "query unit overran, detaching");
                    DiscoveryError::Timeout(limit.as_millis() as u64).into()
                }
            },
            None => channels.race().await,
        };

        match &outcome {
            QueryOutcome::Success { devices } => {
                debug!(unit, devices = devices.len(), "query unit succeeded")
            }
            QueryOutcome::Failure { reason } => debug!(unit, reason = %reason, "query unit failed"),
        }

        outcome
    }

    fn spawn_unit(&self, unit: u64, query: DiscoveryQuery) -> std::io::Result<UnitChannels> {
        let (message_tx, message) = oneshot::channel();
        let (fault_tx, fault) = oneshot::channel();
        let (exit_tx, exit) = oneshot::channel();
        let worker = Arc::clone(&self.worker);

        // The join handle is dropped: a unit that never finishes is detached.
        thread::Builder::new()
            .name(format!("mdns-query-{unit}"))
            .spawn(move || {
                let port = WorkerPort { tx: message_tx };
                match panic::catch_unwind(AssertUnwindSafe(|| worker.run(query, port))) {
                    Ok(code) => {
                        let _ = exit_tx.send(code);
                    }
                    Err(payload) => {
                        let _ = fault_tx.send(panic_message(payload.as_ref()));
                    }
                }
            })?;

        Ok(UnitChannels {
            message,
            fault,
            exit,
        })
    }
}
