//! Single-interface and automatic all-interface discovery.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::executor::{QueryExecutor, QueryWorker};
use super::lister::InterfaceLister;
use super::progress::{ScanEvent, ScanProgressHandler};
use super::session::{ScanSession, ScanState};
use crate::backend::DiscoveryBackend;
use crate::config::{OrchestratorConfig, QueryOverrides, SearchDefaults};
use crate::error::DiscoveryError;
use crate::types::{DiscoveryQuery, NetworkInterface, QueryOutcome};

/// Drives discovery for the presentation layer.
///
/// Owns the lister, the executor, the current search defaults and the last
/// automatic scan session. Nothing here ever returns an error to the caller:
/// failures end up in outcomes or in the session.
pub struct Orchestrator {
    lister: InterfaceLister,
    executor: QueryExecutor,
    defaults: SearchDefaults,
    session: Option<ScanSession>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn DiscoveryBackend>, config: OrchestratorConfig) -> Self {
        let executor = QueryExecutor::for_backend(Arc::clone(&backend), config.executor);
        Self::assemble(backend, executor, config.defaults)
    }

    /// Orchestrator whose units run `worker` instead of a plain backend search.
    pub fn with_worker(
        backend: Arc<dyn DiscoveryBackend>,
        worker: Arc<dyn QueryWorker>,
        config: OrchestratorConfig,
    ) -> Self {
        let executor = QueryExecutor::new(worker, config.executor);
        Self::assemble(backend, executor, config.defaults)
    }

    fn assemble(
        backend: Arc<dyn DiscoveryBackend>,
        executor: QueryExecutor,
        defaults: SearchDefaults,
    ) -> Self {
        Self {
            lister: InterfaceLister::new(backend),
            executor,
            defaults,
            session: None,
        }
    }

    pub fn defaults(&self) -> &SearchDefaults {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: SearchDefaults) {
        self.defaults = defaults;
    }

    /// Last automatic scan, if one has run since construction or reset.
    pub fn session(&self) -> Option<&ScanSession> {
        self.session.as_ref()
    }

    pub async fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, DiscoveryError> {
        self.lister.list_interfaces().await
    }

    /// Query a single interface with the current defaults and `overrides`.
    pub async fn discover_single(
        &self,
        iface: &NetworkInterface,
        overrides: &QueryOverrides,
    ) -> QueryOutcome {
        let query = self.defaults.query_for(&iface.address, overrides);
        info!(interface = %iface.name, address = %query.interface_address, "single interface search");
        self.executor.run_query(query).await
    }

    /// Run a fully specified query.
    pub async fn search(&self, query: DiscoveryQuery) -> QueryOutcome {
        self.executor.run_query(query).await
    }

    /// Scan every interface in turn and aggregate what was found.
    ///
    /// Replaces any previous session. `cancel` is checked after listing and
    /// after each interface; a query already in flight always completes.
    pub async fn discover_all(
        &mut self,
        overrides: &QueryOverrides,
        progress: &dyn ScanProgressHandler,
        cancel: CancellationToken,
    ) -> &ScanSession {
        let mut session = ScanSession::new(cancel);
        emit(&mut session, progress, ScanEvent::Started);

        session.set_state(ScanState::Listing);
        emit(&mut session, progress, ScanEvent::Listing);

        let interfaces = match self.lister.list_interfaces().await {
            Ok(interfaces) => interfaces,
            Err(e) => {
                let reason = e.to_string();
                warn!(reason = %reason, "automatic scan aborted, interface listing failed");
                session.set_error(reason.clone());
                session.set_state(ScanState::Done);
                emit(&mut session, progress, ScanEvent::ListingFailed { reason });
                session.finish();
                return self.session.insert(session);
            }
        };

        let total = interfaces.len();
        info!(interfaces = total, "automatic scan started");
        session.set_interfaces(interfaces);
        emit(&mut session, progress, ScanEvent::InterfacesFound { count: total });

        if session.cancel_requested() {
            self.cancel_scan(&mut session, progress);
        } else {
            for index in 0..total {
                session.set_state(ScanState::PerInterface(index));
                let iface = session.interfaces()[index].clone();
                emit(
                    &mut session,
                    progress,
                    ScanEvent::Searching {
                        index,
                        interface: iface.clone(),
                    },
                );

                let query = self.defaults.query_for(&iface.address, overrides);
                let outcome = self.executor.run_query(query).await;
                if let QueryOutcome::Failure { reason } = &outcome {
                    debug!(index, interface = %iface.name, reason = %reason, "interface search failed");
                }

                let result = session.record(index, outcome).clone();
                emit(&mut session, progress, ScanEvent::InterfaceDone { result });

                if session.cancel_requested() {
                    self.cancel_scan(&mut session, progress);
                    break;
                }
            }
        }

        let found_any = session.found_any();
        if !session.is_cancelled() {
            session.set_state(ScanState::Aggregating);
            session.set_state(ScanState::Done);
        }
        emit(&mut session, progress, ScanEvent::Finished { found_any });
        session.finish();

        info!(
            succeeded = session.succeeded(),
            failed = session.failed(),
            devices = session.devices().len(),
            cancelled = session.is_cancelled(),
            "automatic scan finished"
        );

        self.session.insert(session)
    }

    /// Drop the session and restore the built-in search defaults.
    pub fn reset(&mut self) {
        self.session = None;
        self.defaults = SearchDefaults::default();
        debug!("orchestrator reset");
    }

    fn cancel_scan(&self, session: &mut ScanSession, progress: &dyn ScanProgressHandler) {
        let completed = session.results().len();
        let total = session.interfaces().len();
        info!(completed, total, "automatic scan cancelled");
        session.set_state(ScanState::Cancelled);
        emit(session, progress, ScanEvent::Cancelled { completed, total });
    }
}

fn emit(session: &mut ScanSession, progress: &dyn ScanProgressHandler, event: ScanEvent) {
    session.note(&event);
    progress.on_event(&event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::config::SENTINEL_INTERFACE_ADDRESS;
    use crate::discovery::executor::WorkerPort;
    use crate::discovery::progress::NoopProgress;
    use crate::discovery::session::{NO_SERVICE_FOUND, SERVICES_FOUND};
    use crate::testing::{device, iface, Reply, ScriptedBackend};
    use crate::types::{InterfaceFamily, ScanMark};

    /// Records every event and cancels the token after `cancel_after` results.
    struct Recorder {
        events: Mutex<Vec<ScanEvent>>,
        cancel: Option<(usize, CancellationToken)>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
                cancel: None,
            }
        }

        fn cancelling_after(index: usize, token: CancellationToken) -> Self {
            Self {
                events: Mutex::new(Vec::new()),
                cancel: Some((index, token)),
            }
        }

        fn messages(&self) -> Vec<String> {
            self.events.lock().unwrap().iter().map(ScanEvent::message).collect()
        }
    }

    impl ScanProgressHandler for Recorder {
        fn on_event(&self, event: &ScanEvent) {
            if let (ScanEvent::InterfaceDone { result }, Some((index, token))) = (event, &self.cancel) {
                if result.interface_index == *index {
                    token.cancel();
                }
            }
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn orchestrator(backend: ScriptedBackend) -> Orchestrator {
        Orchestrator::new(Arc::new(backend), OrchestratorConfig::default())
    }

    fn three_interfaces() -> Vec<NetworkInterface> {
        vec![
            iface("eth0", "10.0.0.2"),
            iface("eth1", "10.0.1.2"),
            iface("wlan0", "192.168.1.20"),
        ]
    }

    #[tokio::test]
    async fn test_single_device_found() {
        let backend = ScriptedBackend::new(vec![iface("eth0", "10.0.0.2")])
            .reply("10.0.0.2", Reply::Devices(vec![device("Dev1", "10.0.0.5")]));
        let mut orch = orchestrator(backend);

        let session = orch
            .discover_all(&QueryOverrides::default(), &NoopProgress, CancellationToken::new())
            .await;

        assert_eq!(session.status_message(), SERVICES_FOUND);
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].outcome, ScanMark::Success);
        assert_eq!(session.devices()[0].mac(), Some("AA:BB"));
        assert_eq!(session.state(), ScanState::Done);
    }

    #[tokio::test]
    async fn test_no_interfaces() {
        let mut orch = orchestrator(ScriptedBackend::new(vec![]));

        let session = orch
            .discover_all(&QueryOverrides::default(), &NoopProgress, CancellationToken::new())
            .await;

        assert_eq!(session.status_message(), NO_SERVICE_FOUND);
        assert!(session.results().is_empty());
        assert_eq!(session.state(), ScanState::Done);
    }

    #[tokio::test]
    async fn test_failed_query_marks_fail() {
        let backend = ScriptedBackend::new(vec![iface("eth0", "10.0.0.2")])
            .reply("10.0.0.2", Reply::Error("timeout".to_string()));
        let mut orch = orchestrator(backend);

        let session = orch
            .discover_all(&QueryOverrides::default(), &NoopProgress, CancellationToken::new())
            .await;

        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].outcome, ScanMark::Fail);
        assert_eq!(session.status_message(), NO_SERVICE_FOUND);
    }

    #[tokio::test]
    async fn test_unit_exit_without_message() {
        let worker = |_query: DiscoveryQuery, _port: WorkerPort| 1;
        let orch = Orchestrator::with_worker(
            Arc::new(ScriptedBackend::new(vec![])),
            Arc::new(worker),
            OrchestratorConfig::default(),
        );

        let outcome = orch
            .discover_single(&iface("eth0", "10.0.0.2"), &QueryOverrides::default())
            .await;
        assert_eq!(outcome, QueryOutcome::failure("Worker stopped with exit code 1"));
    }

    #[tokio::test]
    async fn test_one_result_per_interface_in_order() {
        let backend = ScriptedBackend::new(three_interfaces())
            .reply("10.0.0.2", Reply::Devices(vec![device("A", "10.0.0.5")]))
            .reply("10.0.1.2", Reply::Panic("boom".to_string()))
            .reply("192.168.1.20", Reply::Devices(vec![]));
        let mut orch = orchestrator(backend);

        let session = orch
            .discover_all(&QueryOverrides::default(), &NoopProgress, CancellationToken::new())
            .await;

        let indices: Vec<usize> = session.results().iter().map(|r| r.interface_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let marks: Vec<ScanMark> = session.results().iter().map(|r| r.outcome).collect();
        assert_eq!(marks, vec![ScanMark::Success, ScanMark::Fail, ScanMark::Fail]);
        assert_eq!(session.devices().len(), 1);
        assert_eq!(session.status_message(), SERVICES_FOUND);
    }

    #[tokio::test]
    async fn test_progress_sequence() {
        let backend = ScriptedBackend::new(vec![iface("eth0", "10.0.0.2")])
            .reply("10.0.0.2", Reply::Devices(vec![device("Dev1", "10.0.0.5")]));
        let mut orch = orchestrator(backend);
        let recorder = Recorder::new();

        let session = orch
            .discover_all(&QueryOverrides::default(), &recorder, CancellationToken::new())
            .await;

        assert_eq!(
            recorder.messages(),
            vec![
                "Automatic Search Initiated ..",
                "Searching for Available interfaces..",
                "Interfaces found (1)",
                "Searching service on interface 1: eth0 IP:10.0.0.2",
                "Interface 1 (eth0): ✅",
                "Service search complete",
            ]
        );
        assert_eq!(session.progress(), "Service search complete");
    }

    #[tokio::test]
    async fn test_listing_failure_records_error() {
        let mut orch = orchestrator(ScriptedBackend::failing_listing("no netlink"));
        let recorder = Recorder::new();

        let session = orch
            .discover_all(&QueryOverrides::default(), &recorder, CancellationToken::new())
            .await;

        assert_eq!(session.state(), ScanState::Done);
        assert_eq!(session.error(), Some("mDNS error: no netlink"));
        assert_eq!(session.status_message(), "mDNS error: no netlink");
        assert!(session.results().is_empty());
        assert!(recorder
            .messages()
            .contains(&"mDNS error: no netlink".to_string()));
    }

    #[tokio::test]
    async fn test_cancel_during_iteration_keeps_earlier_results() {
        let backend = ScriptedBackend::new(three_interfaces())
            .reply("10.0.0.2", Reply::Devices(vec![device("A", "10.0.0.5")]))
            .reply("10.0.1.2", Reply::Devices(vec![device("B", "10.0.1.5")]));
        let backend = Arc::new(backend);
        let mut orch = Orchestrator::new(backend.clone(), OrchestratorConfig::default());
        let token = CancellationToken::new();
        let recorder = Recorder::cancelling_after(1, token.clone());

        let session = orch
            .discover_all(&QueryOverrides::default(), &recorder, token)
            .await;

        assert_eq!(session.state(), ScanState::Cancelled);
        assert_eq!(session.results().len(), 2);
        assert_eq!(session.devices().len(), 2);
        assert_eq!(session.status_message(), SERVICES_FOUND);
        assert_eq!(backend.queries().len(), 2);
        assert!(recorder
            .messages()
            .contains(&"Scan cancelled after 2 of 3 interface(s)".to_string()));
    }

    #[tokio::test]
    async fn test_cancel_before_scan_runs_no_queries() {
        let backend = Arc::new(ScriptedBackend::new(three_interfaces()));
        let mut orch = Orchestrator::new(backend.clone(), OrchestratorConfig::default());
        let token = CancellationToken::new();
        token.cancel();

        let session = orch
            .discover_all(&QueryOverrides::default(), &NoopProgress, token)
            .await;

        assert_eq!(session.state(), ScanState::Cancelled);
        assert!(session.results().is_empty());
        assert_eq!(session.interfaces().len(), 3);
        assert!(backend.queries().is_empty());
    }

    #[tokio::test]
    async fn test_overrides_reach_queries() {
        let backend = Arc::new(ScriptedBackend::new(vec![iface("eth0", "10.0.0.2")]));
        let mut orch = Orchestrator::new(backend.clone(), OrchestratorConfig::default());
        let overrides = QueryOverrides {
            timeout_ms: Some(7000),
            ..Default::default()
        };

        orch.discover_all(&overrides, &NoopProgress, CancellationToken::new())
            .await;

        let queries = backend.queries();
        assert_eq!(queries[0].timeout_ms, 7000);
        assert_eq!(queries[0].service_query, "_smart_ip._tcp");
        assert_eq!(queries[0].interface_address, "10.0.0.2");
    }

    #[tokio::test]
    async fn test_single_uses_sentinel_for_empty_address() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let orch = Orchestrator::new(backend.clone(), OrchestratorConfig::default());

        orch.discover_single(
            &NetworkInterface::new("tun0", "", InterfaceFamily::Ipv4),
            &QueryOverrides::default(),
        )
        .await;

        assert_eq!(backend.queries()[0].interface_address, SENTINEL_INTERFACE_ADDRESS);
    }

    #[tokio::test]
    async fn test_search_runs_query_as_given() {
        let backend = Arc::new(
            ScriptedBackend::new(vec![])
                .reply("10.9.9.9", Reply::Devices(vec![device("Dev1", "10.9.9.10")])),
        );
        let orch = Orchestrator::new(backend.clone(), OrchestratorConfig::default());
        let query = DiscoveryQuery {
            multicast_address: "ff02::fb".to_string(),
            multicast_port: 5353,
            interface_address: "10.9.9.9".to_string(),
            service_query: "_http._tcp".to_string(),
            timeout_ms: 10,
        };

        let outcome = orch.search(query.clone()).await;

        assert_eq!(outcome.devices().len(), 1);
        assert_eq!(backend.queries(), vec![query]);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let mut orch = orchestrator(ScriptedBackend::new(vec![iface("eth0", "10.0.0.2")]));
        orch.set_defaults(SearchDefaults {
            timeout_ms: 9000,
            ..Default::default()
        });
        orch.discover_all(&QueryOverrides::default(), &NoopProgress, CancellationToken::new())
            .await;
        assert!(orch.session().is_some());

        orch.reset();
        assert!(orch.session().is_none());
        assert_eq!(orch.defaults(), &SearchDefaults::default());

        // Idempotent.
        orch.reset();
        assert_eq!(orch.defaults(), &SearchDefaults::default());
    }

    #[tokio::test]
    async fn test_reset_ignores_construction_defaults() {
        let saved = SearchDefaults {
            timeout_ms: 9000,
            service_query: "_http._tcp".to_string(),
            ..Default::default()
        };
        let mut orch = Orchestrator::new(
            Arc::new(ScriptedBackend::new(vec![iface("eth0", "10.0.0.2")])),
            OrchestratorConfig {
                defaults: saved.clone(),
                ..Default::default()
            },
        );
        assert_eq!(orch.defaults(), &saved);

        orch.discover_all(&QueryOverrides::default(), &NoopProgress, CancellationToken::new())
            .await;
        orch.reset();

        assert!(orch.session().is_none());
        assert_eq!(orch.defaults(), &SearchDefaults::default());
        assert_eq!(orch.defaults().timeout_ms, 3000);
        assert_eq!(orch.defaults().service_query, "_smart_ip._tcp");
        assert_eq!(orch.defaults().multicast_address, "224.0.0.251");
        assert_eq!(orch.defaults().multicast_port, 5353);
    }

    #[tokio::test]
    async fn test_new_scan_replaces_session() {
        let backend = ScriptedBackend::new(vec![iface("eth0", "10.0.0.2")])
            .reply("10.0.0.2", Reply::Devices(vec![device("Dev1", "10.0.0.5")]));
        let mut orch = orchestrator(backend);

        orch.discover_all(&QueryOverrides::default(), &NoopProgress, CancellationToken::new())
            .await;
        let session = orch
            .discover_all(&QueryOverrides::default(), &NoopProgress, CancellationToken::new())
            .await;

        assert_eq!(session.results().len(), 1);
        assert_eq!(session.devices().len(), 1);
    }
}
