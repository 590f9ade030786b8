//! Aggregate state of one automatic scan.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::progress::ScanEvent;
use crate::types::{DiscoveredDevice, InterfaceScanResult, NetworkInterface, QueryOutcome};

pub const SERVICES_FOUND: &str = "Services found";

pub const NO_SERVICE_FOUND: &str = "No service found on any interfaces, try increasing the timeout";

/// Lifecycle of a scan. `Done` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "interface", rename_all = "camelCase")]
pub enum ScanState {
    Idle,
    Listing,
    PerInterface(usize),
    Aggregating,
    Done,
    Cancelled,
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Done | ScanState::Cancelled)
    }
}

/// Results, devices and progress of one user-initiated scan.
///
/// Written only by the orchestrator's sequential loop; front-ends read it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    state: ScanState,
    interfaces: Vec<NetworkInterface>,
    results: Vec<InterfaceScanResult>,
    devices: Vec<DiscoveredDevice>,
    progress: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    cancel: CancellationToken,
}

impl ScanSession {
    pub(crate) fn new(cancel: CancellationToken) -> Self {
        Self {
            state: ScanState::Idle,
            interfaces: Vec::new(),
            results: Vec::new(),
            devices: Vec::new(),
            progress: String::new(),
            error: None,
            started_at: Utc::now(),
            finished_at: None,
            cancel,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Interfaces enumerated at scan start.
    pub fn interfaces(&self) -> &[NetworkInterface] {
        &self.interfaces
    }

    pub fn results(&self) -> &[InterfaceScanResult] {
        &self.results
    }

    /// Devices from every successful interface, in scan order.
    pub fn devices(&self) -> &[DiscoveredDevice] {
        &self.devices
    }

    /// Latest progress line.
    pub fn progress(&self) -> &str {
        &self.progress
    }

    /// Listing failure, if the scan never got past enumeration.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn found_any(&self) -> bool {
        !self.devices.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == ScanState::Cancelled
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Final status line shown to the user.
    pub fn status_message(&self) -> &str {
        match &self.error {
            Some(reason) => reason,
            None if self.found_any() => SERVICES_FOUND,
            None => NO_SERVICE_FOUND,
        }
    }

    /// Request cancellation; honored before the next interface starts.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub(crate) fn cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn set_state(&mut self, state: ScanState) {
        self.state = state;
    }

    pub(crate) fn set_interfaces(&mut self, interfaces: Vec<NetworkInterface>) {
        self.interfaces = interfaces;
    }

    pub(crate) fn set_error(&mut self, reason: String) {
        self.error = Some(reason);
    }

    pub(crate) fn note(&mut self, event: &ScanEvent) {
        self.progress = event.message();
    }

    pub(crate) fn finish(&mut self) {
        debug_assert!(self.state.is_terminal(), "scan finished in state {:?}", self.state);
        self.finished_at = Some(Utc::now());
    }

    /// Append the result for interface `index`; on success its devices join
    /// the cumulative list.
    pub(crate) fn record(&mut self, index: usize, outcome: QueryOutcome) -> &InterfaceScanResult {
        debug_assert_eq!(index, self.results.len(), "results are recorded in order");
        debug_assert!(index < self.interfaces.len(), "one result per interface");

        let iface = &self.interfaces[index];
        let mark = outcome.mark();
        let result = InterfaceScanResult {
            interface_index: index,
            interface_name: iface.name.clone(),
            address: iface.address.clone(),
            family: iface.family,
            outcome: mark,
        };

        if mark.is_success() {
            self.devices.extend(outcome.into_devices());
        }

        self.results.push(result);
        &self.results[index]
    }
}
