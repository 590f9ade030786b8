//! Progress reporting for automatic scans.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::types::{InterfaceScanResult, NetworkInterface};

/// Events emitted by [`Orchestrator::discover_all`](super::Orchestrator::discover_all),
/// strictly in interface-enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ScanEvent {
    Started,
    Listing,
    InterfacesFound {
        count: usize,
    },
    ListingFailed {
        reason: String,
    },
    Searching {
        index: usize,
        interface: NetworkInterface,
    },
    InterfaceDone {
        result: InterfaceScanResult,
    },
    Cancelled {
        completed: usize,
        total: usize,
    },
    Finished {
        found_any: bool,
    },
}

impl ScanEvent {
    /// Human-readable progress line for this event.
    pub fn message(&self) -> String {
        match self {
            ScanEvent::Started => "Automatic Search Initiated ..".to_string(),
            ScanEvent::Listing => "Searching for Available interfaces..".to_string(),
            ScanEvent::InterfacesFound { count } => format!("Interfaces found ({})", count),
            ScanEvent::ListingFailed { reason } => reason.clone(),
            ScanEvent::Searching { index, interface } => format!(
                "Searching service on interface {}: {} IP:{}",
                index + 1,
                interface.name,
                interface.address
            ),
            ScanEvent::InterfaceDone { result } => format!(
                "Interface {} ({}): {}",
                result.interface_index + 1,
                result.interface_name,
                result.outcome.symbol()
            ),
            ScanEvent::Cancelled { completed, total } => {
                format!("Scan cancelled after {} of {} interface(s)", completed, total)
            }
            ScanEvent::Finished { .. } => "Service search complete".to_string(),
        }
    }
}

/// Receives scan progress.
///
/// The CLI drives a spinner from it; other front-ends can use the channel impl.
pub trait ScanProgressHandler: Send + Sync {
    fn on_event(&self, event: &ScanEvent);
}

/// No-op handler for when progress isn't needed.
pub struct NoopProgress;

impl ScanProgressHandler for NoopProgress {
    fn on_event(&self, _event: &ScanEvent) {}
}

impl ScanProgressHandler for mpsc::UnboundedSender<ScanEvent> {
    fn on_event(&self, event: &ScanEvent) {
        let _ = self.send(event.clone());
    }
}
