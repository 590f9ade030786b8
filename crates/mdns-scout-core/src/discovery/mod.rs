//! Discovery orchestration layer.
//!
//! Lists interfaces, runs each query in an isolated worker unit and sequences
//! automatic scans across every interface with progress and cancellation.

pub mod executor;
pub mod lister;
pub mod orchestrator;
pub mod progress;
pub mod session;

pub use executor::{QueryExecutor, QueryWorker, SearchWorker, WorkerMessage, WorkerPort};
pub use lister::InterfaceLister;
pub use orchestrator::Orchestrator;
pub use progress::{NoopProgress, ScanEvent, ScanProgressHandler};
pub use session::{ScanSession, ScanState, NO_SERVICE_FOUND, SERVICES_FOUND};

use std::any::Any;

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
