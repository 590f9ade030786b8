//! mdns-scout core library
//!
//! Per-interface mDNS service discovery. Provides interface listing, isolated
//! query execution on dedicated worker units, and an orchestrator that scans
//! every interface in turn with progress reporting and cancellation. Used by
//! the `mdns-scout` CLI and any other front-end through the [`bridge`] module.

pub mod backend;
pub mod bridge;
pub mod config;
pub mod discovery;
pub mod error;
pub mod settings;
pub mod types;

#[cfg(test)]
mod testing;

pub use backend::{DiscoveryBackend, MdnsBackend};
pub use config::{ExecutorConfig, OrchestratorConfig, QueryOverrides, SearchDefaults};
pub use discovery::{
    NoopProgress, Orchestrator, QueryExecutor, ScanEvent, ScanProgressHandler, ScanSession,
    ScanState,
};
pub use error::{BackendError, CoreError, DiscoveryError, SettingsError};
pub use settings::SettingsStore;
pub use tokio_util::sync::CancellationToken;
pub use types::{
    DiscoveredDevice, DiscoveryQuery, InterfaceFamily, InterfaceScanResult, NetworkInterface,
    QueryOutcome, ScanMark,
};
