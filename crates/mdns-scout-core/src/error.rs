//! Error types for mdns-scout core.

use thiserror::Error;

/// Errors a front-end can receive from the core.
///
/// Backend faults never surface here; the lister and executor turn them into
/// [`DiscoveryError`]s or failure outcomes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Faults raised by the external discovery library.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to enumerate interfaces: {0}")]
    Interfaces(#[from] std::io::Error),

    #[error("mDNS error: {0}")]
    Mdns(String),

    #[error("unsupported query: {0}")]
    Unsupported(String),
}

/// Orchestration-level faults.
///
/// The display strings are the user-visible failure reasons carried by
/// [`QueryOutcome::Failure`](crate::types::QueryOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The external library failed or panicked.
    #[error("{0}")]
    LibraryFault(String),

    /// The isolated unit panicked or could not be started.
    #[error("Worker thread error: {0}")]
    WorkerFault(String),

    /// The isolated unit exited without posting a message.
    #[error("Worker stopped with exit code {0}")]
    AbnormalTermination(i32),

    /// The supervisory deadline elapsed before the unit completed.
    #[error("Worker timed out after {0} ms")]
    Timeout(u64),
}

/// Persisted settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid setting {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}
