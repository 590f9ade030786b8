//! Seam to the external discovery library.
//!
//! The orchestration layer never speaks mDNS itself; it drives an
//! implementation of [`DiscoveryBackend`]. Both calls block and are only ever
//! invoked off the async runtime (a blocking task or a worker thread).

pub mod mdns;

pub use mdns::MdnsBackend;

use crate::error::BackendError;
use crate::types::{DiscoveredDevice, DiscoveryQuery, NetworkInterface};

/// Interface listing and service search primitives.
pub trait DiscoveryBackend: Send + Sync + 'static {
    /// Current set of usable network interfaces, in the library's order.
    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, BackendError>;

    /// Run one service search. Expected to return within `query.timeout_ms`.
    fn search_services(&self, query: &DiscoveryQuery) -> Result<Vec<DiscoveredDevice>, BackendError>;
}
