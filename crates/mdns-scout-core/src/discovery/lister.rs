//! Interface enumeration with fault normalization.

use std::sync::Arc;

use tracing::{debug, warn};

use super::panic_message;
use crate::backend::DiscoveryBackend;
use crate::error::DiscoveryError;
use crate::types::NetworkInterface;

/// Lists network interfaces through the backend.
///
/// Never lets a backend error or panic escape: both come back as
/// [`DiscoveryError::LibraryFault`].
#[derive(Clone)]
pub struct InterfaceLister {
    backend: Arc<dyn DiscoveryBackend>,
}

impl InterfaceLister {
    pub fn new(backend: Arc<dyn DiscoveryBackend>) -> Self {
        Self { backend }
    }

    /// Enumerate interfaces in the backend's order. An empty list is a success.
    pub async fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, DiscoveryError> {
        let backend = Arc::clone(&self.backend);

        match tokio::task::spawn_blocking(move || backend.list_interfaces()).await {
            Ok(Ok(interfaces)) => {
                debug!(count = interfaces.len(), "interfaces listed");
                Ok(interfaces)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "interface listing failed");
                Err(DiscoveryError::LibraryFault(e.to_string()))
            }
            Err(join_err) => {
                let reason = if join_err.is_panic() {
                    panic_message(join_err.into_panic().as_ref())
                } else {
                    join_err.to_string()
                };
                warn!(reason = %reason, "interface listing aborted");
                Err(DiscoveryError::LibraryFault(reason))
            }
        }
    }
}
