//! Search defaults, per-call overrides and constructor configuration.

use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::types::DiscoveryQuery;

/// Standard mDNS IPv4 multicast group.
pub const DEFAULT_MULTICAST_ADDRESS: &str = "224.0.0.251";

/// Standard mDNS port.
pub const DEFAULT_MULTICAST_PORT: u16 = 5353;

pub const DEFAULT_SERVICE_QUERY: &str = "_smart_ip._tcp";

pub const DEFAULT_TIMEOUT_MS: u32 = 3000;

/// Interface address used when a selected interface reports none.
pub const SENTINEL_INTERFACE_ADDRESS: &str = "169.254.137.22";

/// User-configurable search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchDefaults {
    pub multicast_address: String,
    pub multicast_port: u16,
    pub service_query: String,
    pub timeout_ms: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            multicast_address: DEFAULT_MULTICAST_ADDRESS.to_string(),
            multicast_port: DEFAULT_MULTICAST_PORT,
            service_query: DEFAULT_SERVICE_QUERY.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl SearchDefaults {
    /// Build the query for one interface, letting `overrides` win field by field.
    ///
    /// An empty `interface_address` is replaced by [`SENTINEL_INTERFACE_ADDRESS`].
    pub fn query_for(&self, interface_address: &str, overrides: &QueryOverrides) -> DiscoveryQuery {
        let interface_address = if interface_address.is_empty() {
            SENTINEL_INTERFACE_ADDRESS.to_string()
        } else {
            interface_address.to_string()
        };

        DiscoveryQuery {
            multicast_address: overrides
                .multicast_address
                .clone()
                .unwrap_or_else(|| self.multicast_address.clone()),
            multicast_port: overrides.multicast_port.unwrap_or(self.multicast_port),
            interface_address,
            service_query: overrides
                .service_query
                .clone()
                .unwrap_or_else(|| self.service_query.clone()),
            timeout_ms: overrides.timeout_ms.unwrap_or(self.timeout_ms),
        }
    }

    /// Apply overrides permanently, returning the merged defaults.
    pub fn merged(&self, overrides: &QueryOverrides) -> Self {
        let query = self.query_for("", overrides);
        Self {
            multicast_address: query.multicast_address,
            multicast_port: query.multicast_port,
            service_query: query.service_query,
            timeout_ms: query.timeout_ms,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        match self.multicast_address.parse::<IpAddr>() {
            Ok(ip) if ip.is_multicast() => {}
            Ok(_) => {
                return Err(SettingsError::Invalid {
                    field: "multicast_address",
                    message: format!("{} is not a multicast address", self.multicast_address),
                })
            }
            Err(_) => {
                return Err(SettingsError::Invalid {
                    field: "multicast_address",
                    message: format!("{} is not an IP address", self.multicast_address),
                })
            }
        }

        if self.multicast_port == 0 {
            return Err(SettingsError::Invalid {
                field: "multicast_port",
                message: "must be non-zero".to_string(),
            });
        }

        if self.timeout_ms == 0 {
            return Err(SettingsError::Invalid {
                field: "timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }

        let query = self.service_query.as_str();
        if !query.starts_with('_') || !(query.contains("._tcp") || query.contains("._udp")) {
            return Err(SettingsError::Invalid {
                field: "service_query",
                message: format!(
                    "'{}' is not a service type (expected e.g. _http._tcp)",
                    self.service_query
                ),
            });
        }

        Ok(())
    }
}

/// Per-call overrides merged over [`SearchDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multicast_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multicast_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u32>,
}

impl QueryOverrides {
    pub fn is_empty(&self) -> bool {
        self == &QueryOverrides::default()
    }
}

/// Isolated query executor settings.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Extra time past the query's own timeout after which the executor gives
    /// up on a unit. `None` trusts the library to honor the timeout.
    pub supervision_grace: Option<Duration>,
}

/// Everything the orchestrator needs at construction time.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub defaults: SearchDefaults,
    pub executor: ExecutorConfig,
}
