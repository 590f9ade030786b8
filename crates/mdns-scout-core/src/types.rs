//! Type definitions shared by the lister, executor, orchestrator and bridge.
//!
//! Field names serialize in camelCase for presentation consumers, except the
//! query options, which keep the external library's snake_case option names.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// Address family of a network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceFamily {
    #[serde(rename = "IPv4")]
    Ipv4,
    #[serde(rename = "IPv6")]
    Ipv6,
}

impl InterfaceFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceFamily::Ipv4 => "IPv4",
            InterfaceFamily::Ipv6 => "IPv6",
        }
    }
}

impl fmt::Display for InterfaceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A local network interface as reported by the discovery backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub address: String,
    pub family: InterfaceFamily,
}

impl NetworkInterface {
    pub fn new(name: impl Into<String>, address: impl Into<String>, family: InterfaceFamily) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            family,
        }
    }
}

/// Input for a single mDNS query.
///
/// Serializes with the option names the discovery library expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryQuery {
    #[serde(rename = "mdns_address")]
    pub multicast_address: String,
    #[serde(rename = "mdns_port")]
    pub multicast_port: u16,
    #[serde(rename = "interface")]
    pub interface_address: String,
    pub service_query: String,
    #[serde(rename = "timeout")]
    pub timeout_ms: u32,
}

/// A service instance resolved by the discovery backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub name: String,
    pub addresses: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    pub port: u16,
}

impl DiscoveredDevice {
    /// MAC address advertised in the TXT record, if any.
    pub fn mac(&self) -> Option<&str> {
        self.properties.get("mac").map(String::as_str)
    }
}

/// Result of exactly one executed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QueryOutcome {
    Success { devices: Vec<DiscoveredDevice> },
    Failure { reason: String },
}

impl QueryOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        QueryOutcome::Failure {
            reason: reason.into(),
        }
    }

    /// Scan-level classification. An empty success counts as a failure.
    pub fn mark(&self) -> ScanMark {
        match self {
            QueryOutcome::Success { devices } if !devices.is_empty() => ScanMark::Success,
            _ => ScanMark::Fail,
        }
    }

    pub fn devices(&self) -> &[DiscoveredDevice] {
        match self {
            QueryOutcome::Success { devices } => devices,
            QueryOutcome::Failure { .. } => &[],
        }
    }

    pub fn into_devices(self) -> Vec<DiscoveredDevice> {
        match self {
            QueryOutcome::Success { devices } => devices,
            QueryOutcome::Failure { .. } => Vec::new(),
        }
    }
}

impl From<DiscoveryError> for QueryOutcome {
    fn from(e: DiscoveryError) -> Self {
        QueryOutcome::failure(e.to_string())
    }
}

/// Per-interface marker recorded during an automatic scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMark {
    Success,
    Fail,
}

impl ScanMark {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanMark::Success)
    }

    /// Tick or cross shown next to each interface in progress output.
    pub fn symbol(&self) -> &'static str {
        match self {
            ScanMark::Success => "✅",
            ScanMark::Fail => "❌",
        }
    }
}

/// One row of the automatic scan report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceScanResult {
    pub interface_index: usize,
    pub interface_name: String,
    pub address: String,
    pub family: InterfaceFamily,
    pub outcome: ScanMark,
}
