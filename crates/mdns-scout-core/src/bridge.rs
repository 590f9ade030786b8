//! Request/response envelope for presentation front-ends.
//!
//! Every response is `{ "status": bool, "message": <payload or error text> }`.

use serde::Serialize;

use crate::config::QueryOverrides;
use crate::discovery::Orchestrator;
use crate::types::{DiscoveredDevice, NetworkInterface, QueryOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BridgeMessage<T> {
    Payload(T),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeResponse<T> {
    pub status: bool,
    pub message: BridgeMessage<T>,
}

impl<T> BridgeResponse<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            status: true,
            message: BridgeMessage::Payload(payload),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: BridgeMessage::Error(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicesPayload {
    pub services: Vec<DiscoveredDevice>,
}

/// List interfaces for the presentation layer.
pub async fn get_interfaces(orchestrator: &Orchestrator) -> BridgeResponse<Vec<NetworkInterface>> {
    match orchestrator.list_interfaces().await {
        Ok(interfaces) => BridgeResponse::ok(interfaces),
        Err(e) => BridgeResponse::error(e.to_string()),
    }
}

/// Search one interface for the presentation layer.
pub async fn search_services(
    orchestrator: &Orchestrator,
    iface: &NetworkInterface,
    overrides: &QueryOverrides,
) -> BridgeResponse<ServicesPayload> {
    match orchestrator.discover_single(iface, overrides).await {
        QueryOutcome::Success { devices } => BridgeResponse::ok(ServicesPayload { services: devices }),
        QueryOutcome::Failure { reason } => BridgeResponse::error(reason),
    }
}
