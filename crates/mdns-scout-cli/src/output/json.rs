//! JSON-formatted output for CLI.
//!
//! Interface listings and searches print the core bridge's `{ status, message }`
//! envelope as-is.

use std::path::Path;

use serde::Serialize;
use serde_json::json;

use mdns_scout_core::bridge::{BridgeResponse, ServicesPayload};
use mdns_scout_core::{NetworkInterface, ScanSession, SearchDefaults};

use super::OutputFormatter;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_interfaces(&self, response: &BridgeResponse<Vec<NetworkInterface>>) -> String {
        Self::to_json(response)
    }

    fn format_services(
        &self,
        _iface: &NetworkInterface,
        response: &BridgeResponse<ServicesPayload>,
    ) -> String {
        Self::to_json(response)
    }

    fn format_scan(&self, session: &ScanSession) -> String {
        Self::to_json(&json!({
            "session": session,
            "status": session.status_message(),
            "summary": {
                "total": session.interfaces().len(),
                "scanned": session.results().len(),
                "succeeded": session.succeeded(),
                "failed": session.failed(),
                "devices": session.devices().len(),
                "cancelled": session.is_cancelled()
            }
        }))
    }

    fn format_settings(&self, settings: &SearchDefaults, path: Option<&Path>) -> String {
        Self::to_json(&json!({
            "settings": settings,
            "path": path.map(|p| p.display().to_string())
        }))
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&json!({ "message": message }))
    }
}
