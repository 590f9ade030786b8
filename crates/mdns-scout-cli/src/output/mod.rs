//! Output formatting for CLI results.

pub mod json;
pub mod table;

use std::path::Path;

pub use json::JsonOutput;
pub use table::TableOutput;

use mdns_scout_core::bridge::{BridgeResponse, ServicesPayload};
use mdns_scout_core::{NetworkInterface, ScanSession, SearchDefaults};

/// Output formatter trait
pub trait OutputFormatter {
    /// Format an interface listing response
    fn format_interfaces(&self, response: &BridgeResponse<Vec<NetworkInterface>>) -> String;

    /// Format the response of a search on `iface`
    fn format_services(
        &self,
        iface: &NetworkInterface,
        response: &BridgeResponse<ServicesPayload>,
    ) -> String;

    /// Format a finished automatic scan
    fn format_scan(&self, session: &ScanSession) -> String;

    /// Format saved search settings
    fn format_settings(&self, settings: &SearchDefaults, path: Option<&Path>) -> String;

    /// Format a generic message
    fn format_message(&self, message: &str) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
