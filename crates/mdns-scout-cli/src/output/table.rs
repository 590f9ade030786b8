//! Table-formatted output for CLI.

use std::path::Path;

use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use mdns_scout_core::bridge::{BridgeMessage, BridgeResponse, ServicesPayload};
use mdns_scout_core::{DiscoveredDevice, NetworkInterface, ScanSession, SearchDefaults};

use super::OutputFormatter;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn devices_table(devices: &[DiscoveredDevice]) -> Table {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Name", "IP Address", "MAC Address", "Port"]);

        for device in devices {
            table.add_row(vec![
                Cell::new(&device.name),
                Cell::new(device.addresses.join(", ")),
                Cell::new(device.mac().unwrap_or("-")),
                Cell::new(device.port.to_string()),
            ]);
        }

        table
    }

    fn failure(reason: &str) -> String {
        format!("{} {}", "[FAIL]".red(), reason)
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_interfaces(&self, response: &BridgeResponse<Vec<NetworkInterface>>) -> String {
        let interfaces = match &response.message {
            BridgeMessage::Payload(interfaces) => interfaces,
            BridgeMessage::Error(reason) => return Self::failure(reason),
        };

        if interfaces.is_empty() {
            return "No interfaces found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["#", "Name", "Address", "Family"]);

        for (i, iface) in interfaces.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&iface.name),
                Cell::new(&iface.address),
                Cell::new(iface.family.as_str()),
            ]);
        }

        format!("{}\n\nFound {} interface(s)", table, interfaces.len())
    }

    fn format_services(
        &self,
        iface: &NetworkInterface,
        response: &BridgeResponse<ServicesPayload>,
    ) -> String {
        let devices = match &response.message {
            BridgeMessage::Payload(payload) => &payload.services,
            BridgeMessage::Error(reason) => return Self::failure(reason),
        };

        if devices.is_empty() {
            return format!(
                "No service found on :{} try increasing the timeout",
                iface.address
            );
        }

        format!(
            "{}\n\nFound {} device(s)",
            Self::devices_table(devices),
            devices.len()
        )
    }

    fn format_scan(&self, session: &ScanSession) -> String {
        let mut sections = Vec::new();

        if !session.results().is_empty() {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["#", "Interface", "Address", "Family", "Result"]);

            for result in session.results() {
                let status_cell = if result.outcome.is_success() {
                    Cell::new("FOUND").fg(Color::Green)
                } else {
                    Cell::new("NONE").fg(Color::Red)
                };

                table.add_row(vec![
                    Cell::new(result.interface_index + 1),
                    Cell::new(&result.interface_name),
                    Cell::new(&result.address),
                    Cell::new(result.family.as_str()),
                    status_cell,
                ]);
            }

            sections.push(table.to_string());
        }

        if session.found_any() {
            sections.push(Self::devices_table(session.devices()).to_string());
        }

        let mut summary = format!(
            "Summary: {} succeeded, {} failed",
            session.succeeded().to_string().green(),
            session.failed().to_string().red()
        );
        if session.is_cancelled() {
            summary.push_str(&format!(
                " ({} of {} interfaces scanned, cancelled)",
                session.results().len(),
                session.interfaces().len()
            ));
        }
        if let Some(finished) = session.finished_at() {
            let elapsed = (finished - session.started_at()).num_milliseconds() as f64 / 1000.0;
            summary.push_str(&format!(" in {:.1}s", elapsed));
        }
        sections.push(summary);

        let status = session.status_message();
        let status = if session.error().is_some() {
            status.red()
        } else if session.found_any() {
            status.green()
        } else {
            status.yellow()
        };
        sections.push(status.to_string());

        sections.join("\n\n")
    }

    fn format_settings(&self, settings: &SearchDefaults, path: Option<&Path>) -> String {
        let mut lines = vec![
            format!("  mdns-address:   {}", settings.multicast_address),
            format!("  mdns-port:      {}", settings.multicast_port),
            format!("  service-query:  {}", settings.service_query),
            format!("  timeout:        {} ms", settings.timeout_ms),
        ];

        if let Some(path) = path {
            lines.insert(0, format!("Settings ({})", path.display()));
        } else {
            lines.insert(0, "Settings".to_string());
        }

        lines.join("\n")
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use mdns_scout_core::InterfaceFamily;

    fn wlan0() -> NetworkInterface {
        NetworkInterface::new("wlan0", "192.168.1.20", InterfaceFamily::Ipv4)
    }

    fn services(services: Vec<DiscoveredDevice>) -> BridgeResponse<ServicesPayload> {
        BridgeResponse::ok(ServicesPayload { services })
    }

    #[test]
    fn test_devices_table_columns() {
        let devices = vec![DiscoveredDevice {
            name: "Dev1".to_string(),
            addresses: vec!["10.0.0.5".to_string()],
            properties: BTreeMap::from([("mac".to_string(), "AA:BB".to_string())]),
            port: 80,
        }];

        let out = TableOutput::new().format_services(&wlan0(), &services(devices));
        assert!(out.contains("MAC Address"));
        assert!(out.contains("Dev1"));
        assert!(out.contains("AA:BB"));
        assert!(out.contains("Found 1 device(s)"));
    }

    #[test]
    fn test_empty_search_names_interface_address() {
        let out = TableOutput::new().format_services(&wlan0(), &services(Vec::new()));
        assert_eq!(
            out,
            "No service found on :192.168.1.20 try increasing the timeout"
        );
    }

    #[test]
    fn test_empty_interface_list() {
        let out = TableOutput::new().format_interfaces(&BridgeResponse::ok(Vec::new()));
        assert_eq!(out, "No interfaces found.");
    }

    #[test]
    fn test_failed_response_shows_reason() {
        let out = TableOutput::new().format_interfaces(&BridgeResponse::error("denied"));
        assert!(out.contains("[FAIL]"));
        assert!(out.ends_with("denied"));
    }

    #[test]
    fn test_settings_lines() {
        let out = TableOutput::new().format_settings(&SearchDefaults::default(), None);
        assert!(out.contains("_smart_ip._tcp"));
        assert!(out.contains("3000 ms"));
    }
}
