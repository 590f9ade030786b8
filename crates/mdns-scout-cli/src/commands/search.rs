//! Search command implementation.

use std::net::IpAddr;

use mdns_scout_core::bridge::{self, BridgeMessage, BridgeResponse, ServicesPayload};
use mdns_scout_core::{
    ExecutorConfig, InterfaceFamily, MdnsBackend, NetworkInterface, QueryOverrides,
};

use super::build_orchestrator;
use crate::cli::SearchArgs;
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the search command
pub async fn run_search(
    args: SearchArgs,
    backend: MdnsBackend,
    overrides: QueryOverrides,
    executor: ExecutorConfig,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let orchestrator = build_orchestrator(backend, executor, &overrides).await?;

    let interfaces = orchestrator.list_interfaces().await?;
    let iface = resolve_target(&args.target, &interfaces)?;

    if !json {
        let query = orchestrator.defaults().query_for(&iface.address, &overrides);
        eprintln!(
            "Searching {} on {} ({}) for {} ms...",
            query.service_query, iface.name, query.interface_address, query.timeout_ms
        );
    }

    let response = bridge::search_services(&orchestrator, &iface, &overrides).await;
    // Plain-text failures are reported once, by main.
    if json || response.status {
        println!("{}", formatter.format_services(&iface, &response));
    }

    search_result(&response)
}

fn search_result(response: &BridgeResponse<ServicesPayload>) -> Result<(), CliError> {
    match &response.message {
        BridgeMessage::Payload(payload) if payload.services.is_empty() => {
            Err(CliError::NoDevicesFound)
        }
        BridgeMessage::Payload(_) => Ok(()),
        BridgeMessage::Error(reason) => Err(CliError::SearchFailed(reason.clone())),
    }
}

/// Match `target` against interface addresses first, then names.
///
/// A name with several addresses resolves to its first IPv4 one. An IP that
/// matches no listed interface is still accepted as-is.
fn resolve_target(target: &str, interfaces: &[NetworkInterface]) -> Result<NetworkInterface, CliError> {
    if let Some(iface) = interfaces.iter().find(|i| i.address == target) {
        return Ok(iface.clone());
    }

    let named: Vec<&NetworkInterface> = interfaces.iter().filter(|i| i.name == target).collect();
    if let Some(iface) = named
        .iter()
        .find(|i| i.family == InterfaceFamily::Ipv4)
        .or_else(|| named.first())
    {
        return Ok((*iface).clone());
    }

    match target.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => Ok(NetworkInterface::new(target, target, InterfaceFamily::Ipv4)),
        Ok(IpAddr::V6(_)) => Ok(NetworkInterface::new(target, target, InterfaceFamily::Ipv6)),
        Err(_) => Err(CliError::InvalidArgument(format!(
            "Unknown interface '{}'. Run `mdns-scout interfaces` to list them.",
            target
        ))),
    }
}
