//! Interfaces command implementation.

use mdns_scout_core::bridge::{self, BridgeMessage};
use mdns_scout_core::{ExecutorConfig, MdnsBackend, QueryOverrides};

use super::build_orchestrator;
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the interfaces command
pub async fn run_interfaces(
    backend: MdnsBackend,
    executor: ExecutorConfig,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let orchestrator = build_orchestrator(backend, executor, &QueryOverrides::default()).await?;

    let response = bridge::get_interfaces(&orchestrator).await;
    // Plain-text failures are reported once, by main.
    if json || response.status {
        println!("{}", formatter.format_interfaces(&response));
    }

    match response.message {
        BridgeMessage::Payload(_) => Ok(()),
        BridgeMessage::Error(reason) => Err(CliError::ListingFailed(reason)),
    }
}
