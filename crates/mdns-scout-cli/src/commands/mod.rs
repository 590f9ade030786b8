//! Command implementations.

pub mod auto;
pub mod config;
pub mod interfaces;
pub mod search;

pub use auto::run_auto;
pub use config::run_config;
pub use interfaces::run_interfaces;
pub use search::run_search;

use std::sync::Arc;

use tracing::warn;

use mdns_scout_core::{
    ExecutorConfig, MdnsBackend, Orchestrator, OrchestratorConfig, QueryOverrides,
    SearchDefaults, SettingsStore,
};

use crate::error::{CliError, SettingsError};

/// Saved settings, or the defaults when this platform has no config directory.
pub(crate) async fn load_defaults() -> Result<SearchDefaults, CliError> {
    match SettingsStore::open_default() {
        Ok(store) => Ok(store.load().await?),
        Err(SettingsError::NoConfigDir) => {
            warn!("no configuration directory, using built-in search defaults");
            Ok(SearchDefaults::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Orchestrator over the real network, seeded with the saved settings.
///
/// Fails with an invalid-argument error if the overrides make the search
/// parameters invalid.
pub(crate) async fn build_orchestrator(
    backend: MdnsBackend,
    executor: ExecutorConfig,
    overrides: &QueryOverrides,
) -> Result<Orchestrator, CliError> {
    let defaults = load_defaults().await?;
    defaults.merged(overrides).validate()?;

    Ok(Orchestrator::new(
        Arc::new(backend),
        OrchestratorConfig { defaults, executor },
    ))
}
