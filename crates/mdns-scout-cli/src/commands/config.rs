//! Saved search settings commands.

use mdns_scout_core::{SearchDefaults, SettingsStore};

use crate::cli::{ConfigArgs, ConfigCommands, SettingKey};
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the config command
pub async fn run_config(args: ConfigArgs, json: bool) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let store = SettingsStore::open_default()?;
    let path = store.path();

    match args.command {
        ConfigCommands::Show => {
            let settings = store.load().await?;
            println!("{}", formatter.format_settings(&settings, Some(&path)));
        }
        ConfigCommands::Set(args) => {
            let mut settings = store.load().await?;
            apply_setting(&mut settings, args.key, &args.value)?;
            store.save(&settings).await?;
            println!("{}", formatter.format_settings(&settings, Some(&path)));
        }
        ConfigCommands::Reset => {
            let settings = store.reset().await?;
            println!("{}", formatter.format_message("Search settings restored to defaults"));
            if !json {
                println!("{}", formatter.format_settings(&settings, None));
            }
        }
    }

    Ok(())
}

/// Parse `value` into the field named by `key`. Range checks happen on save.
fn apply_setting(settings: &mut SearchDefaults, key: SettingKey, value: &str) -> Result<(), CliError> {
    let value = value.trim();

    match key {
        SettingKey::MdnsAddress => settings.multicast_address = value.to_string(),
        SettingKey::MdnsPort => {
            settings.multicast_port = value
                .parse()
                .map_err(|_| CliError::InvalidArgument(format!("'{}' is not a port number", value)))?;
        }
        SettingKey::ServiceQuery => settings.service_query = value.to_string(),
        SettingKey::Timeout => {
            settings.timeout_ms = value.parse().map_err(|_| {
                CliError::InvalidArgument(format!("'{}' is not a timeout in milliseconds", value))
            })?;
        }
    }

    Ok(())
}
