//! CLI argument definitions using clap.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use mdns_scout_core::{ExecutorConfig, MdnsBackend, QueryOverrides};

/// mdns-scout - find mDNS services on every local network interface
#[derive(Parser, Debug)]
#[command(name = "mdns-scout")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Per-interface search timeout in milliseconds
    #[arg(long, global = true, env = "MDNS_SCOUT_TIMEOUT")]
    pub timeout: Option<u32>,

    /// Service type to query, e.g. _http._tcp
    #[arg(long, global = true)]
    pub service_query: Option<String>,

    /// Multicast group address
    #[arg(long, global = true)]
    pub mdns_address: Option<String>,

    /// Multicast port
    #[arg(long, global = true)]
    pub mdns_port: Option<u16>,

    /// Give up on a query this many milliseconds after its timeout
    #[arg(long, global = true, value_name = "GRACE_MS")]
    pub supervise: Option<u64>,

    /// Also list and search loopback interfaces
    #[arg(long, global = true)]
    pub include_loopback: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Search parameters given on the command line. They win over saved settings.
    pub fn overrides(&self) -> QueryOverrides {
        QueryOverrides {
            multicast_address: self.mdns_address.clone(),
            multicast_port: self.mdns_port,
            service_query: self.service_query.clone(),
            timeout_ms: self.timeout,
        }
    }

    pub fn backend(&self) -> MdnsBackend {
        MdnsBackend::new().with_loopback(self.include_loopback)
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            supervision_grace: self.supervise.map(Duration::from_millis),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List local network interfaces
    Interfaces,

    /// Search for services on one interface
    Search(SearchArgs),

    /// Search every interface in turn
    Auto(AutoArgs),

    /// Saved search settings
    Config(ConfigArgs),
}

// ==================== Search ====================

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Interface name (e.g. eth0) or local IP address
    pub target: String,
}

// ==================== Auto ====================

#[derive(Args, Debug)]
pub struct AutoArgs {
    /// Exit non-zero if any interface failed
    #[arg(long)]
    pub strict: bool,
}

// ==================== Config ====================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show saved search settings
    Show,

    /// Change one saved search setting
    Set(ConfigSetArgs),

    /// Restore the default search settings
    Reset,
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Setting to change
    #[arg(value_enum)]
    pub key: SettingKey,

    /// New value
    pub value: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKey {
    MdnsAddress,
    MdnsPort,
    ServiceQuery,
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from([
            "mdns-scout",
            "auto",
            "--timeout",
            "5000",
            "--service-query",
            "_http._tcp",
            "--supervise",
            "250",
        ]);

        let overrides = cli.overrides();
        assert_eq!(overrides.timeout_ms, Some(5000));
        assert_eq!(overrides.service_query.as_deref(), Some("_http._tcp"));
        assert_eq!(overrides.multicast_address, None);
        assert_eq!(
            cli.executor_config().supervision_grace,
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_no_flags_means_no_overrides() {
        let cli = Cli::parse_from(["mdns-scout", "interfaces"]);
        assert!(cli.overrides().is_empty());
        assert!(cli.executor_config().supervision_grace.is_none());
        assert_eq!(cli.backend(), MdnsBackend::new());
    }

    #[test]
    fn test_include_loopback_flag() {
        let cli = Cli::parse_from(["mdns-scout", "interfaces", "--include-loopback"]);
        assert!(cli.include_loopback);
        assert_eq!(cli.backend(), MdnsBackend::new().with_loopback(true));
        assert_ne!(cli.backend(), MdnsBackend::new());
    }

    #[test]
    fn test_config_set_parses_key() {
        let cli = Cli::parse_from(["mdns-scout", "config", "set", "service-query", "_ipp._tcp"]);
        match cli.command {
            Commands::Config(ConfigArgs {
                command: ConfigCommands::Set(args),
            }) => {
                assert_eq!(args.key, SettingKey::ServiceQuery);
                assert_eq!(args.value, "_ipp._tcp");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
