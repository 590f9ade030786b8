//! Discovery backend built on `mdns-sd` and `if-addrs`.

use std::collections::{BTreeMap, HashMap};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::{Duration, Instant};

use mdns_sd::{IfKind, ServiceDaemon, ServiceEvent, ServiceInfo};
use tracing::{debug, warn};

use super::DiscoveryBackend;
use crate::config::DEFAULT_MULTICAST_PORT;
use crate::error::BackendError;
use crate::types::{DiscoveredDevice, DiscoveryQuery, InterfaceFamily, NetworkInterface};

/// mDNS IPv6 link-local group, accepted alongside 224.0.0.251.
const MDNS_GROUP_V6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0xfb);
const MDNS_GROUP_V4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// Poll interval for the browse receiver.
const RECV_SLICE: Duration = Duration::from_millis(250);

/// Production backend.
///
/// A fresh `ServiceDaemon` is created per search and bound to the query's
/// interface only, so concurrent scans from other tools are unaffected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdnsBackend {
    include_loopback: bool,
}

impl MdnsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report loopback interfaces when listing.
    pub fn with_loopback(mut self, include: bool) -> Self {
        self.include_loopback = include;
        self
    }
}

impl DiscoveryBackend for MdnsBackend {
    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, BackendError> {
        let interfaces = if_addrs::get_if_addrs()?
            .into_iter()
            .filter(|iface| self.include_loopback || !iface.is_loopback())
            .map(|iface| {
                let ip = iface.ip();
                NetworkInterface::new(iface.name, ip.to_string(), family_of(&ip))
            })
            .collect();

        Ok(interfaces)
    }

    fn search_services(&self, query: &DiscoveryQuery) -> Result<Vec<DiscoveredDevice>, BackendError> {
        check_multicast_group(query)?;

        let interface_ip: IpAddr = query.interface_address.parse().map_err(|_| {
            BackendError::Mdns(format!(
                "invalid interface address '{}'",
                query.interface_address
            ))
        })?;

        let daemon = ServiceDaemon::new()
            .map_err(|e| BackendError::Mdns(format!("failed to create mDNS daemon: {e}")))?;

        let result = browse_on(&daemon, interface_ip, query);

        if let Err(e) = daemon.shutdown() {
            warn!(error = %e, "mDNS daemon shutdown failed");
        }

        result
    }
}

fn browse_on(
    daemon: &ServiceDaemon,
    interface_ip: IpAddr,
    query: &DiscoveryQuery,
) -> Result<Vec<DiscoveredDevice>, BackendError> {
    daemon
        .disable_interface(IfKind::All)
        .map_err(|e| BackendError::Mdns(format!("failed to restrict interfaces: {e}")))?;
    daemon
        .enable_interface(IfKind::Addr(interface_ip))
        .map_err(|e| BackendError::Mdns(format!("failed to enable {interface_ip}: {e}")))?;

    let service_type = service_type_of(&query.service_query);
    let receiver = daemon
        .browse(&service_type)
        .map_err(|e| BackendError::Mdns(format!("failed to browse {service_type}: {e}")))?;

    debug!(
        service_type = %service_type,
        interface = %interface_ip,
        timeout_ms = query.timeout_ms,
        "browsing"
    );

    let mut devices: Vec<DiscoveredDevice> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let deadline = Instant::now() + Duration::from_millis(u64::from(query.timeout_ms));

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        match receiver.recv_timeout(remaining.min(RECV_SLICE)) {
            Ok(ServiceEvent::ServiceResolved(info)) => {
                let device = device_from_info(&info, &service_type);
                match seen.get(info.get_fullname()) {
                    Some(&idx) => devices[idx] = device,
                    None => {
                        seen.insert(info.get_fullname().to_string(), devices.len());
                        devices.push(device);
                    }
                }
            }
            Ok(_) => {}
            Err(_) => {
                // Slice elapsed; the outer deadline decides when to stop.
            }
        }
    }

    let _ = daemon.stop_browse(&service_type);
    Ok(devices)
}

fn check_multicast_group(query: &DiscoveryQuery) -> Result<(), BackendError> {
    let group: IpAddr = query.multicast_address.parse().map_err(|_| {
        BackendError::Unsupported(format!(
            "multicast address '{}' is not an IP address",
            query.multicast_address
        ))
    })?;

    let standard_group = match group {
        IpAddr::V4(v4) => v4 == MDNS_GROUP_V4,
        IpAddr::V6(v6) => v6 == MDNS_GROUP_V6,
    };

    if !standard_group || query.multicast_port != DEFAULT_MULTICAST_PORT {
        return Err(BackendError::Unsupported(format!(
            "only the standard mDNS group is supported, got {}:{}",
            query.multicast_address, query.multicast_port
        )));
    }

    Ok(())
}

/// `_smart_ip._tcp` → `_smart_ip._tcp.local.`
fn service_type_of(service_query: &str) -> String {
    let trimmed = service_query.trim_end_matches('.');
    if trimmed.ends_with(".local") {
        format!("{trimmed}.")
    } else {
        format!("{trimmed}.local.")
    }
}

fn family_of(ip: &IpAddr) -> InterfaceFamily {
    match ip {
        IpAddr::V4(_) => InterfaceFamily::Ipv4,
        IpAddr::V6(_) => InterfaceFamily::Ipv6,
    }
}

fn device_from_info(info: &ServiceInfo, service_type: &str) -> DiscoveredDevice {
    let fullname = info.get_fullname();
    let name = fullname
        .strip_suffix(service_type)
        .map(|s| s.trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .unwrap_or(fullname)
        .to_string();

    let mut ips: Vec<IpAddr> = info.get_addresses().iter().copied().collect();
    ips.sort_by_key(|ip| (ip.is_ipv6(), *ip));

    let properties: BTreeMap<String, String> = info
        .get_properties()
        .iter()
        .map(|p| (p.key().to_string(), p.val_str().to_string()))
        .collect();

    DiscoveredDevice {
        name,
        addresses: ips.into_iter().map(|ip| ip.to_string()).collect(),
        properties,
        port: info.get_port(),
    }
}
