//! Scripted in-memory backend for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::backend::DiscoveryBackend;
use crate::error::BackendError;
use crate::types::{DiscoveredDevice, DiscoveryQuery, InterfaceFamily, NetworkInterface};

/// What a scripted search does for one interface address.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Devices(Vec<DiscoveredDevice>),
    Error(String),
    Panic(String),
    /// Sleep, then return the devices.
    Slow(Duration, Vec<DiscoveredDevice>),
}

pub(crate) struct ScriptedBackend {
    interfaces: Result<Vec<NetworkInterface>, String>,
    replies: HashMap<String, Reply>,
    queries: Mutex<Vec<DiscoveryQuery>>,
}

impl ScriptedBackend {
    pub(crate) fn new(interfaces: Vec<NetworkInterface>) -> Self {
        Self {
            interfaces: Ok(interfaces),
            replies: HashMap::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_listing(message: &str) -> Self {
        Self {
            interfaces: Err(message.to_string()),
            replies: HashMap::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn reply(mut self, address: &str, reply: Reply) -> Self {
        self.replies.insert(address.to_string(), reply);
        self
    }

    pub(crate) fn queries(&self) -> Vec<DiscoveryQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl DiscoveryBackend for ScriptedBackend {
    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, BackendError> {
        self.interfaces
            .clone()
            .map_err(BackendError::Mdns)
    }

    fn search_services(&self, query: &DiscoveryQuery) -> Result<Vec<DiscoveredDevice>, BackendError> {
        self.queries.lock().unwrap().push(query.clone());

        match self.replies.get(&query.interface_address).cloned() {
            Some(Reply::Devices(devices)) => Ok(devices),
            Some(Reply::Error(message)) => Err(BackendError::Mdns(message)),
            Some(Reply::Panic(message)) => panic!("{}", message),
            Some(Reply::Slow(delay, devices)) => {
                thread::sleep(delay);
                Ok(devices)
            }
            None => Ok(Vec::new()),
        }
    }
}

pub(crate) fn iface(name: &str, address: &str) -> NetworkInterface {
    NetworkInterface::new(name, address, InterfaceFamily::Ipv4)
}

pub(crate) fn device(name: &str, address: &str) -> DiscoveredDevice {
    DiscoveredDevice {
        name: name.to_string(),
        addresses: vec![address.to_string()],
        properties: BTreeMap::from([("mac".to_string(), "AA:BB".to_string())]),
        port: 80,
    }
}
