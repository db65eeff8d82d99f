//! Mock ports shared by the application tests.

use crate::domain::entities::{
    FixedIp, Network, NewPort, Pool, Port, PortFilter, PortUpdate, Subnet, Vip,
};
use crate::domain::error::{DriverError, Result};
use crate::domain::ports::{AgentMessage, Messenger, NetworkProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Ordered record of side effects, shareable between mocks.
pub type EventLog = Arc<Mutex<Vec<String>>>;

// ===== Network =====

/// Network provider backed by plain maps. Created ports get addresses
/// 10.0.<n>.<k> on their first subnet.
#[derive(Default)]
pub struct MockNetworkProvider {
    pub subnets: Mutex<HashMap<String, Subnet>>,
    pub networks: Mutex<HashMap<String, Network>>,
    pub ports: Mutex<HashMap<String, Port>>,
    pub created: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    /// Port ids whose update fails with PortNotFound after a successful get.
    pub vanishing: Mutex<Vec<String>>,
    /// When set, create_port fails with BackendUnavailable.
    pub failing_create: Mutex<bool>,
    pub events: EventLog,
    next_id: Mutex<u32>,
}

impl MockNetworkProvider {
    /// Adds a network and one subnet on it.
    pub fn with_subnet(self, subnet_id: &str, network_id: &str, segmentation_id: Option<u32>) -> Self {
        self.subnets.lock().unwrap().insert(
            subnet_id.to_string(),
            Subnet {
                id: subnet_id.to_string(),
                network_id: network_id.to_string(),
                tenant_id: "tenant-a".to_string(),
                cidr: "10.0.0.0/24".to_string(),
            },
        );
        self.networks.lock().unwrap().insert(
            network_id.to_string(),
            Network {
                id: network_id.to_string(),
                name: network_id.to_string(),
                network_type: segmentation_id.map(|_| "vlan".to_string()),
                segmentation_id,
            },
        );
        self
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = events;
        self
    }

    pub fn insert_port(&self, port: Port) {
        self.ports.lock().unwrap().insert(port.id.clone(), port);
    }

    pub fn port(&self, port_id: &str) -> Option<Port> {
        self.ports.lock().unwrap().get(port_id).cloned()
    }

    pub fn ports_named(&self, name: &str) -> Vec<Port> {
        self.ports
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.name == name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NetworkProvider for MockNetworkProvider {
    async fn get_subnet(&self, subnet_id: &str) -> Result<Subnet> {
        self.subnets
            .lock()
            .unwrap()
            .get(subnet_id)
            .cloned()
            .ok_or_else(|| DriverError::NetworkResourceNotFound {
                kind: "subnet".to_string(),
                id: subnet_id.to_string(),
            })
    }

    async fn get_network(&self, network_id: &str) -> Result<Network> {
        self.networks
            .lock()
            .unwrap()
            .get(network_id)
            .cloned()
            .ok_or_else(|| DriverError::NetworkResourceNotFound {
                kind: "network".to_string(),
                id: network_id.to_string(),
            })
    }

    async fn get_port(&self, port_id: &str) -> Result<Port> {
        self.port(port_id).ok_or_else(|| DriverError::PortNotFound {
            port_id: port_id.to_string(),
        })
    }

    async fn create_port(&self, port: NewPort) -> Result<Port> {
        if *self.failing_create.lock().unwrap() {
            return Err(DriverError::unavailable("http://network", "connection refused"));
        }
        let subnets: Vec<String> = port.fixed_ips.iter().map(|ip| ip.subnet_id.clone()).collect();
        self.events
            .lock()
            .unwrap()
            .push(format!("create_port({})", subnets.join(",")));
        let n = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let created = Port {
            id: format!("port-{}", n),
            name: port.name,
            tenant_id: port.tenant_id,
            network_id: port.network_id,
            admin_state_up: port.admin_state_up,
            device_id: port.device_id,
            device_owner: port.device_owner,
            fixed_ips: port
                .fixed_ips
                .into_iter()
                .map(|ip| FixedIp {
                    ip_address: ip.ip_address.unwrap_or_else(|| format!("10.0.{}.3", n)),
                    subnet_id: ip.subnet_id,
                })
                .collect(),
        };
        self.created.lock().unwrap().push(created.id.clone());
        self.insert_port(created.clone());
        Ok(created)
    }

    async fn update_port(&self, port_id: &str, update: PortUpdate) -> Result<Port> {
        let not_found = || DriverError::PortNotFound {
            port_id: port_id.to_string(),
        };
        if self.vanishing.lock().unwrap().iter().any(|id| id == port_id) {
            return Err(not_found());
        }

        let mut ports = self.ports.lock().unwrap();
        let port = ports.get_mut(port_id).ok_or_else(not_found)?;
        if let Some(up) = update.admin_state_up {
            port.admin_state_up = up;
        }
        if let Some(owner) = update.device_owner {
            port.device_owner = owner;
        }
        if let Some(device) = update.device_id {
            port.device_id = device;
        }
        Ok(port.clone())
    }

    async fn delete_port(&self, port_id: &str) -> Result<()> {
        self.ports
            .lock()
            .unwrap()
            .remove(port_id)
            .ok_or_else(|| DriverError::PortNotFound {
                port_id: port_id.to_string(),
            })?;
        self.deleted.lock().unwrap().push(port_id.to_string());
        self.events
            .lock()
            .unwrap()
            .push(format!("delete_port({})", port_id));
        Ok(())
    }

    async fn list_ports(&self, filter: &PortFilter) -> Result<Vec<Port>> {
        let mut ports: Vec<Port> = self
            .ports
            .lock()
            .unwrap()
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        ports.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(ports)
    }
}

// ===== Messenger =====

#[derive(Default)]
pub struct MockMessenger {
    pub sent: Mutex<Vec<(String, AgentMessage)>>,
    pub events: EventLog,
}

impl MockMessenger {
    pub fn with_events(events: EventLog) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn methods(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.method.clone())
            .collect()
    }

    pub fn last(&self) -> (String, AgentMessage) {
        self.sent.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn cast(&self, topic: &str, message: AgentMessage) {
        self.events
            .lock()
            .unwrap()
            .push(format!("cast {}", message.method));
        self.sent.lock().unwrap().push((topic.to_string(), message));
    }
}

// ===== Fixtures =====

pub fn pool_on(id: &str, subnet_id: &str) -> Pool {
    Pool {
        id: id.to_string(),
        tenant_id: "tenant-a".to_string(),
        name: format!("pool {}", id),
        lb_method: "ROUND_ROBIN".to_string(),
        protocol: "HTTP".to_string(),
        subnet_id: subnet_id.to_string(),
        members: Vec::new(),
        health_monitors: Vec::new(),
    }
}

pub fn vip_for(pool: &Pool, port_id: Option<&str>) -> Vip {
    Vip {
        id: format!("vip-{}", pool.id),
        tenant_id: pool.tenant_id.clone(),
        name: "web-vip".to_string(),
        address: "10.0.0.10".to_string(),
        protocol: "HTTP".to_string(),
        protocol_port: 80,
        pool_id: pool.id.clone(),
        subnet_id: pool.subnet_id.clone(),
        port_id: port_id.map(str::to_string),
        session_persistence: None,
    }
}
