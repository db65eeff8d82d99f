//! Domain Entities - Core business objects
//!
//! Platform-side load balancer objects (owned by the platform's service and
//! only referenced here), the network objects the agent driver touches, and
//! the bindings this crate owns.

use crate::domain::value_objects::ObjectKind;
use serde::{Deserialize, Serialize};

/// Session persistence requested for a VIP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPersistence {
    #[serde(rename = "type")]
    pub persistence_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_name: Option<String>,
}

/// A virtual IP frontend listener.
///
/// `pool_id` must reference a pool bound to the same backend instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vip {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub address: String,
    pub protocol: String,
    pub protocol_port: u16,
    pub pool_id: String,
    pub subnet_id: String,
    /// Platform port holding the VIP address, when allocated.
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub session_persistence: Option<SessionPersistence>,
}

/// A backend server inside a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub pool_id: String,
    pub address: String,
    pub protocol_port: u16,
    #[serde(default = "default_member_weight")]
    pub weight: u32,
}

fn default_member_weight() -> u32 {
    1
}

/// A group of members sharing one balancing method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Platform method name: ROUND_ROBIN, LEAST_CONNECTIONS or SOURCE_IP.
    pub lb_method: String,
    pub protocol: String,
    pub subnet_id: String,
    #[serde(default)]
    pub members: Vec<Member>,
    /// Ids of attached health monitors. The edge accepts at most one.
    #[serde(default)]
    pub health_monitors: Vec<String>,
}

/// A health check definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMonitor {
    pub id: String,
    pub tenant_id: String,
    /// Platform type name: TCP, HTTP or HTTPS.
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub delay: u32,
    pub timeout: u32,
    pub max_retries: u32,
}

/// Traffic counters reported by an agent for a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub active_connections: u64,
    pub total_connections: u64,
}

/// A load balancer agent running on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub host: String,
    pub admin_state_up: bool,
    pub alive: bool,
}

impl Agent {
    /// Agents eligible to receive new pools.
    pub fn is_active(&self) -> bool {
        self.admin_state_up && self.alive
    }
}

/// Persisted mapping between a logical object and its backend object.
///
/// At most one binding exists per (kind, logical_id, instance_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub kind: ObjectKind,
    pub logical_id: String,
    pub instance_id: String,
    pub backend_id: String,
    /// Secondary backend reference, e.g. the app profile of a VIP.
    pub extra: Option<String>,
}

impl Binding {
    pub fn new(
        kind: ObjectKind,
        logical_id: impl Into<String>,
        instance_id: impl Into<String>,
        backend_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            logical_id: logical_id.into(),
            instance_id: instance_id.into(),
            backend_id: backend_id.into(),
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }
}

// =============================================================================
// Network objects
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub network_id: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub cidr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "provider:network_type")]
    pub network_type: Option<String>,
    #[serde(default, rename = "provider:segmentation_id")]
    pub segmentation_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIp {
    pub subnet_id: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tenant_id: String,
    pub network_id: String,
    pub admin_state_up: bool,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_owner: String,
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
}

/// Fixed IP request for a new port. No address means "allocate one".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIpRequest {
    pub subnet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Port creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPort {
    pub tenant_id: String,
    pub name: String,
    pub network_id: String,
    pub admin_state_up: bool,
    pub device_id: String,
    pub device_owner: String,
    pub fixed_ips: Vec<FixedIpRequest>,
}

/// Partial port update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortFilter {
    pub network_id: Option<String>,
    pub tenant_id: Option<String>,
    pub name: Option<String>,
}

impl PortFilter {
    pub fn matches(&self, port: &Port) -> bool {
        self.network_id.as_ref().map_or(true, |n| *n == port.network_id)
            && self.tenant_id.as_ref().map_or(true, |t| *t == port.tenant_id)
            && self.name.as_ref().map_or(true, |n| *n == port.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolFilter {
    pub tenant_id: Option<String>,
    pub subnet_id: Option<String>,
}

impl PoolFilter {
    pub fn on_subnet(tenant_id: &str, subnet_id: &str) -> Self {
        Self {
            tenant_id: Some(tenant_id.to_string()),
            subnet_id: Some(subnet_id.to_string()),
        }
    }

    pub fn matches(&self, pool: &Pool) -> bool {
        self.tenant_id.as_ref().map_or(true, |t| *t == pool.tenant_id)
            && self.subnet_id.as_ref().map_or(true, |s| *s == pool.subnet_id)
    }
}

/// Network context forwarded to an agent with every operation.
///
/// Provider attributes are only present when the network carries them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_id: Option<String>,
    pub network_id: String,
    pub subnet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snat_ip: Option<String>,
}
