//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They carry the fixed translation tables between platform vocabulary
//! and the edge appliance vocabulary.

use serde::{Deserialize, Serialize};

/// Kind of object a binding maps to a backend object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Vip,
    Pool,
    HealthMonitor,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vip => "vip",
            Self::Pool => "pool",
            Self::HealthMonitor => "health_monitor",
        }
    }

    /// Parse a stored kind name. Returns None for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vip" => Some(Self::Vip),
            "pool" => Some(Self::Pool),
            "health_monitor" => Some(Self::HealthMonitor),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Balancing algorithm understood by the edge appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceAlgorithm {
    RoundRobin,
    LeastConn,
    Source,
}

impl BalanceAlgorithm {
    /// Map a platform lb_method to the edge algorithm.
    ///
    /// Unrecognized methods fall back to round-robin.
    ///
    /// # Examples
    /// ```
    /// use lbaas_driver::domain::value_objects::BalanceAlgorithm;
    ///
    /// assert_eq!(BalanceAlgorithm::from_lb_method("SOURCE_IP"), BalanceAlgorithm::Source);
    /// assert_eq!(BalanceAlgorithm::from_lb_method("WEIGHTED"), BalanceAlgorithm::RoundRobin);
    /// ```
    pub fn from_lb_method(lb_method: &str) -> Self {
        match lb_method {
            "ROUND_ROBIN" => Self::RoundRobin,
            "LEAST_CONNECTIONS" => Self::LeastConn,
            "SOURCE_IP" => Self::Source,
            _ => Self::RoundRobin, // fallback
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round-robin",
            Self::LeastConn => "leastconn",
            Self::Source => "source",
        }
    }
}

impl std::fmt::Display for BalanceAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Health check protocol understood by the edge appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorProtocol {
    Tcp,
    Http,
}

impl MonitorProtocol {
    /// Map a platform monitor type to the edge protocol.
    ///
    /// The edge has no TLS-aware check, so HTTPS monitors become plain TCP
    /// checks. Unrecognized types fall back to http.
    pub fn from_monitor_type(monitor_type: &str) -> Self {
        match monitor_type {
            "TCP" => Self::Tcp,
            "HTTP" => Self::Http,
            "HTTPS" => Self::Tcp,
            _ => Self::Http, // fallback
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Http => "http",
        }
    }
}

impl std::fmt::Display for MonitorProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extract the backend object id from a creation response's Location header.
///
/// The id is everything after the final `/`. A location without any `/`
/// is returned whole.
///
/// # Examples
/// ```
/// use lbaas_driver::domain::value_objects::object_id_from_location;
///
/// assert_eq!(object_id_from_location("/api/4.0/edges/edge-1/pools/pool-7"), "pool-7");
/// assert_eq!(object_id_from_location("abc123"), "abc123");
/// ```
pub fn object_id_from_location(location: &str) -> &str {
    match location.rfind('/') {
        Some(idx) => &location[idx + 1..],
        None => location,
    }
}

/// Prefix of every SNAT port name.
pub const SNAT_PORT_PREFIX: &str = "_lb-snatport-";

/// Deterministic name of the SNAT port serving a subnet.
pub fn snat_port_name(subnet_id: &str) -> String {
    format!("{}{}", SNAT_PORT_PREFIX, subnet_id)
}

/// How SNAT port ensure/release calls are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnatMode {
    /// Read-then-write with no lock. Concurrent attach/detach on the same
    /// subnet can race.
    #[default]
    Unlocked,
    /// Ensure and release on the same (tenant, subnet) are serialized in
    /// this process.
    PerSubnetLock,
}
