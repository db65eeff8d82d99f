//! Edge Appliance Objects
//!
//! Wire shapes of the edge management API's load balancer configuration.
//! Field names follow the appliance (camelCase).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeVip {
    pub name: String,
    pub ip_address: String,
    pub protocol: String,
    pub port: u16,
    pub default_pool_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_profile_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMember {
    pub ip_address: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgePool {
    pub name: String,
    pub algorithm: String,
    #[serde(default)]
    pub member: Vec<EdgeMember>,
    #[serde(default)]
    pub monitor_id: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMonitor {
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub interval: u32,
    pub timeout: u32,
    pub max_retries: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgePersistence {
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeAppProfile {
    pub insert_x_forwarded_for: bool,
    pub name: String,
    pub persistence: EdgePersistence,
    pub server_ssl_enabled: bool,
    pub ssl_passthrough: bool,
    pub template: String,
}

/// Result of a creation call: the Location header and the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedObject {
    pub location: String,
    pub body: String,
}
