//! Network Provider Port
//!
//! The platform's subnet, network and port operations.

use crate::domain::entities::{Network, NewPort, Port, PortFilter, PortUpdate, Subnet};
use crate::domain::error::Result;
use async_trait::async_trait;

/// Platform networking calls used by the agent driver.
///
/// `get_port` and `update_port` fail with `PortNotFound` when the port has
/// already been removed by another actor.
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    async fn get_subnet(&self, subnet_id: &str) -> Result<Subnet>;
    async fn get_network(&self, network_id: &str) -> Result<Network>;
    async fn get_port(&self, port_id: &str) -> Result<Port>;
    async fn create_port(&self, port: NewPort) -> Result<Port>;
    async fn update_port(&self, port_id: &str, update: PortUpdate) -> Result<Port>;
    async fn delete_port(&self, port_id: &str) -> Result<()>;
    async fn list_ports(&self, filter: &PortFilter) -> Result<Vec<Port>>;
}
