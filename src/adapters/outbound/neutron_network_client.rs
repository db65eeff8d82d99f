//! Neutron Network Client
//!
//! Implements NetworkProvider over the platform networking API (v2.0).
//! Objects travel wrapped in their singular name (`{"port": {...}}`) and
//! collections in the plural (`{"ports": [...]}`).

use super::rest_client::RestClient;
use crate::domain::entities::{Network, NewPort, Port, PortFilter, PortUpdate, Subnet};
use crate::domain::error::{DriverError, Result};
use crate::domain::ports::NetworkProvider;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const API_PREFIX: &str = "v2.0";

#[derive(Debug, Deserialize)]
struct SubnetBody {
    subnet: Subnet,
}

#[derive(Debug, Deserialize)]
struct NetworkBody {
    network: Network,
}

#[derive(Debug, Deserialize)]
struct PortBody {
    port: Port,
}

#[derive(Debug, Deserialize)]
struct PortsBody {
    ports: Vec<Port>,
}

pub struct NeutronNetworkClient {
    client: RestClient,
}

impl NeutronNetworkClient {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    fn path(collection: &str, id: &str) -> String {
        format!("{}/{}/{}", API_PREFIX, collection, id)
    }
}

fn is_not_found(err: &DriverError) -> bool {
    matches!(err, DriverError::BackendRejected { status: 404, .. })
}

/// Map a 404 on a port call to `PortNotFound`; other errors pass through.
fn port_error(port_id: &str) -> impl Fn(DriverError) -> DriverError + '_ {
    move |err| {
        if is_not_found(&err) {
            DriverError::PortNotFound {
                port_id: port_id.to_string(),
            }
        } else {
            err
        }
    }
}

fn resource_error<'a>(kind: &'a str, id: &'a str) -> impl Fn(DriverError) -> DriverError + 'a {
    move |err| {
        if is_not_found(&err) {
            DriverError::NetworkResourceNotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            }
        } else {
            err
        }
    }
}

#[async_trait]
impl NetworkProvider for NeutronNetworkClient {
    async fn get_subnet(&self, subnet_id: &str) -> Result<Subnet> {
        let response = self
            .client
            .retrieve_resource(&Self::path("subnets", subnet_id))
            .await
            .map_err(resource_error("subnet", subnet_id))?;
        Ok(response.json::<SubnetBody>()?.subnet)
    }

    async fn get_network(&self, network_id: &str) -> Result<Network> {
        let response = self
            .client
            .retrieve_resource(&Self::path("networks", network_id))
            .await
            .map_err(resource_error("network", network_id))?;
        Ok(response.json::<NetworkBody>()?.network)
    }

    async fn get_port(&self, port_id: &str) -> Result<Port> {
        let response = self
            .client
            .retrieve_resource(&Self::path("ports", port_id))
            .await
            .map_err(port_error(port_id))?;
        Ok(response.json::<PortBody>()?.port)
    }

    async fn create_port(&self, port: NewPort) -> Result<Port> {
        let response = self
            .client
            .create_resource(&format!("{}/ports", API_PREFIX), "port", &json!({ "port": port }))
            .await?;
        Ok(response.json::<PortBody>()?.port)
    }

    async fn update_port(&self, port_id: &str, update: PortUpdate) -> Result<Port> {
        let response = self
            .client
            .update_resource(&Self::path("ports", port_id), "port", &json!({ "port": update }))
            .await
            .map_err(port_error(port_id))?;
        Ok(response.json::<PortBody>()?.port)
    }

    async fn delete_port(&self, port_id: &str) -> Result<()> {
        self.client
            .remove_resource(&Self::path("ports", port_id))
            .await
            .map_err(port_error(port_id))?;
        Ok(())
    }

    async fn list_ports(&self, filter: &PortFilter) -> Result<Vec<Port>> {
        let mut query = Vec::new();
        if let Some(network_id) = &filter.network_id {
            query.push(("network_id", network_id.as_str()));
        }
        if let Some(tenant_id) = &filter.tenant_id {
            query.push(("tenant_id", tenant_id.as_str()));
        }
        if let Some(name) = &filter.name {
            query.push(("name", name.as_str()));
        }

        let response = self
            .client
            .retrieve_resource_with_query(&format!("{}/ports", API_PREFIX), &query)
            .await?;
        Ok(response.json::<PortsBody>()?.ports)
    }
}
