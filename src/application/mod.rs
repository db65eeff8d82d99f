mod agent_driver;
mod agent_rpc;
mod callbacks;
mod edge_driver;
mod snat_ports;

#[cfg(test)]
mod test_support;

pub use agent_driver::{
    AgentDriverConfig, AgentLoadBalancerDriver, TOPIC_LOADBALANCER_AGENT,
    TOPIC_LOADBALANCER_DEVICE,
};
pub use agent_rpc::{AgentRpcApi, AGENT_UPDATED_VERSION, BASE_RPC_API_VERSION};
pub use callbacks::{device_id_for_host, AgentCallbacks, DEVICE_OWNER_LOADBALANCER};
pub use edge_driver::EdgeLoadBalancerDriver;
pub use snat_ports::SnatPortManager;
