mod chance_scheduler;
mod channel_messenger;
mod dashmap_lb_repository;
mod memory_binding_store;
mod neutron_network_client;
pub mod rest_client;
mod sqlite_binding_store;
mod vcns_edge_gateway;
mod xml_body;

pub use chance_scheduler::ChanceScheduler;
pub use channel_messenger::ChannelMessenger;
pub use dashmap_lb_repository::DashMapLbRepository;
pub use memory_binding_store::MemoryBindingStore;
pub use neutron_network_client::NeutronNetworkClient;
pub use rest_client::{BodyFormat, RestClient, RestClientConfig, RestResponse};
pub use sqlite_binding_store::SqliteBindingStore;
pub use vcns_edge_gateway::VcnsEdgeGateway;
