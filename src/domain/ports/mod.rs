mod binding_store;
mod edge_gateway;
mod lb_repository;
mod messenger;
mod network_provider;
mod pool_scheduler;

pub use binding_store::BindingStore;
pub use edge_gateway::EdgeGateway;
pub use lb_repository::LoadBalancerRepository;
pub use messenger::{AgentMessage, Messenger};
pub use network_provider::NetworkProvider;
pub use pool_scheduler::PoolScheduler;
