//! LBaaS Driver Library
//!
//! Load balancer drivers for an edge appliance and for agent-managed
//! appliances, exposed for the platform and for integration tests.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use application::{
    AgentCallbacks, AgentDriverConfig, AgentLoadBalancerDriver, EdgeLoadBalancerDriver,
    SnatPortManager,
};
pub use config::{load_config, Config, SchedulerKind};
pub use domain::entities::{Binding, HealthMonitor, Member, NetworkInfo, Pool, Vip};
pub use domain::error::{DriverError, Result};
pub use domain::ports::{
    BindingStore, EdgeGateway, LoadBalancerRepository, Messenger, NetworkProvider, PoolScheduler,
};
pub use domain::services::Translator;
pub use domain::value_objects::{ObjectKind, SnatMode};
