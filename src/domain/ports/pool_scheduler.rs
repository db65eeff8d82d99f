//! Pool Scheduler Port

use crate::domain::entities::{Agent, Pool};
use crate::domain::error::Result;
use async_trait::async_trait;

/// Chooses the agent that will own a pool.
#[async_trait]
pub trait PoolScheduler: Send + Sync {
    /// Returns None when no agent is eligible.
    async fn schedule(&self, pool: &Pool) -> Result<Option<Agent>>;
}
