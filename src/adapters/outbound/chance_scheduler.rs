//! Chance Pool Scheduler
//!
//! Implements PoolScheduler by picking a random active agent. A pool that
//! already has a hosting agent keeps it.

use crate::domain::entities::{Agent, Pool};
use crate::domain::error::Result;
use crate::domain::ports::{LoadBalancerRepository, PoolScheduler};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;

pub struct ChanceScheduler {
    repository: Arc<dyn LoadBalancerRepository>,
}

impl ChanceScheduler {
    pub fn new(repository: Arc<dyn LoadBalancerRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl PoolScheduler for ChanceScheduler {
    async fn schedule(&self, pool: &Pool) -> Result<Option<Agent>> {
        if let Some(agent) = self.repository.get_agent_hosting_pool(&pool.id).await? {
            tracing::debug!("pool {} already hosted by agent {}", pool.id, agent.id);
            return Ok(Some(agent));
        }

        let candidates = self.repository.list_active_agents().await?;
        let chosen = candidates.choose(&mut rand::thread_rng()).cloned();

        let Some(agent) = chosen else {
            tracing::warn!("no active load balancer agents for pool {}", pool.id);
            return Ok(None);
        };

        self.repository.bind_pool_to_agent(&pool.id, &agent.id).await?;
        tracing::debug!("pool {} scheduled to agent {}", pool.id, agent.host);
        Ok(Some(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::dashmap_lb_repository::DashMapLbRepository;

    fn test_pool() -> Pool {
        Pool {
            id: "p1".to_string(),
            tenant_id: "tenant-a".to_string(),
            name: "web".to_string(),
            lb_method: "ROUND_ROBIN".to_string(),
            protocol: "HTTP".to_string(),
            subnet_id: "subnet-1".to_string(),
            members: Vec::new(),
            health_monitors: Vec::new(),
        }
    }

    fn agent(id: &str, alive: bool) -> Agent {
        Agent {
            id: id.to_string(),
            host: format!("host-{}", id),
            admin_state_up: true,
            alive,
        }
    }

    #[tokio::test]
    async fn test_no_active_agents() {
        let repo = Arc::new(DashMapLbRepository::new());
        repo.register_agent(agent("a1", false));
        let scheduler = ChanceScheduler::new(repo);

        assert!(scheduler.schedule(&test_pool()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_schedules_and_binds() {
        let repo = Arc::new(DashMapLbRepository::new());
        repo.register_agent(agent("a1", true));
        let scheduler = ChanceScheduler::new(repo.clone());

        let chosen = scheduler.schedule(&test_pool()).await.unwrap().unwrap();
        assert_eq!(chosen.id, "a1");

        let hosting = repo.get_agent_hosting_pool("p1").await.unwrap().unwrap();
        assert_eq!(hosting.id, "a1");
    }

    #[tokio::test]
    async fn test_keeps_existing_host() {
        let repo = Arc::new(DashMapLbRepository::new());
        repo.register_agent(agent("a1", true));
        repo.register_agent(agent("a2", true));
        repo.bind_pool_to_agent("p1", "a2").await.unwrap();
        let scheduler = ChanceScheduler::new(repo);

        for _ in 0..10 {
            let chosen = scheduler.schedule(&test_pool()).await.unwrap().unwrap();
            assert_eq!(chosen.id, "a2");
        }
    }
}
