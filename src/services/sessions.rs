use crate::core::DiscoveryOrchestrator;
use crate::models::DiscoveryConfig;
use crate::services::{GeoapifyClient, InMemorySurface};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Orchestrator backing one mounted map
pub type Session = DiscoveryOrchestrator<Arc<GeoapifyClient>, Arc<InMemorySurface>>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),
}

/// Live map sessions, expired after a period without use
///
/// Every session shares the provider client but owns its orchestrator and
/// surface.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: moka::future::Cache<Uuid, Arc<Session>>,
    provider: Arc<GeoapifyClient>,
    config: DiscoveryConfig,
}

impl SessionRegistry {
    pub fn new(
        provider: Arc<GeoapifyClient>,
        config: DiscoveryConfig,
        max_sessions: u64,
        idle_timeout_secs: u64,
    ) -> Self {
        let sessions = moka::future::CacheBuilder::new(max_sessions)
            .time_to_idle(Duration::from_secs(idle_timeout_secs))
            .build();

        Self {
            sessions,
            provider,
            config,
        }
    }

    /// Mount a new session
    pub async fn create(&self) -> (Uuid, Arc<Session>) {
        let id = Uuid::new_v4();
        let session = Arc::new(DiscoveryOrchestrator::new(
            Arc::clone(&self.provider),
            Arc::new(InMemorySurface::new()),
            self.config.clone(),
        ));

        self.sessions.insert(id, Arc::clone(&session)).await;
        tracing::debug!("Created session {}", id);

        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<Session>, SessionError> {
        self.sessions.get(&id).await.ok_or(SessionError::NotFound(id))
    }

    /// Unmount a session, cancelling any run it has in flight
    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        let session = self.sessions.remove(&id).await.ok_or(SessionError::NotFound(id))?;
        session.teardown().await;
        tracing::debug!("Removed session {}", id);
        Ok(())
    }

    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscoveryPhase;

    fn registry() -> SessionRegistry {
        let client = GeoapifyClient::with_base_url("http://127.0.0.1:9".to_string(), "key".to_string(), 1)
            .expect("client");
        SessionRegistry::new(Arc::new(client), DiscoveryConfig::default(), 100, 60)
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = registry();
        let (id, session) = registry.create().await;
        assert_eq!(session.phase().await, DiscoveryPhase::AwaitingLocation);

        assert!(registry.get(id).await.is_ok());
        registry.remove(id).await.unwrap();
        assert_eq!(session.phase().await, DiscoveryPhase::Idle);

        assert!(matches!(registry.get(id).await, Err(SessionError::NotFound(_))));
        assert!(registry.remove(id).await.is_err());
    }
}
