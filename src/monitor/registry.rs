//! Concurrent session storage with per-session locking.
//!
//! [`SessionRegistry`] keeps every open session in a `HashMap` whose
//! entries are individually protected by a [`tokio::sync::Mutex`].
//! Operations on one session are serialized; different sessions proceed
//! concurrently.
//!
//! Every lookup through [`SessionRegistry::get`] marks the session as
//! seen. Sessions nobody has looked up for longer than the idle timeout
//! are closed by [`SessionRegistry::expire_idle`], which releases their
//! schedules.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use super::MonitorSession;
use crate::domain::{Route, RouteId, SessionId};
use crate::error::WatchError;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<MonitorSession>>;

#[derive(Debug)]
struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Central store for all open sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Entry>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] if a session with the same
    /// ID is already registered.
    pub async fn insert(&self, session: MonitorSession) -> Result<SessionHandle, WatchError> {
        let id = session.id();
        let mut map = self.sessions.write().await;
        if map.contains_key(&id) {
            return Err(WatchError::InvalidRequest(format!(
                "session {id} already exists"
            )));
        }
        let handle = Arc::new(Mutex::new(session));
        map.insert(
            id,
            Entry {
                handle: Arc::clone(&handle),
                last_seen: Instant::now(),
            },
        );
        Ok(handle)
    }

    /// Looks up a session and marks it as seen.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionNotFound`] if no such session exists.
    pub async fn get(&self, id: SessionId) -> Result<SessionHandle, WatchError> {
        let mut map = self.sessions.write().await;
        let entry = map.get_mut(&id).ok_or(WatchError::SessionNotFound(id))?;
        entry.last_seen = Instant::now();
        Ok(Arc::clone(&entry.handle))
    }

    /// Removes a session and closes it.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionNotFound`] if no such session exists.
    pub async fn remove(&self, id: SessionId) -> Result<(), WatchError> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(WatchError::SessionNotFound(id))?;
        entry.handle.lock().await.close().await;
        Ok(())
    }

    /// Removes and closes every session. Returns how many were closed.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<SessionHandle> = self
            .sessions
            .write()
            .await
            .drain()
            .map(|(_, entry)| entry.handle)
            .collect();
        for handle in &drained {
            handle.lock().await.close().await;
        }
        drained.len()
    }

    /// Removes and closes every session not seen for at least `max_idle`.
    /// Returns how many were closed.
    pub async fn expire_idle(&self, max_idle: Duration) -> usize {
        let mut expired = Vec::new();
        self.sessions.write().await.retain(|id, entry| {
            if entry.last_seen.elapsed() < max_idle {
                return true;
            }
            expired.push((*id, Arc::clone(&entry.handle)));
            false
        });
        for (id, handle) in &expired {
            handle.lock().await.close().await;
            tracing::info!(session_id = %id, idle_secs = max_idle.as_secs(), "idle session expired");
        }
        expired.len()
    }

    /// Stops every session monitoring `route_id`. Returns how many stopped.
    pub async fn stop_route(&self, route_id: RouteId) -> usize {
        let mut stopped = 0_usize;
        for handle in self.handles().await {
            let mut session = handle.lock().await;
            if session.route_id().await == Some(route_id) && session.stop_monitoring().await {
                stopped = stopped.saturating_add(1);
            }
        }
        stopped
    }

    /// Pushes an edited route record to every session displaying it.
    pub async fn route_updated(&self, route: &Route) {
        for handle in self.handles().await {
            handle.lock().await.route_updated(route.clone()).await;
        }
    }

    /// Returns the number of open sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no session is open.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn handles(&self) -> Vec<SessionHandle> {
        self.sessions
            .read()
            .await
            .values()
            .map(|entry| Arc::clone(&entry.handle))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::monitor::MonitorState;
    use crate::monitor::testing::{ScriptedProvider, deps, seed_route, settle};
    use crate::persistence::{MemoryRepository, TravelRepository};

    fn fixture() -> (Arc<MemoryRepository>, Arc<ScriptedProvider>, SessionRegistry) {
        (
            Arc::new(MemoryRepository::new()),
            Arc::new(ScriptedProvider::new()),
            SessionRegistry::new(),
        )
    }

    fn session(repository: &Arc<MemoryRepository>, provider: &Arc<ScriptedProvider>) -> MonitorSession {
        MonitorSession::new(
            SessionId::new(),
            deps(
                Arc::clone(repository) as Arc<dyn TravelRepository>,
                Arc::clone(provider) as Arc<dyn crate::provider::DistanceProvider>,
            ),
        )
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let (repository, provider, registry) = fixture();
        let Ok(handle) = registry.insert(session(&repository, &provider)).await else {
            panic!("insert failed");
        };
        let id = handle.lock().await.id();

        assert_eq!(registry.len().await, 1);
        assert!(registry.get(id).await.is_ok());
        assert!(registry.remove(id).await.is_ok());
        assert!(registry.is_empty().await);
        assert!(matches!(
            registry.get(id).await,
            Err(WatchError::SessionNotFound(_))
        ));
        assert!(registry.remove(id).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_route_only_touches_matching_sessions() {
        let (repository, provider, registry) = fixture();
        let a = seed_route(repository.as_ref(), "a").await;
        let b = seed_route(repository.as_ref(), "b").await;

        let Ok(first) = registry.insert(session(&repository, &provider)).await else {
            panic!("insert failed");
        };
        let Ok(second) = registry.insert(session(&repository, &provider)).await else {
            panic!("insert failed");
        };
        let _ = first.lock().await.start_monitoring(a.id).await;
        let _ = second.lock().await.start_monitoring(b.id).await;
        settle().await;

        assert_eq!(registry.stop_route(a.id).await, 1);
        assert_eq!(first.lock().await.state(), MonitorState::Idle);
        assert_eq!(second.lock().await.state(), MonitorState::Monitoring);
    }

    #[tokio::test(start_paused = true)]
    async fn close_all_releases_every_schedule() {
        let (repository, provider, registry) = fixture();
        let route = seed_route(repository.as_ref(), "work").await;
        for _ in 0..3 {
            let Ok(handle) = registry.insert(session(&repository, &provider)).await else {
                panic!("insert failed");
            };
            let _ = handle.lock().await.start_monitoring(route.id).await;
        }
        settle().await;
        assert_eq!(provider.calls(), 3);

        assert_eq!(registry.close_all().await, 3);
        assert!(registry.is_empty().await);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn lookups_keep_a_session_alive() {
        let (repository, provider, registry) = fixture();
        let Ok(handle) = registry.insert(session(&repository, &provider)).await else {
            panic!("insert failed");
        };
        let id = handle.lock().await.id();
        let max_idle = Duration::from_secs(30 * 60);

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        assert!(registry.get(id).await.is_ok());
        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        assert_eq!(registry.expire_idle(max_idle).await, 0);

        tokio::time::advance(Duration::from_secs(10 * 60)).await;
        assert_eq!(registry.expire_idle(max_idle).await, 1);
        assert!(registry.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_monitoring_session_expires_and_stops_ticking() {
        let (repository, provider, registry) = fixture();
        let route = seed_route(repository.as_ref(), "work").await;
        let Ok(handle) = registry.insert(session(&repository, &provider)).await else {
            panic!("insert failed");
        };
        let _ = handle.lock().await.start_monitoring(route.id).await;
        drop(handle);
        settle().await;

        tokio::time::sleep(Duration::from_secs(30 * 60)).await;
        assert_eq!(registry.expire_idle(Duration::from_secs(30 * 60)).await, 1);
        let calls = provider.calls();

        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        assert_eq!(provider.calls(), calls);
        assert!(registry.is_empty().await);
    }
}
