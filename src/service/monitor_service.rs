//! Monitor service: opens sessions and drives their state machines.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{RouteId, SessionId};
use crate::error::WatchError;
use crate::monitor::{MonitorDeps, MonitorSession, Schedule, SessionRegistry, SessionSnapshot};

/// Shortest interval between two idle sweeps.
const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Orchestration layer for monitoring sessions.
///
/// Stateless coordinator over a [`SessionRegistry`]. Every operation
/// follows the same pattern: look up the session, lock it, run the
/// transition, return a fresh snapshot.
#[derive(Debug, Clone)]
pub struct MonitorService {
    deps: MonitorDeps,
    sessions: Arc<SessionRegistry>,
}

impl MonitorService {
    /// Creates a new `MonitorService`.
    #[must_use]
    pub fn new(deps: MonitorDeps, sessions: Arc<SessionRegistry>) -> Self {
        Self { deps, sessions }
    }

    /// Returns a reference to the inner [`SessionRegistry`].
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Opens an idle session with no route selected.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] on an id collision.
    pub async fn open_session(&self) -> Result<SessionSnapshot, WatchError> {
        let session = MonitorSession::new(SessionId::new(), self.deps.clone());
        let handle = self.sessions.insert(session).await?;
        let snapshot = handle.lock().await.snapshot().await;
        tracing::info!(session_id = %snapshot.session_id, "session opened");
        Ok(snapshot)
    }

    /// Closes a session, releasing its schedule.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionNotFound`] if the session does not exist.
    pub async fn close_session(&self, id: SessionId) -> Result<(), WatchError> {
        self.sessions.remove(id).await
    }

    /// Returns the current snapshot of a session.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionNotFound`] if the session does not exist.
    pub async fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot, WatchError> {
        let handle = self.sessions.get(id).await?;
        let session = handle.lock().await;
        Ok(session.snapshot().await)
    }

    /// Displays a route in a session. The session ends up idle.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionNotFound`] or
    /// [`WatchError::RouteNotFound`].
    pub async fn select_route(
        &self,
        id: SessionId,
        route_id: RouteId,
    ) -> Result<SessionSnapshot, WatchError> {
        let handle = self.sessions.get(id).await?;
        let mut session = handle.lock().await;
        let _ = session.select_route(route_id).await?;
        Ok(session.snapshot().await)
    }

    /// Starts monitoring `route_id`, or the displayed route when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionNotFound`], [`WatchError::RouteNotFound`],
    /// or [`WatchError::InvalidRequest`] if no route is given or displayed.
    pub async fn start(
        &self,
        id: SessionId,
        route_id: Option<RouteId>,
    ) -> Result<SessionSnapshot, WatchError> {
        let handle = self.sessions.get(id).await?;
        let mut session = handle.lock().await;
        let route_id = match route_id {
            Some(route_id) => route_id,
            None => session
                .route_id()
                .await
                .ok_or_else(|| WatchError::InvalidRequest("no route selected".to_string()))?,
        };
        let _ = session.start_monitoring(route_id).await?;
        Ok(session.snapshot().await)
    }

    /// Stops monitoring. Stopping an idle session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionNotFound`] if the session does not exist.
    pub async fn stop(&self, id: SessionId) -> Result<SessionSnapshot, WatchError> {
        let handle = self.sessions.get(id).await?;
        let mut session = handle.lock().await;
        let _ = session.stop_monitoring().await;
        Ok(session.snapshot().await)
    }

    /// Reloads the displayed route's history.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionNotFound`], or
    /// [`WatchError::InvalidRequest`] if no route is displayed.
    pub async fn refresh(&self, id: SessionId) -> Result<SessionSnapshot, WatchError> {
        let handle = self.sessions.get(id).await?;
        let session = handle.lock().await;
        let _ = session.refresh().await?;
        Ok(session.snapshot().await)
    }

    /// Starts the background sweep that closes sessions idle for longer
    /// than the configured timeout. Returns `None` when expiry is
    /// disabled. The sweep runs until the returned handle is dropped.
    #[must_use]
    pub fn spawn_reaper(&self) -> Option<Schedule> {
        let max_idle = self.deps.config.session_idle_timeout?;
        let sweep_period = (max_idle / 4).max(MIN_SWEEP_PERIOD);
        let sessions = Arc::clone(&self.sessions);
        tracing::info!(
            idle_secs = max_idle.as_secs(),
            sweep_secs = sweep_period.as_secs(),
            "session reaper started"
        );
        Some(Schedule::spawn(sweep_period, move || {
            let sessions = Arc::clone(&sessions);
            async move {
                let _ = sessions.expire_idle(max_idle).await;
            }
        }))
    }

    /// Closes every session. Used on shutdown.
    pub async fn shutdown(&self) -> usize {
        let closed = self.sessions.close_all().await;
        tracing::info!(closed, "all sessions closed");
        closed
    }
}
