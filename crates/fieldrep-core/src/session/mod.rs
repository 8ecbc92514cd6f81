//! Session context: the current auth token and company (tenant) id, plus the
//! observers that are told when the session can no longer be used.
//!
//! The context is shared as `Arc<SessionContext>` and injected into the
//! [`crate::pipeline::RequestPipeline`] at construction. Any number of
//! observers may subscribe; each is invoked once per invalidation.

pub mod persist;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Credentials and tenant scoping for backend calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub company_id: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            company_id: Some(company_id.into()),
        }
    }
}

/// Callback invoked when the session is declared invalid.
pub type SessionObserver = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`SessionContext::on_session_invalid`], used to
/// unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Holds the current [`Session`] and its invalidation observers.
#[derive(Default)]
pub struct SessionContext {
    session: RwLock<Session>,
    observers: Mutex<Vec<(ObserverId, SessionObserver)>>,
    next_observer: AtomicU64,
}

impl SessionContext {
    /// Create a context with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context pre-populated with `session` (e.g. restored from the
    /// store).
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
            ..Self::default()
        }
    }

    /// Replace the session after a successful login.
    pub fn login(&self, token: impl Into<String>, company_id: impl Into<String>) {
        *self.write() = Session::new(token, company_id);
        tracing::info!("session established");
    }

    /// Forget the token and company id.
    pub fn logout(&self) {
        *self.write() = Session::default();
        tracing::info!("session cleared");
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    /// Current bearer token, if logged in.
    pub fn token(&self) -> Option<String> {
        self.read().token.clone().filter(|t| !t.is_empty())
    }

    /// Current company (tenant) id. An empty id counts as absent.
    pub fn company_id(&self) -> Option<String> {
        self.read().company_id.clone().filter(|c| !c.trim().is_empty())
    }

    /// Return `true` if both a token and a company id are present.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.company_id().is_some()
    }

    /// Subscribe to session invalidation.
    pub fn on_session_invalid<F>(&self, observer: F) -> ObserverId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    /// Unsubscribe an observer. Returns `false` if it was not registered.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        observers.len() != before
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Tell every observer that the session is unusable.
    ///
    /// Observers run synchronously on the caller's task, outside the
    /// observer lock, so an observer may itself call [`Self::logout`] or
    /// subscribe/unsubscribe.
    pub fn notify_session_invalid(&self) {
        let observers: Vec<SessionObserver> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();

        tracing::warn!(observers = observers.len(), "session invalidated");

        for observer in observers {
            observer();
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.read();
        f.debug_struct("SessionContext")
            .field("has_token", &session.token.is_some())
            .field("company_id", &session.company_id)
            .field("observers", &self.observer_count())
            .finish()
    }
}
