use std::collections::HashMap;
use std::sync::Arc;

use langdock_types::{Category, SessionError};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::core::resolver::EndpointResolver;
use crate::core::session::{Session, SessionState};

/// What an activation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Not a known category; nothing happened.
    Unknown,
    /// A session for the category already exists, in whatever state.
    AlreadyRegistered,
    /// A new session was registered and is connecting.
    Started,
}

#[derive(Debug, Default)]
pub struct ShutdownReport {
    pub closed: Vec<Category>,
    pub failed: Vec<(Category, SessionError)>,
}

impl ShutdownReport {
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty() && self.failed.is_empty()
    }

    fn record(&mut self, category: Category, result: Result<(), SessionError>) {
        match result {
            Ok(()) => self.closed.push(category),
            Err(err) => {
                warn!(category = %category, error = %err, "failed to close session");
                self.failed.push((category, err));
            }
        }
    }
}

/// Owns the category → session map and guarantees at most one session per
/// category for its whole lifetime (until [`ConnectionBroker::shutdown`]).
pub struct ConnectionBroker {
    resolver: EndpointResolver,
    sessions: Mutex<HashMap<Category, Arc<Session>>>,
}

impl ConnectionBroker {
    pub fn new(resolver: EndpointResolver) -> Self {
        Self {
            resolver,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Never waits for the connection itself; a hanging backend only holds
    /// up its own session.
    pub async fn on_category_activated(&self, category: &str) -> Activation {
        let Some((name, config)) = self.resolver.table().lookup(category) else {
            debug!(category, "ignoring activation for unknown category");
            return Activation::Unknown;
        };

        // check and register under one lock so racing activations see the entry
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(category) {
            debug!(category, "session already registered");
            return Activation::AlreadyRegistered;
        }

        let endpoint = self.resolver.resolve(config);
        let session = Session::open(name.clone(), endpoint);
        sessions.insert(name.clone(), session);
        Activation::Started
    }

    pub async fn session(&self, category: &str) -> Option<Arc<Session>> {
        self.sessions.lock().await.get(category).cloned()
    }

    pub async fn state(&self, category: &str) -> Option<SessionState> {
        self.session(category).await.map(|s| s.state())
    }

    pub async fn is_available(&self, category: &str) -> bool {
        matches!(self.state(category).await, Some(SessionState::Active))
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Closes every registered session concurrently, waits for all of them,
    /// then clears the map. Individual close failures are reported, never
    /// propagated.
    pub async fn shutdown(&self) -> ShutdownReport {
        let mut sessions = self.sessions.lock().await;
        let mut report = ShutdownReport::default();
        if sessions.is_empty() {
            return report;
        }

        info!(sessions = sessions.len(), "closing sessions");
        let mut closing = JoinSet::new();
        for session in sessions.values() {
            let session = Arc::clone(session);
            closing.spawn(async move {
                let result = session.close().await;
                (session.category().clone(), result)
            });
        }

        while let Some(joined) = closing.join_next().await {
            match joined {
                Ok((category, result)) => report.record(category, result),
                Err(err) => warn!(error = %err, "close task did not complete"),
            }
        }

        sessions.clear();
        report
    }
}
