//! Stream session scopes.
//!
//! Every fuel stream request owns one [`SessionScope`]: a child of the
//! process shutdown token. The scope is cancelled when the session ends for
//! any reason, including the response body being dropped on client
//! disconnect, and shutdown cancels every open scope at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

use crate::infrastructure::metrics;

/// Registry of open stream sessions.
#[derive(Debug)]
pub struct StreamSessions {
    shutdown: CancellationToken,
    active: AtomicUsize,
}

impl StreamSessions {
    /// Create a registry whose sessions end when `shutdown` is cancelled.
    #[must_use]
    pub const fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            active: AtomicUsize::new(0),
        }
    }

    /// Open a scope for one stream session.
    #[must_use]
    pub fn open(self: &Arc<Self>, session_id: String) -> SessionScope {
        let active = self.active.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::set_active_streams(active);
        SessionScope {
            id: session_id,
            token: self.shutdown.child_token(),
            sessions: Arc::clone(self),
        }
    }

    /// Number of open sessions.
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }
}

/// Cancellation scope of one stream session.
///
/// Dropping the scope cancels it.
#[derive(Debug)]
pub struct SessionScope {
    id: String,
    token: CancellationToken,
    sessions: Arc<StreamSessions>,
}

impl SessionScope {
    /// Session identifier, used in logs.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Token cancelled when this session ends.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        self.token.cancel();
        let active = self.sessions.active.fetch_sub(1, Ordering::Relaxed) - 1;
        metrics::set_active_streams(active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_scope_cancels_it_and_updates_count() {
        let sessions = Arc::new(StreamSessions::new(CancellationToken::new()));
        let scope = sessions.open("s1".to_string());
        let token = scope.token();
        assert_eq!(sessions.active(), 1);
        assert!(!token.is_cancelled());

        drop(scope);
        assert!(token.is_cancelled());
        assert_eq!(sessions.active(), 0);
    }

    #[test]
    fn shutdown_cancels_all_scopes() {
        let shutdown = CancellationToken::new();
        let sessions = Arc::new(StreamSessions::new(shutdown.clone()));
        let a = sessions.open("a".to_string());
        let b = sessions.open("b".to_string());

        shutdown.cancel();
        assert!(a.token().is_cancelled());
        assert!(b.token().is_cancelled());
        assert_eq!(sessions.active(), 2);
    }

    #[test]
    fn sessions_are_independent() {
        let sessions = Arc::new(StreamSessions::new(CancellationToken::new()));
        let a = sessions.open("a".to_string());
        let b = sessions.open("b".to_string());
        let b_token = b.token();

        drop(a);
        assert!(!b_token.is_cancelled());
        assert_eq!(b.id(), "b");
    }
}
