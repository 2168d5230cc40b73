//! Backend Reachability Tracking

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::ports::SignalError;

/// Last known reachability of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendState {
    /// No call has completed yet.
    Unknown,
    /// The last call got an answer, successful or not.
    Reachable,
    /// The last call failed to reach the backend or timed out.
    Unreachable,
}

impl BackendState {
    /// State name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Reachable => "reachable",
            Self::Unreachable => "unreachable",
        }
    }
}

/// Point-in-time view of [`BackendStatus`].
#[derive(Debug, Clone, Serialize)]
pub struct BackendSnapshot {
    /// Reachability.
    pub state: BackendState,
    /// Text of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
    /// When a call last succeeded.
    pub last_success_at: Option<DateTime<Utc>>,
    /// Completed calls.
    pub calls: u64,
    /// Failed calls.
    pub failures: u64,
}

/// Outcome log of backend calls.
#[derive(Debug)]
pub struct BackendStatus {
    state: parking_lot::RwLock<BackendState>,
    last_error: parking_lot::RwLock<Option<String>>,
    last_success_at: parking_lot::RwLock<Option<DateTime<Utc>>>,
    calls: AtomicU64,
    failures: AtomicU64,
}

impl Default for BackendStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendStatus {
    /// Create a tracker in the `Unknown` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: parking_lot::RwLock::new(BackendState::Unknown),
            last_error: parking_lot::RwLock::new(None),
            last_success_at: parking_lot::RwLock::new(None),
            calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        *self.state.write() = BackendState::Reachable;
        *self.last_success_at.write() = Some(Utc::now());
        *self.last_error.write() = None;
    }

    /// Record a failed call.
    pub fn record_failure(&self, error: &SignalError) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
        let state = match error {
            SignalError::Unavailable { .. } | SignalError::Timeout { .. } => {
                BackendState::Unreachable
            }
            SignalError::Rpc { .. } => BackendState::Reachable,
        };
        *self.state.write() = state;
        *self.last_error.write() = Some(error.to_string());
    }

    /// Record the outcome of `result`.
    pub fn record<T>(&self, result: &Result<T, SignalError>) {
        match result {
            Ok(_) => self.record_success(),
            Err(e) => self.record_failure(e),
        }
    }

    /// Current reachability.
    #[must_use]
    pub fn state(&self) -> BackendState {
        *self.state.read()
    }

    /// Whether requests are expected to reach the backend.
    ///
    /// Before the first call completes the backend is assumed reachable,
    /// since the channel connects lazily.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() != BackendState::Unreachable
    }

    /// Copy out the current status.
    #[must_use]
    pub fn snapshot(&self) -> BackendSnapshot {
        BackendSnapshot {
            state: self.state(),
            last_error: self.last_error.read().clone(),
            last_success_at: *self.last_success_at.read(),
            calls: self.calls.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::SignalOperation;

    #[test]
    fn starts_unknown_and_ready() {
        let status = BackendStatus::new();
        assert_eq!(status.state(), BackendState::Unknown);
        assert!(status.is_ready());
    }

    #[test]
    fn unavailable_marks_unreachable_until_success() {
        let status = BackendStatus::new();
        status.record_failure(&SignalError::Unavailable {
            operation: SignalOperation::GetFuelLevel,
            message: "connection refused".to_string(),
        });
        assert!(!status.is_ready());
        assert!(status.snapshot().last_error.is_some());

        status.record_success();
        let snap = status.snapshot();
        assert_eq!(snap.state, BackendState::Reachable);
        assert!(snap.last_error.is_none());
        assert!(snap.last_success_at.is_some());
        assert_eq!(snap.calls, 2);
        assert_eq!(snap.failures, 1);
    }

    #[test]
    fn rpc_error_keeps_backend_reachable() {
        let status = BackendStatus::new();
        status.record::<()>(&Err(SignalError::Rpc {
            operation: SignalOperation::SetHeadlight,
            code: "Internal".to_string(),
            message: "relay stuck".to_string(),
        }));
        assert_eq!(status.state(), BackendState::Reachable);
        assert!(status.is_ready());
    }

    #[test]
    fn state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BackendState::Unreachable).unwrap(),
            "\"unreachable\""
        );
        assert_eq!(BackendState::Unknown.as_str(), "unknown");
    }
}
