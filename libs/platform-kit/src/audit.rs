//! Security audit events.
//!
//! Audit recording is best-effort: the [`AuditDispatcher`] hands each event
//! to a spawned task and discards any failure after logging it. Callers
//! never await the sink and never observe its errors.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of security-relevant action being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A DNS ownership check ran for a custom domain.
    DomainVerificationAttempted,
    /// A custom domain was claimed by an organization.
    DomainClaimed,
    /// A custom domain was removed from an organization.
    DomainRemoved,
    /// An operator unlocked an account.
    AccountUnlocked,
}

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Tenant the event belongs to, if any.
    pub tenant_id: Option<Uuid>,
    /// User that performed the action. `None` for system actions.
    pub actor_id: Option<Uuid>,
    pub action: AuditAction,
    /// Type of the affected entity (e.g. `"organization"`, `"user"`).
    pub subject_type: String,
    /// Identifier of the affected entity.
    pub subject_id: String,
    /// Free-form structured details.
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

/// Destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persists one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be stored. The dispatcher
    /// logs and drops it.
    async fn record(&self, event: SecurityEvent) -> anyhow::Result<()>;
}

/// Fire-and-forget front end for an [`AuditSink`].
#[derive(Clone)]
pub struct AuditDispatcher {
    sink: Arc<dyn AuditSink>,
}

impl AuditDispatcher {
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Dispatcher writing events to the `audit` tracing target.
    #[must_use]
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingAuditSink))
    }

    /// Schedules `event` for recording and returns immediately.
    ///
    /// Outside a Tokio runtime the event is logged and dropped.
    pub fn dispatch(&self, event: SecurityEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(action = ?event.action, "no async runtime; audit event dropped");
            return;
        };

        let sink = Arc::clone(&self.sink);
        handle.spawn(async move {
            let action = event.action;
            let subject_id = event.subject_id.clone();
            if let Err(e) = sink.record(event).await {
                tracing::warn!(
                    action = ?action,
                    subject_id = %subject_id,
                    error = %e,
                    "failed to record audit event"
                );
            }
        });
    }
}

impl std::fmt::Debug for AuditDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditDispatcher").finish_non_exhaustive()
    }
}

/// Sink that emits each event as a structured `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: SecurityEvent) -> anyhow::Result<()> {
        tracing::info!(
            target: "audit",
            tenant_id = ?event.tenant_id,
            actor_id = ?event.actor_id,
            action = ?event.action,
            subject_type = %event.subject_type,
            subject_id = %event.subject_id,
            payload = %event.payload,
            "security event"
        );
        Ok(())
    }
}

/// In-memory sink that keeps every event. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<SecurityEvent>>,
}

impl RecordingAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: SecurityEvent) -> anyhow::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}
