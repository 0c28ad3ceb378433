//! Audit sink for the in-memory backend. Writes events to tracing output.

use async_trait::async_trait;
use tracing::info;

use vendorhub_application::{AuditEvent, AuditRepository};
use vendorhub_core::AppResult;

/// Audit repository that logs every event instead of persisting it.
#[derive(Clone, Debug)]
pub struct TracingAuditRepository;

impl TracingAuditRepository {
    /// Creates a new tracing audit repository.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingAuditRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditRepository for TracingAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        info!(
            subject = %event.subject,
            action = event.action.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            detail = event.detail.as_deref().unwrap_or_default(),
            "audit event"
        );

        Ok(())
    }
}
