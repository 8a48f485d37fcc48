use crate::events::AuditEvent;

/// Destination for audit events; transport is up to the implementor
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}
