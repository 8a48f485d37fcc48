//! Audit emission for workflow operations

use std::future::Future;
use std::time::Instant;

use club_common::AUDIT_TARGET;
use club_core::{ActorContext, AuditEvent, AuditOutcome, AuditSink, ClubId};

use super::error::ServiceResult;

/// Audit sink that writes each event as a structured tracing event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let club_id = event.club_id.as_ref().map(ToString::to_string);
        match &event.outcome {
            AuditOutcome::Success => tracing::info!(
                target: AUDIT_TARGET,
                operation = event.operation,
                actor_id = %event.actor_id,
                club_id = club_id.as_deref(),
                duration_ms = event.duration_ms,
                outcome = "success",
                "Audit"
            ),
            AuditOutcome::Failure { code, kind } => tracing::warn!(
                target: AUDIT_TARGET,
                operation = event.operation,
                actor_id = %event.actor_id,
                club_id = club_id.as_deref(),
                duration_ms = event.duration_ms,
                outcome = "failure",
                error_code = *code,
                error_kind = %kind,
                "Audit"
            ),
        }
    }
}

/// Run `operation` and record one audit event for its outcome
pub(crate) async fn audited<T, F>(
    sink: &dyn AuditSink,
    operation: &'static str,
    actor: &ActorContext,
    club_id: Option<&ClubId>,
    work: F,
) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    let started = Instant::now();
    let result = work.await;
    let outcome = match &result {
        Ok(_) => AuditOutcome::Success,
        Err(e) => e.audit_outcome(),
    };
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    sink.record(&AuditEvent::new(
        operation,
        actor.user_id.clone(),
        club_id.cloned(),
        outcome,
        duration_ms,
    ));
    result
}
