//! Audit events - one structured record per workflow invocation
//!
//! Emitted for every externally exposed operation, whether it succeeded or
//! failed, so a sink can reconstruct who attempted what against which club.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{DomainError, ErrorKind};
use crate::value_objects::{ClubId, UserId};

/// Result of an audited operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure { code: &'static str, kind: ErrorKind },
}

impl AuditOutcome {
    pub fn from_error(err: &DomainError) -> Self {
        Self::Failure {
            code: err.code(),
            kind: err.kind(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Structured audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    pub operation: &'static str,
    pub actor_id: UserId,
    pub club_id: Option<ClubId>,
    pub outcome: AuditOutcome,
    pub duration_ms: u64,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        operation: &'static str,
        actor_id: UserId,
        club_id: Option<ClubId>,
        outcome: AuditOutcome,
        duration_ms: u64,
    ) -> Self {
        Self {
            operation,
            actor_id,
            club_id,
            outcome,
            duration_ms,
            occurred_at: Utc::now(),
        }
    }
}
