//! Service context - dependency container for services
//!
//! Holds the repositories, collaborator directories, the system capability
//! cache and the audit sink needed by services.

use std::sync::Arc;

use club_cache::SharedCapabilityCache;
use club_common::PaginationConfig;
use club_core::traits::{
    AuditSink, ClubDirectory, InvitationRepository, MembershipRepository, UserDirectory,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Membership and invitation repositories
/// - Club and user lookups owned by other systems
/// - The system capability cache
/// - The audit sink
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    membership_repo: Arc<dyn MembershipRepository>,
    invitation_repo: Arc<dyn InvitationRepository>,

    // External collaborators
    club_directory: Arc<dyn ClubDirectory>,
    user_directory: Arc<dyn UserDirectory>,

    // Authorization
    capability_cache: SharedCapabilityCache,

    // Audit
    audit_sink: Arc<dyn AuditSink>,

    pagination: PaginationConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        membership_repo: Arc<dyn MembershipRepository>,
        invitation_repo: Arc<dyn InvitationRepository>,
        club_directory: Arc<dyn ClubDirectory>,
        user_directory: Arc<dyn UserDirectory>,
        capability_cache: SharedCapabilityCache,
        audit_sink: Arc<dyn AuditSink>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            membership_repo,
            invitation_repo,
            club_directory,
            user_directory,
            capability_cache,
            audit_sink,
            pagination,
        }
    }

    // === Repositories ===

    /// Get the membership repository
    pub fn membership_repo(&self) -> &dyn MembershipRepository {
        self.membership_repo.as_ref()
    }

    /// Get the invitation repository
    pub fn invitation_repo(&self) -> &dyn InvitationRepository {
        self.invitation_repo.as_ref()
    }

    // === External collaborators ===

    pub fn club_directory(&self) -> &dyn ClubDirectory {
        self.club_directory.as_ref()
    }

    pub fn user_directory(&self) -> &dyn UserDirectory {
        self.user_directory.as_ref()
    }

    // === Authorization / audit ===

    /// Get the system capability cache
    pub fn capability_cache(&self) -> &SharedCapabilityCache {
        &self.capability_cache
    }

    /// Get the audit sink
    pub fn audit_sink(&self) -> &dyn AuditSink {
        self.audit_sink.as_ref()
    }

    /// Page size bounds for listings
    pub fn pagination(&self) -> PaginationConfig {
        self.pagination
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("directories", &"...")
            .field("capability_cache", &"SharedCapabilityCache")
            .field("pagination", &self.pagination)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    membership_repo: Option<Arc<dyn MembershipRepository>>,
    invitation_repo: Option<Arc<dyn InvitationRepository>>,
    club_directory: Option<Arc<dyn ClubDirectory>>,
    user_directory: Option<Arc<dyn UserDirectory>>,
    capability_cache: Option<SharedCapabilityCache>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    pagination: PaginationConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            membership_repo: None,
            invitation_repo: None,
            club_directory: None,
            user_directory: None,
            capability_cache: None,
            audit_sink: None,
            pagination: PaginationConfig::default(),
        }
    }

    pub fn membership_repo(mut self, repo: Arc<dyn MembershipRepository>) -> Self {
        self.membership_repo = Some(repo);
        self
    }

    pub fn invitation_repo(mut self, repo: Arc<dyn InvitationRepository>) -> Self {
        self.invitation_repo = Some(repo);
        self
    }

    pub fn club_directory(mut self, directory: Arc<dyn ClubDirectory>) -> Self {
        self.club_directory = Some(directory);
        self
    }

    pub fn user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.user_directory = Some(directory);
        self
    }

    pub fn capability_cache(mut self, cache: SharedCapabilityCache) -> Self {
        self.capability_cache = Some(cache);
        self
    }

    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.membership_repo
                .ok_or_else(|| ServiceError::validation("membership_repo is required"))?,
            self.invitation_repo
                .ok_or_else(|| ServiceError::validation("invitation_repo is required"))?,
            self.club_directory
                .ok_or_else(|| ServiceError::validation("club_directory is required"))?,
            self.user_directory
                .ok_or_else(|| ServiceError::validation("user_directory is required"))?,
            self.capability_cache
                .ok_or_else(|| ServiceError::validation("capability_cache is required"))?,
            self.audit_sink
                .ok_or_else(|| ServiceError::validation("audit_sink is required"))?,
            self.pagination,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
