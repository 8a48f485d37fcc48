//! Wiring of a `ServiceContext` from `AppConfig`

use std::sync::Arc;
use std::time::Duration;

use club_cache::{InMemoryCapabilityCache, RedisCapabilityCache, RedisPool, SharedCapabilityCache};
use club_common::{AppConfig, AppError, StoreBackend};
use club_core::traits::{AuditSink, ClubDirectory, UserDirectory};
use club_db::{
    open_pg_store, KvInvitationRepository, KvMembershipRepository, MemoryItemStore,
    SharedItemStore,
};
use tracing::{info, warn};

use crate::services::{ServiceContext, ServiceContextBuilder, ServiceResult};

/// Open the configured item store
pub async fn open_store(config: &AppConfig) -> ServiceResult<SharedItemStore> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory item store");
            Ok(Arc::new(MemoryItemStore::new()))
        }
        StoreBackend::Postgres => {
            let database = config.store.database.as_ref().ok_or_else(|| {
                AppError::Config("DATABASE_URL is required for the postgres store".to_string())
            })?;
            let store = open_pg_store(database)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
            Ok(Arc::new(store))
        }
    }
}

/// Build the system capability cache.
///
/// Redis when configured and reachable; an unreachable Redis falls back to
/// the in-process cache.
pub async fn capability_cache(config: &AppConfig) -> ServiceResult<SharedCapabilityCache> {
    let ttl = Duration::from_secs(config.authz.system_cache_ttl_secs);
    let Some(redis) = &config.redis else {
        return Ok(Arc::new(InMemoryCapabilityCache::new(ttl)));
    };

    let pool = RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
    if let Err(e) = pool.health_check().await {
        warn!(error = %e, "Redis unreachable, using in-process capability cache");
        return Ok(Arc::new(InMemoryCapabilityCache::new(ttl)));
    }
    info!(ttl_secs = ttl.as_secs(), "Using Redis capability cache");
    Ok(Arc::new(RedisCapabilityCache::new(pool, ttl)))
}

/// Assemble a service context over the configured store and cache
pub async fn build_context(
    config: &AppConfig,
    club_directory: Arc<dyn ClubDirectory>,
    user_directory: Arc<dyn UserDirectory>,
    audit_sink: Arc<dyn AuditSink>,
) -> ServiceResult<ServiceContext> {
    let store = open_store(config).await?;

    ServiceContextBuilder::new()
        .membership_repo(Arc::new(KvMembershipRepository::new(store.clone())))
        .invitation_repo(Arc::new(KvInvitationRepository::new(store)))
        .club_directory(club_directory)
        .user_directory(user_directory)
        .capability_cache(capability_cache(config).await?)
        .audit_sink(audit_sink)
        .pagination(config.pagination)
        .build()
}
