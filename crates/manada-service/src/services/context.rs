//! Service context - dependency container for services
//!
//! Holds all repositories, the change publisher and other dependencies
//! needed by services.

use std::sync::Arc;

use manada_cache::RedisPool;
use manada_common::{AdminConfig, AppConfig, FeedConfig, JwtService};
use manada_core::{
    AdRepository, ChangeEvent, ChangePublisher, ConsistencyMode, DocId, DocumentRepository,
    MarkerRepository, MomentRepository, NotificationRepository,
};
use manada_db::{MemoryChangeBus, MemoryStore, PgPool};
use tracing::warn;

use super::analytics::AnalyticsStore;
use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct ServiceContext {
    // Connection pools, present only for the backends in use
    pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,

    // Repositories
    document_repo: Arc<dyn DocumentRepository>,
    marker_repo: Arc<dyn MarkerRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    ad_repo: Arc<dyn AdRepository>,
    moment_repo: Arc<dyn MomentRepository>,

    // Change fan-out
    publisher: Arc<dyn ChangePublisher>,

    analytics: AnalyticsStore,
    jwt_service: Arc<JwtService>,

    // Settings
    consistency: ConsistencyMode,
    feed: FeedConfig,
    admins: Arc<AdminConfig>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    /// Context over a single in-memory store; used by tests and local runs
    pub fn in_memory(config: &AppConfig, store: MemoryStore, bus: MemoryChangeBus) -> Self {
        Self {
            pool: None,
            redis_pool: None,
            document_repo: Arc::new(store.clone()),
            marker_repo: Arc::new(store.clone()),
            notification_repo: Arc::new(store.clone()),
            ad_repo: Arc::new(store.clone()),
            moment_repo: Arc::new(store),
            publisher: Arc::new(bus),
            analytics: AnalyticsStore::default(),
            jwt_service: Arc::new(JwtService::from_config(&config.jwt)),
            consistency: config.reactions.consistency,
            feed: config.feed,
            admins: Arc::new(config.admin.clone()),
        }
    }

    // === Pools ===

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub fn redis_pool(&self) -> Option<&RedisPool> {
        self.redis_pool.as_ref()
    }

    // === Repositories ===

    pub fn document_repo(&self) -> &dyn DocumentRepository {
        self.document_repo.as_ref()
    }

    pub fn marker_repo(&self) -> &dyn MarkerRepository {
        self.marker_repo.as_ref()
    }

    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    pub fn ad_repo(&self) -> &dyn AdRepository {
        self.ad_repo.as_ref()
    }

    pub fn moment_repo(&self) -> &dyn MomentRepository {
        self.moment_repo.as_ref()
    }

    // === Change events ===

    pub fn publisher(&self) -> &dyn ChangePublisher {
        self.publisher.as_ref()
    }

    /// Publish change events; failures are logged and never fail the write
    pub async fn publish_changes(&self, events: &[ChangeEvent]) {
        for event in events {
            if let Err(e) = self.publisher.publish(event).await {
                warn!(
                    collection = %event.collection,
                    doc_id = %event.doc_id,
                    error = %e,
                    "Failed to publish change event"
                );
            }
        }
    }

    // === Misc ===

    pub fn analytics(&self) -> &AnalyticsStore {
        &self.analytics
    }

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn consistency(&self) -> ConsistencyMode {
        self.consistency
    }

    pub fn feed_config(&self) -> FeedConfig {
        self.feed
    }

    pub fn is_admin(&self, user_id: &DocId) -> bool {
        self.admins.is_admin(user_id.as_str())
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("redis_pool", &self.redis_pool.as_ref().map(|_| "RedisPool"))
            .field("repositories", &"...")
            .field("consistency", &self.consistency)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,
    document_repo: Option<Arc<dyn DocumentRepository>>,
    marker_repo: Option<Arc<dyn MarkerRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    ad_repo: Option<Arc<dyn AdRepository>>,
    moment_repo: Option<Arc<dyn MomentRepository>>,
    publisher: Option<Arc<dyn ChangePublisher>>,
    analytics: Option<AnalyticsStore>,
    jwt_service: Option<Arc<JwtService>>,
    consistency: ConsistencyMode,
    feed: FeedConfig,
    admins: AdminConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take settings (consistency, feed, admins, JWT) from the app config
    pub fn config(mut self, config: &AppConfig) -> Self {
        self.consistency = config.reactions.consistency;
        self.feed = config.feed;
        self.admins = config.admin.clone();
        self.jwt_service = Some(Arc::new(JwtService::from_config(&config.jwt)));
        self
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: RedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn document_repo(mut self, repo: Arc<dyn DocumentRepository>) -> Self {
        self.document_repo = Some(repo);
        self
    }

    pub fn marker_repo(mut self, repo: Arc<dyn MarkerRepository>) -> Self {
        self.marker_repo = Some(repo);
        self
    }

    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    pub fn ad_repo(mut self, repo: Arc<dyn AdRepository>) -> Self {
        self.ad_repo = Some(repo);
        self
    }

    pub fn moment_repo(mut self, repo: Arc<dyn MomentRepository>) -> Self {
        self.moment_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn ChangePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn analytics(mut self, store: AnalyticsStore) -> Self {
        self.analytics = Some(store);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn consistency(mut self, mode: ConsistencyMode) -> Self {
        self.consistency = mode;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext {
            pool: self.pool,
            redis_pool: self.redis_pool,
            document_repo: required(self.document_repo, "document_repo")?,
            marker_repo: required(self.marker_repo, "marker_repo")?,
            notification_repo: required(self.notification_repo, "notification_repo")?,
            ad_repo: required(self.ad_repo, "ad_repo")?,
            moment_repo: required(self.moment_repo, "moment_repo")?,
            publisher: required(self.publisher, "publisher")?,
            analytics: self.analytics.unwrap_or_default(),
            jwt_service: required(self.jwt_service, "jwt_service")?,
            consistency: self.consistency,
            feed: self.feed,
            admins: Arc::new(self.admins),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_repositories() {
        let err = ServiceContextBuilder::new()
            .config(&AppConfig::local("secret"))
            .build()
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("document_repo"));
    }

    #[test]
    fn test_builder_with_memory_store() {
        let store = MemoryStore::new();
        let ctx = ServiceContextBuilder::new()
            .config(&AppConfig::local("secret"))
            .document_repo(Arc::new(store.clone()))
            .marker_repo(Arc::new(store.clone()))
            .notification_repo(Arc::new(store.clone()))
            .ad_repo(Arc::new(store.clone()))
            .moment_repo(Arc::new(store))
            .publisher(Arc::new(MemoryChangeBus::new()))
            .consistency(ConsistencyMode::ClientBatch)
            .build()
            .unwrap();
        assert_eq!(ctx.consistency(), ConsistencyMode::ClientBatch);
        assert!(ctx.pool().is_none());
    }

    #[test]
    fn test_admin_lookup() {
        let mut config = AppConfig::local("secret");
        config.admin.user_ids = vec!["root".to_string()];
        let ctx = ServiceContext::in_memory(&config, MemoryStore::new(), MemoryChangeBus::new());
        assert!(ctx.is_admin(&DocId::parse("root").unwrap()));
        assert!(!ctx.is_admin(&DocId::parse("someone").unwrap()));
    }
}
