//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! (PostgreSQL or the in-memory store) provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::entities::{Ad, AdStatus, Document, Moment, NotificationEvent, UserMarker};
use crate::error::DomainError;
use crate::events::ChangeEvent;
use crate::feed::FeedQuery;
use crate::mutation::{ToggleIntent, ToggleOutcome, WriteBatch};
use crate::value_objects::{DocId, ReactionTarget};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Document Repository
// ============================================================================

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Find document by collection and id
    async fn find_by_id(&self, collection: &str, id: &DocId) -> RepoResult<Option<Document>>;

    /// Create a new document
    async fn create(&self, doc: &Document) -> RepoResult<()>;

    /// Merge top-level fields into an existing document's data
    async fn merge_data(&self, collection: &str, id: &DocId, fields: &Map<String, Value>) -> RepoResult<()>;

    /// Delete a document; returns whether it existed
    async fn delete(&self, collection: &str, id: &DocId) -> RepoResult<bool>;

    /// Run a feed query
    async fn query(&self, query: &FeedQuery) -> RepoResult<Vec<Document>>;

    /// Apply every op of the batch, or none of them
    async fn commit(&self, batch: &WriteBatch) -> RepoResult<()>;
}

// ============================================================================
// Marker Repository
// ============================================================================

#[async_trait]
pub trait MarkerRepository: Send + Sync {
    /// Find the marker of a user on a parent
    async fn find(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        user_id: &DocId,
    ) -> RepoResult<Option<UserMarker>>;

    /// Count markers on a parent
    async fn count_for(&self, target: &ReactionTarget, parent_id: &DocId) -> RepoResult<i64>;

    /// Read the marker, decide, and write the batch inside one transaction.
    ///
    /// Concurrent calls for the same `(parent, user)` are serialized, so the
    /// decision always sees the marker left by the previous call.
    async fn toggle_atomic(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        actor_id: &DocId,
        intent: &ToggleIntent,
        now: DateTime<Utc>,
    ) -> RepoResult<ToggleOutcome>;
}

// ============================================================================
// Notification Repository
// ============================================================================

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Find notification by ID
    async fn find_by_id(&self, id: &DocId) -> RepoResult<Option<NotificationEvent>>;

    /// List a recipient's notifications, newest first
    async fn list_for(
        &self,
        recipient_id: &DocId,
        unread_only: bool,
        limit: i64,
    ) -> RepoResult<Vec<NotificationEvent>>;

    /// Mark as read; returns whether the notification existed
    async fn mark_read(&self, id: &DocId) -> RepoResult<bool>;
}

// ============================================================================
// Ad Repository
// ============================================================================

/// Filters for ad listings
#[derive(Debug, Clone, Default)]
pub struct AdQuery {
    pub status: Option<AdStatus>,
    pub advertiser_id: Option<DocId>,
    pub limit: i64,
}

#[async_trait]
pub trait AdRepository: Send + Sync {
    /// Find ad by ID
    async fn find_by_id(&self, id: &DocId) -> RepoResult<Option<Ad>>;

    /// List ads, newest first
    async fn list(&self, query: &AdQuery) -> RepoResult<Vec<Ad>>;

    /// Create a new ad
    async fn create(&self, ad: &Ad) -> RepoResult<()>;

    /// Overwrite an ad's editable content. Status and rejection reason
    /// only change through `update_if_status`.
    async fn update(&self, ad: &Ad) -> RepoResult<()>;

    /// Write the ad only if its stored status is still `expected`.
    /// Returns false when another writer moved the status first.
    async fn update_if_status(&self, ad: &Ad, expected: AdStatus) -> RepoResult<bool>;

    /// Delete an ad; returns whether it existed
    async fn delete(&self, id: &DocId) -> RepoResult<bool>;
}

// ============================================================================
// Moment Repository
// ============================================================================

#[async_trait]
pub trait MomentRepository: Send + Sync {
    /// Find moment by ID (expired ones included)
    async fn find_by_id(&self, id: &DocId) -> RepoResult<Option<Moment>>;

    /// Create a new moment
    async fn create(&self, moment: &Moment) -> RepoResult<()>;

    /// Moments with `expires_at > now`, newest first
    async fn list_active(
        &self,
        now: DateTime<Utc>,
        author_id: Option<&DocId>,
        limit: i64,
    ) -> RepoResult<Vec<Moment>>;

    /// Delete moments with `expires_at <= now`; returns how many were removed
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Change Publisher
// ============================================================================

/// Fan-out of document change events to live subscribers
#[async_trait]
pub trait ChangePublisher: Send + Sync {
    async fn publish(&self, event: &ChangeEvent) -> RepoResult<()>;
}
