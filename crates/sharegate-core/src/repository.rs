use crate::error::StorageError;
use crate::link::{LinkId, OwnerId, ShareLink};
use async_trait::async_trait;
use jiff::Timestamp;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of a share-link store.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the link for a given id, whatever its status.
    /// Returns `None` if the id does not exist.
    async fn get(&self, id: &LinkId) -> Result<Option<ShareLink>>;

    /// Returns every link created by `owner`, most recent first.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<ShareLink>>;
}

/// A durable, keyed share-link store.
///
/// Every mutation is atomic per record: concurrent callers never observe a
/// half-written link and never lose an increment.
#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new link. Returns `Err(Conflict)` if the id already exists.
    async fn insert(&self, link: &ShareLink) -> Result<()>;

    /// Atomically increments `access_count` if the link is active and
    /// `now < expires_at`, returning the updated record.
    ///
    /// Returns `None` when the link is missing, revoked, or expired at `now`.
    async fn record_access(&self, id: &LinkId, now: Timestamp) -> Result<Option<ShareLink>>;

    /// Clears `is_active`. Returns `true` if the link exists, revoked or not.
    async fn deactivate(&self, id: &LinkId) -> Result<bool>;

    /// Permanently removes a link.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, id: &LinkId) -> Result<bool>;

    /// Removes every link whose `expires_at` is strictly before `cutoff`.
    /// Returns how many records were removed.
    async fn purge_expired_before(&self, cutoff: Timestamp) -> Result<u64>;
}

/// Orders links most recent first, breaking ties on the id.
pub fn sort_most_recent_first(links: &mut [ShareLink]) {
    links.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
