use crate::error::{ShareError, Unavailable};
use crate::link::{LinkId, LinkStatus, OwnerId, ShareLink, SubjectId};
use async_trait::async_trait;
use std::time::Duration;

type Result<T> = std::result::Result<T, ShareError>;

/// Parameters for creating a share link.
#[derive(Debug, Clone)]
pub struct CreateParams {
    /// The assessment records to expose, in display order.
    pub subject_ids: Vec<SubjectId>,
    /// How long the link stays resolvable after creation.
    pub ttl: Duration,
}

/// A freshly created link together with its public capability URL.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub link: ShareLink,
    pub url: String,
}

/// Owner-facing view of a link, with its status at the time of the call.
#[derive(Debug, Clone)]
pub struct LinkSummary {
    pub link: ShareLink,
    pub status: LinkStatus,
}

#[async_trait]
pub trait ShareLinks: Send + Sync + 'static {
    /// Creates and persists a new link owned by `owner`.
    async fn create(&self, owner: &OwnerId, params: CreateParams) -> Result<CreatedLink>;

    /// Resolves a link for an anonymous holder of `token`.
    ///
    /// On success the access is counted and the updated record returned.
    /// Every failure is reported as the same [`Unavailable`] value.
    async fn resolve(&self, id: &str, token: &str) -> std::result::Result<ShareLink, Unavailable>;

    /// Returns one of `owner`'s links along with its current status.
    async fn inspect(&self, id: &LinkId, owner: &OwnerId) -> Result<LinkSummary>;

    /// Revokes a link. Revoking an already revoked link succeeds.
    async fn revoke(&self, id: &LinkId, owner: &OwnerId) -> Result<()>;

    /// Permanently deletes one of `owner`'s links.
    async fn delete(&self, id: &LinkId, owner: &OwnerId) -> Result<()>;

    /// Lists every link created by `owner`, most recent first, expired and
    /// revoked ones included.
    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<LinkSummary>>;

    /// Deletes links that expired more than `retention` ago.
    /// Returns the number of purged records.
    async fn sweep_expired(&self, retention: Duration) -> Result<u64>;
}
