//! Seams to the identity and authorization collaborators.

use crate::link::{OwnerId, SubjectId};
use async_trait::async_trait;

/// Maps a caller credential to the identity it belongs to.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Returns `None` for unknown or malformed credentials.
    async fn identify(&self, credential: &str) -> Option<OwnerId>;
}

/// Decides whether an owner may share a given assessment record.
#[async_trait]
pub trait SubjectAuthorizer: Send + Sync + 'static {
    async fn can_share(&self, owner: &OwnerId, subject: &SubjectId) -> bool;
}

/// Lets every authenticated owner share any subject.
///
/// Suitable when the backing data store already scopes which records an owner
/// can reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl SubjectAuthorizer for AllowAll {
    async fn can_share(&self, _owner: &OwnerId, _subject: &SubjectId) -> bool {
        true
    }
}
