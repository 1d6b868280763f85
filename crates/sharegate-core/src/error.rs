use thiserror::Error;

/// Errors raised while parsing or validating share-link identifiers.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid link id: {0}")]
    InvalidLinkId(String),
    #[error("invalid subject id: {0}")]
    InvalidSubjectId(String),
    #[error("invalid owner id: {0}")]
    InvalidOwnerId(String),
}

/// Errors reported by a persistence backend.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("link id already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Owner-facing errors of the share-link service.
///
/// These are distinguishable on purpose: the owner needs actionable feedback.
/// The anonymous resolution path never sees them, see [`Unavailable`].
#[derive(Debug, Clone, Error)]
pub enum ShareError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not authorized: {0}")]
    Authorization(String),
    #[error("share link not found: {0}")]
    NotFound(String),
    #[error("persistence failed: {0}")]
    Persistence(#[from] StorageError),
}

impl From<CoreError> for ShareError {
    fn from(value: CoreError) -> Self {
        Self::Validation(value.to_string())
    }
}

/// The single outcome of a failed anonymous resolution.
///
/// Missing ids, wrong tokens, revoked links, expired links and store failures
/// all collapse into this value so callers cannot tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("link unavailable")]
pub struct Unavailable;
