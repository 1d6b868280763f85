//! Core types and traits for the sharegate share-link service.
//!
//! This crate provides the domain model shared by the storage backends,
//! the link manager and the HTTP gateway.

pub mod auth;
pub mod clock;
pub mod error;
pub mod link;
pub mod repository;
pub mod service;

pub use auth::{AllowAll, IdentityProvider, SubjectAuthorizer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, ShareError, StorageError, Unavailable};
pub use link::{LinkId, LinkStatus, OwnerId, ShareLink, ShareToken, SubjectId};
pub use repository::{ReadRepository, Repository};
pub use service::{CreateParams, CreatedLink, LinkSummary, ShareLinks};
