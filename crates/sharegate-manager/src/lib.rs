//! Share-link lifecycle management.
//!
//! This crate provides [`ShareLinkManager`], the implementation of the
//! [`ShareLinks`](sharegate_core::ShareLinks) service trait, and the
//! [`Sweeper`] that purges long-expired links in the background.

pub mod manager;
pub mod settings;
pub mod sweeper;

pub use manager::ShareLinkManager;
pub use settings::ManagerSettings;
pub use sweeper::Sweeper;
