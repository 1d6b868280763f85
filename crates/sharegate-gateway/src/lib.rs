//! HTTP gateway for sharegate.
//!
//! Serves the public `GET /shared/{id}?token=...` resolution endpoint and the
//! authenticated owner API under `/v1/links`.

pub mod app;
pub mod auth;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use auth::StaticIdentityProvider;
pub use error::AppError;
pub use state::AppState;
