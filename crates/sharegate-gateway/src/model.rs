//! Request and response bodies.

mod link;

pub use link::{CreateLinkRequest, CreatedLinkResponse, LinkResponse, SharedLinkResponse};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
