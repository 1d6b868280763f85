use crate::model::{ErrorResponse, SharedLinkResponse};
use crate::state::AppState;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{CACHE_CONTROL, REFERRER_POLICY};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use sharegate_core::Unavailable;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    token: String,
}

const PRIVATE_HEADERS: [(axum::http::HeaderName, &str); 2] =
    [(CACHE_CONTROL, "no-store"), (REFERRER_POLICY, "no-referrer")];

/// Public resolution of a capability URL.
///
/// Every failure, including a malformed path or query string, gets the same `404`
/// response so that callers learn nothing about why.
pub async fn resolve_shared_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Response {
    let id = id.map(|Path(id)| id).unwrap_or_default();
    let token = query.map(|Query(q)| q.token).unwrap_or_default();

    match state.links().resolve(&id, &token).await {
        Ok(link) => (
            StatusCode::OK,
            PRIVATE_HEADERS,
            Json(SharedLinkResponse::from(link)),
        )
            .into_response(),
        Err(Unavailable) => unavailable(),
    }
}

/// Anything under `/shared` that is not a well-formed `GET /shared/{id}`.
pub async fn unavailable_shared_handler() -> Response {
    unavailable()
}

fn unavailable() -> Response {
    (
        StatusCode::NOT_FOUND,
        PRIVATE_HEADERS,
        Json(ErrorResponse {
            error: Unavailable.to_string(),
        }),
    )
        .into_response()
}
