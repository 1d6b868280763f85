use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, health_handler,
    list_links_handler, resolve_shared_handler, revoke_link_handler, unavailable_shared_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/shared/{id}",
                get(resolve_shared_handler).fallback(unavailable_shared_handler),
            )
            .nest(
                "/v1/links",
                Router::new()
                    .route("/", post(create_link_handler).get(list_links_handler))
                    .route("/{id}", get(get_link_handler).delete(delete_link_handler))
                    .route("/{id}/revoke", post(revoke_link_handler)),
            )
            .fallback(fallback_handler)
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .with_state(state)
    }
}

async fn fallback_handler(uri: Uri) -> Response {
    let path = uri.path();
    if path == "/shared" || path.starts_with("/shared/") {
        unavailable_shared_handler().await
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Request span without the query string, which carries capability tokens.
fn request_span(request: &Request<Body>) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
    )
}
