use crate::auth::Owner;
use crate::error::{AppError, Result};
use crate::model::{CreateLinkRequest, CreatedLinkResponse, LinkResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sharegate_core::{CreateParams, LinkId, ShareError, SubjectId};
use std::time::Duration;

/// Owner API ids come from the path; one that cannot exist is reported as
/// not found rather than malformed.
fn parse_id(id: String) -> Result<LinkId> {
    LinkId::parse(id.as_str()).map_err(|_| AppError::Share(ShareError::NotFound(id)))
}

pub async fn create_link_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
    request: std::result::Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedLinkResponse>)> {
    let Json(request) = request.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let subject_ids = request
        .subject_ids
        .into_iter()
        .map(SubjectId::new)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(ShareError::from)?;

    let created = state
        .links()
        .create(
            &owner,
            CreateParams {
                subject_ids,
                ttl: Duration::from_secs(request.ttl_seconds),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn list_links_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<Vec<LinkResponse>>> {
    let links = state.links().list_for_owner(&owner).await?;
    Ok(Json(links.into_iter().map(LinkResponse::from).collect()))
}

pub async fn get_link_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<LinkResponse>> {
    let id = parse_id(id)?;
    let summary = state.links().inspect(&id, &owner).await?;
    Ok(Json(summary.into()))
}

pub async fn revoke_link_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(id)?;
    state.links().revoke(&id, &owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_link_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(id)?;
    state.links().delete(&id, &owner).await?;
    Ok(StatusCode::NO_CONTENT)
}
