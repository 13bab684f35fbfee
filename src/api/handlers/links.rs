//! Handlers for link management endpoints (create, list, info, delete).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::{CreateLinkRequest, LinkResponse, ListLinksResponse};
use crate::api::dto::pagination::ListParams;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "target": "https://example.com/docs",
///   "custom_code": "docs"   // optional
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: Link stored, body is the new link
/// - **400 Bad Request**: Target or custom code rejected
/// - **409 Conflict**: Custom code already in use
/// - **503 Service Unavailable**: No free generated code, or storage down
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(&payload.target, payload.custom_code())
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Lists links in creation order.
///
/// # Endpoint
///
/// `GET /api/links?offset=0&count=10`
///
/// # Query Parameters
///
/// - `offset` (optional): Links to skip (default: 0)
/// - `count` (optional): Page size (default: 10, clamped to 1-100)
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListLinksResponse>, AppError> {
    let (offset, count) = params.offset_and_count();

    let page = state.link_service.list_links(offset, count).await?;

    Ok(Json(ListLinksResponse::from_page(page, offset, count)))
}

/// Returns a link and its access count without counting an access.
///
/// # Endpoint
///
/// `GET /api/stats/{code}`
pub async fn link_info_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&code).await?;
    Ok(Json(link.into()))
}

/// Deletes a link by id. Its code becomes available again.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// # Response Codes
///
/// - **204 No Content**: Link deleted
/// - **404 Not Found**: No link with this id
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
