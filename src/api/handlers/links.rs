//! Handlers for the link registry endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, DeleteResponse, LinkListResponse, LinkResponse};
use crate::api::dto::pagination::ListLinksParams;
use crate::error::AppError;
use crate::state::AppState;

/// Lists links with filtering, sorting and pagination.
///
/// # Endpoint
///
/// `GET /api/links`
///
/// # Query Parameters
///
/// - `search` - case-insensitive substring of the short code or long URL
/// - `sortBy` - `shortCode`, `longUrl`, `totalClicks`, `lastClickedAt` or `createdAt` (default)
/// - `sortOrder` - `asc` or `desc` (default)
/// - `page` (default 1), `limit` (default 100, max 1000)
/// - `minClicks`, `maxClicks` - inclusive click bounds
/// - `hasClicks` - `true`/`false`; overrides the click bounds when present
/// - `createdAfter`, `createdBefore`, `lastClickedAfter`, `lastClickedBefore` - RFC 3339
///
/// # Response
///
/// ```json
/// {
///   "links": [{ "shortCode": "aB3xY9", "longUrl": "https://example.com", ... }],
///   "total": 1,
///   "page": 1,
///   "limit": 100,
///   "totalPages": 1
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for malformed or out-of-range parameters.
pub async fn list_links_handler(
    State(state): State<AppState>,
    params: Result<Query<ListLinksParams>, QueryRejection>,
) -> Result<Json<LinkListResponse>, AppError> {
    let Query(params) = params?;
    let query = params.into_query()?;

    let page = state.link_service.list_links(&query).await?;

    Ok(Json(LinkListResponse::from_page(page, &state.base_url)))
}

/// Registers a new short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "longUrl": "https://example.com/a/b/c",
///   "shortCode": "mycode12"   // optional, 6-8 alphanumeric characters
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request with field details if validation fails.
/// Returns 409 Conflict if the short code is already taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let link = state
        .link_service
        .create_link(&payload.long_url, payload.short_code)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.base_url)),
    ))
}

/// Returns a single link without counting a visit.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&code).await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// The cached record and every cached listing are invalidated, so the code
/// stops resolving immediately.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.link_service.delete_link(&code).await?;

    Ok(Json(DeleteResponse::deleted()))
}
