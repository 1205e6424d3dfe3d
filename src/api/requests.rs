//! Borrow request endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::request::{ApprovalResponse, CreateRequest, RejectionResponse, RequestEvent},
};

use super::{AppJson, AppPath, AuthenticatedUser};

/// Pending requests of a library
#[derive(Serialize, ToSchema)]
pub struct RequestsListResponse {
    pub requests: Vec<RequestEvent>,
}

/// Raise a borrow request (readers only)
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = RequestEvent),
        (status = 403, description = "Reader of the book's library required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "A pending request already exists")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(data): AppJson<CreateRequest>,
) -> AppResult<(StatusCode, Json<RequestEvent>)> {
    claims.require_reader()?;

    let request = state.services.requests.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List pending requests for the admin's library
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending requests", body = RequestsListResponse),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<RequestsListResponse>> {
    claims.require_admin()?;

    let requests = state.services.requests.list_pending(&claims).await?;
    Ok(Json(RequestsListResponse { requests }))
}

/// Approve a pending request and issue the book
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request approved", body = ApprovalResponse),
        (status = 400, description = "No copies available or request already resolved"),
        (status = 403, description = "Admin of the book's library required"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(req_id): AppPath<i32>,
) -> AppResult<Json<ApprovalResponse>> {
    claims.require_admin()?;

    let (request, issue) = state.services.requests.approve(&claims, req_id).await?;
    Ok(Json(ApprovalResponse {
        message: "Request approved and book issued".to_string(),
        request,
        issue,
    }))
}

/// Reject a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request rejected", body = RejectionResponse),
        (status = 400, description = "Request already resolved"),
        (status = 403, description = "Admin of the book's library required"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(req_id): AppPath<i32>,
) -> AppResult<Json<RejectionResponse>> {
    claims.require_admin()?;

    let request = state.services.requests.reject(&claims, req_id).await?;
    Ok(Json(RejectionResponse {
        message: "Request rejected".to_string(),
        request,
    }))
}
