//! Issue registry endpoints

use axum::{
    extract::State,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::issue::{IssueRecord, ReturnResponse},
};

use super::{AppPath, AuthenticatedUser};

/// Issue registry entries of a reader
#[derive(Serialize, ToSchema)]
pub struct IssueInfoResponse {
    pub info: Vec<IssueRecord>,
}

/// Issue registry of a reader in the admin's library
#[utoipa::path(
    get,
    path = "/readers/{id}/issues",
    tag = "issues",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Reader ID")
    ),
    responses(
        (status = 200, description = "Reader's issue registry", body = IssueInfoResponse),
        (status = 403, description = "Reader belongs to another library"),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn reader_issues(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(reader_id): AppPath<i32>,
) -> AppResult<Json<IssueInfoResponse>> {
    claims.require_admin()?;

    let info = state.services.issues.for_reader(&claims, reader_id).await?;
    Ok(Json(IssueInfoResponse { info }))
}

/// Record the return of an issued book
#[utoipa::path(
    post,
    path = "/issues/{id}/return",
    tag = "issues",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Already returned"),
        (status = 403, description = "Admin of the book's library required"),
        (status = 404, description = "Issue not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(issue_id): AppPath<i32>,
) -> AppResult<Json<ReturnResponse>> {
    claims.require_admin()?;

    let issue = state.services.issues.return_book(&claims, issue_id).await?;
    Ok(Json(ReturnResponse {
        message: "Book returned".to_string(),
        issue,
    }))
}
