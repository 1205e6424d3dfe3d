//! Library endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::library::{CreateLibrary, Library},
};

use super::AppJson;

/// Create a library
#[utoipa::path(
    post,
    path = "/libraries",
    tag = "libraries",
    request_body = CreateLibrary,
    responses(
        (status = 201, description = "Library created", body = Library),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_library(
    State(state): State<crate::AppState>,
    AppJson(data): AppJson<CreateLibrary>,
) -> AppResult<(StatusCode, Json<Library>)> {
    let library = state.services.libraries.create(data).await?;
    Ok((StatusCode::CREATED, Json(library)))
}
