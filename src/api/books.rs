//! Book inventory endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{BookInventory, BookResponse, CreateBook, UpdateBook},
    repository::books::AddOutcome,
};

use super::{AppJson, AppPath, AuthenticatedUser};

/// Books of the caller's library
#[derive(Serialize, ToSchema)]
pub struct BooksListResponse {
    pub books: Vec<BookInventory>,
}

/// List every book of the caller's library
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Books of the caller's library", body = BooksListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<BooksListResponse>> {
    let books = state.services.books.list_for_caller(&claims).await?;
    Ok(Json(BooksListResponse { books }))
}

/// Add a book, or one more copy of a book already held
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 200, description = "Copy added to existing book", body = BookResponse),
        (status = 400, description = "ISBN or title missing"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "ISBN held by another library")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(data): AppJson<CreateBook>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    claims.require_admin()?;

    let (book, outcome) = state.services.books.add(&claims, data).await?;

    let (status, message) = match outcome {
        AddOutcome::Created => (StatusCode::CREATED, "Book added successfully"),
        AddOutcome::Restocked => (StatusCode::OK, "Book copies updated successfully"),
    };

    Ok((
        status,
        Json(BookResponse {
            message: message.to_string(),
            book,
        }),
    ))
}

/// Update descriptive fields of a book
#[utoipa::path(
    put,
    path = "/books/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookInventory),
        (status = 403, description = "Admin of the book's library required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(isbn): AppPath<String>,
    AppJson(data): AppJson<UpdateBook>,
) -> AppResult<Json<BookInventory>> {
    claims.require_admin()?;

    let book = state.services.books.update(&claims, &isbn, data).await?;
    Ok(Json(book))
}

/// Remove one copy of a book
#[utoipa::path(
    delete,
    path = "/books/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Copy removed", body = BookResponse),
        (status = 400, description = "No available copies to remove"),
        (status = 403, description = "Admin of the book's library required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn remove_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(isbn): AppPath<String>,
) -> AppResult<Json<BookResponse>> {
    claims.require_admin()?;

    let book = state.services.books.remove(&claims, &isbn).await?;
    Ok(Json(BookResponse {
        message: "Book copy removed successfully".to_string(),
        book,
    }))
}
