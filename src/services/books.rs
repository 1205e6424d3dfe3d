//! Inventory management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{BookInventory, CreateBook, UpdateBook},
    models::user::UserClaims,
    repository::{books::AddOutcome, Repository},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Books of the caller's library
    pub async fn list_for_caller(&self, claims: &UserClaims) -> AppResult<Vec<BookInventory>> {
        let caller = self.repository.users.get_caller(claims.id).await?;
        self.repository.books.list_by_library(caller.lib_id).await
    }

    /// Add a copy to the caller's library, creating the book on first add
    pub async fn add(&self, claims: &UserClaims, data: CreateBook) -> AppResult<(BookInventory, AddOutcome)> {
        let caller = self.repository.users.get_caller(claims.id).await?;
        caller.require_admin()?;

        let data = data.normalized();
        data.validate()?;

        let isbn = data.isbn.clone();
        match self.repository.books.add_copy(data, caller.lib_id).await {
            Ok((book, outcome)) => {
                tracing::info!(
                    "Book {} {:?} in library {} ({}/{} available)",
                    book.isbn, outcome, book.lib_id, book.available_copies, book.total_copies
                );
                Ok((book, outcome))
            }
            Err(e) => {
                tracing::warn!("Adding book {} to library {} refused: {}", isbn, caller.lib_id, e);
                Err(e)
            }
        }
    }

    /// Withdraw one copy
    pub async fn remove(&self, claims: &UserClaims, isbn: &str) -> AppResult<BookInventory> {
        let caller = self.repository.users.get_caller(claims.id).await?;
        caller.require_admin()?;

        let book = self.repository.books.remove_copy(isbn, &caller).await?;
        tracing::info!(
            "Copy of {} removed from library {} ({}/{} available)",
            book.isbn, book.lib_id, book.available_copies, book.total_copies
        );
        Ok(book)
    }

    /// Update title, authors, publisher and version
    pub async fn update(&self, claims: &UserClaims, isbn: &str, data: UpdateBook) -> AppResult<BookInventory> {
        let caller = self.repository.users.get_caller(claims.id).await?;
        caller.require_admin()?;

        let data = data.normalized();
        data.validate()?;

        self.repository.books.update(isbn, data, &caller).await
    }
}
