//! Book inventory model and copy-count rules

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// One inventory row per ISBN. The owning library never changes.
///
/// Copy counts always satisfy `0 <= available_copies <= total_copies`; every
/// mutation below checks its precondition before touching them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInventory {
    pub isbn: String,
    pub lib_id: i32,
    pub title: String,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<i32>,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl BookInventory {
    /// First copy of a new ISBN in a library
    pub fn first_copy(data: CreateBook, lib_id: i32) -> Self {
        Self {
            isbn: data.isbn,
            lib_id,
            title: data.title,
            authors: data.authors,
            publisher: data.publisher,
            version: data.version,
            total_copies: 1,
            available_copies: 1,
        }
    }

    /// Add one shelved copy
    pub fn restock(&mut self) {
        self.total_copies += 1;
        self.available_copies += 1;
    }

    /// Withdraw one shelved copy from the inventory
    pub fn remove_copy(&mut self) -> AppResult<()> {
        if self.available_copies <= 0 {
            return Err(AppError::BusinessRule("No available copies to remove".to_string()));
        }
        self.total_copies -= 1;
        self.available_copies -= 1;
        Ok(())
    }

    /// Hand one copy out to a reader
    pub fn check_out(&mut self) -> AppResult<()> {
        if self.available_copies < 1 {
            return Err(AppError::BusinessRule("No copies available".to_string()));
        }
        self.available_copies -= 1;
        Ok(())
    }

    /// Put a returned copy back on the shelf
    pub fn check_in(&mut self) -> AppResult<()> {
        if self.available_copies >= self.total_copies {
            return Err(AppError::BusinessRule("All copies are already on the shelf".to_string()));
        }
        self.available_copies += 1;
        Ok(())
    }

    /// Overwrite descriptive fields. Copy counts are left alone.
    pub fn apply_update(&mut self, data: UpdateBook) {
        self.title = data.title;
        self.authors = data.authors;
        self.publisher = data.publisher;
        self.version = data.version;
    }
}

/// Add book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<i32>,
}

impl CreateBook {
    /// Strip surrounding whitespace so " " does not pass as an ISBN or title
    pub fn normalized(mut self) -> Self {
        self.isbn = self.isbn.trim().to_string();
        self.title = self.title.trim().to_string();
        self
    }
}

/// Update book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<i32>,
}

impl UpdateBook {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self
    }
}

/// Result of adding a book: either a new row or a restocked one
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub message: String,
    pub book: BookInventory,
}
