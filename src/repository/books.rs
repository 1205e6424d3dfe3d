//! Book inventory repository for database operations
//!
//! Every read-modify-write runs inside a transaction holding a row lock on
//! the book, so two concurrent mutations of the same ISBN are serialized.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookInventory, CreateBook, UpdateBook},
        user::User,
    },
};

/// Whether `add_copy` created a row or restocked an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    Restocked,
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ISBN
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<BookInventory> {
        sqlx::query_as::<_, BookInventory>("SELECT * FROM book_inventories WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))
    }

    /// All books of a library, available or not
    pub async fn list_by_library(&self, lib_id: i32) -> AppResult<Vec<BookInventory>> {
        let books = sqlx::query_as::<_, BookInventory>(
            "SELECT * FROM book_inventories WHERE lib_id = $1 ORDER BY title, isbn",
        )
        .bind(lib_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Add one copy of a book to a library.
    ///
    /// Restocks when the ISBN already belongs to `lib_id`, refuses when it
    /// belongs to another library, otherwise inserts the first copy. An
    /// insert that loses a race for a new ISBN falls back to the restock or
    /// refuse path against the winning row.
    pub async fn add_copy(&self, data: CreateBook, lib_id: i32) -> AppResult<(BookInventory, AddOutcome)> {
        let mut tx = self.pool.begin().await?;

        let result = match lock_by_isbn(&mut tx, &data.isbn).await? {
            Some(book) => (restock_in(&mut tx, book, lib_id).await?, AddOutcome::Restocked),
            None => {
                let book = BookInventory::first_copy(data, lib_id);
                if insert(&mut tx, &book).await? {
                    (book, AddOutcome::Created)
                } else {
                    // Another transaction committed this ISBN first
                    let existing = lock_by_isbn(&mut tx, &book.isbn)
                        .await?
                        .ok_or_else(|| AppError::Internal(format!("Book {} vanished during insert", book.isbn)))?;
                    (restock_in(&mut tx, existing, lib_id).await?, AddOutcome::Restocked)
                }
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    /// Withdraw one shelved copy. The row stays even when counts reach zero.
    pub async fn remove_copy(&self, isbn: &str, caller: &User) -> AppResult<BookInventory> {
        let mut tx = self.pool.begin().await?;

        let mut book = lock_by_isbn(&mut tx, isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))?;
        caller.require_admin_of(book.lib_id)?;

        book.remove_copy()?;
        save_counts(&mut tx, &book).await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Overwrite the descriptive fields of a book
    pub async fn update(&self, isbn: &str, data: UpdateBook, caller: &User) -> AppResult<BookInventory> {
        let mut tx = self.pool.begin().await?;

        let mut book = lock_by_isbn(&mut tx, isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))?;
        caller.require_admin_of(book.lib_id)?;

        book.apply_update(data);
        sqlx::query(
            r#"
            UPDATE book_inventories
            SET title = $1, authors = $2, publisher = $3, version = $4
            WHERE isbn = $5
            "#,
        )
        .bind(&book.title)
        .bind(&book.authors)
        .bind(&book.publisher)
        .bind(book.version)
        .bind(&book.isbn)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(book)
    }
}

/// Load a book and hold its row lock until the transaction ends
pub(crate) async fn lock_by_isbn(conn: &mut PgConnection, isbn: &str) -> AppResult<Option<BookInventory>> {
    let book = sqlx::query_as::<_, BookInventory>(
        "SELECT * FROM book_inventories WHERE isbn = $1 FOR UPDATE",
    )
    .bind(isbn)
    .fetch_optional(conn)
    .await?;
    Ok(book)
}

/// Persist copy counts of a locked book
pub(crate) async fn save_counts(conn: &mut PgConnection, book: &BookInventory) -> AppResult<()> {
    sqlx::query(
        "UPDATE book_inventories SET total_copies = $1, available_copies = $2 WHERE isbn = $3",
    )
    .bind(book.total_copies)
    .bind(book.available_copies)
    .bind(&book.isbn)
    .execute(conn)
    .await?;
    Ok(())
}

async fn restock_in(conn: &mut PgConnection, mut book: BookInventory, lib_id: i32) -> AppResult<BookInventory> {
    if book.lib_id != lib_id {
        return Err(AppError::Conflict(
            "Same ISBN already exists in another library, cannot add book".to_string(),
        ));
    }
    book.restock();
    save_counts(conn, &book).await?;
    Ok(book)
}

/// Insert a new row. Returns false when the ISBN was taken concurrently.
async fn insert(conn: &mut PgConnection, book: &BookInventory) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO book_inventories
            (isbn, lib_id, title, authors, publisher, version, total_copies, available_copies)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (isbn) DO NOTHING
        "#,
    )
    .bind(&book.isbn)
    .bind(book.lib_id)
    .bind(&book.title)
    .bind(&book.authors)
    .bind(&book.publisher)
    .bind(book.version)
    .bind(book.total_copies)
    .bind(book.available_copies)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
