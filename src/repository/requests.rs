//! Borrow requests repository for database operations

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use super::{books, issues};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestType,
        issue::{IssueRecord, NewIssue},
        request::RequestEvent,
        user::User,
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a borrow request. One pending request per reader and book.
    pub async fn create(&self, isbn: &str, reader_id: i32) -> AppResult<RequestEvent> {
        sqlx::query_as::<_, RequestEvent>(
            r#"
            INSERT INTO request_events (book_id, reader_id, request_date, request_type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(isbn)
        .bind(reader_id)
        .bind(Utc::now())
        .bind(RequestType::Requested)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "A pending request for this book already exists"))
    }

    /// Pending requests for books of a library, oldest first
    pub async fn list_pending(&self, lib_id: i32) -> AppResult<Vec<RequestEvent>> {
        let requests = sqlx::query_as::<_, RequestEvent>(
            r#"
            SELECT r.*
            FROM request_events r
            JOIN book_inventories b ON r.book_id = b.isbn
            WHERE b.lib_id = $1 AND r.request_type = $2
            ORDER BY r.request_date, r.req_id
            "#,
        )
        .bind(lib_id)
        .bind(RequestType::Requested)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Approve a pending request.
    ///
    /// Decrements available copies, marks the request `Issued` and opens an
    /// issue registry entry, all in one transaction.
    pub async fn approve(
        &self,
        req_id: i32,
        admin: &User,
        loan_period_days: i64,
    ) -> AppResult<(RequestEvent, IssueRecord)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut request = lock_by_id(&mut tx, req_id).await?;
        let mut book = books::lock_by_isbn(&mut tx, &request.book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", request.book_id)))?;
        admin.require_admin_of(book.lib_id)?;

        request.resolve(RequestType::Issued, admin.id, now)?;
        book.check_out()?;

        books::save_counts(&mut tx, &book).await?;
        save_resolution(&mut tx, &request).await?;
        let issue = issues::insert(
            &mut tx,
            &NewIssue::new(book.isbn.clone(), request.reader_id, admin.id, now, loan_period_days),
        )
        .await?;

        tx.commit().await?;
        Ok((request, issue))
    }

    /// Reject a pending request. Inventory is untouched.
    pub async fn reject(&self, req_id: i32, admin: &User) -> AppResult<RequestEvent> {
        let mut tx = self.pool.begin().await?;

        let mut request = lock_by_id(&mut tx, req_id).await?;
        let lib_id: i32 = sqlx::query_scalar("SELECT lib_id FROM book_inventories WHERE isbn = $1")
            .bind(&request.book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", request.book_id)))?;
        admin.require_admin_of(lib_id)?;

        request.resolve(RequestType::Rejected, admin.id, Utc::now())?;
        save_resolution(&mut tx, &request).await?;

        tx.commit().await?;
        Ok(request)
    }
}

async fn lock_by_id(conn: &mut PgConnection, req_id: i32) -> AppResult<RequestEvent> {
    sqlx::query_as::<_, RequestEvent>("SELECT * FROM request_events WHERE req_id = $1 FOR UPDATE")
        .bind(req_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", req_id)))
}

async fn save_resolution(conn: &mut PgConnection, request: &RequestEvent) -> AppResult<()> {
    sqlx::query(
        "UPDATE request_events SET request_type = $1, approval_date = $2, approver_id = $3 WHERE req_id = $4",
    )
    .bind(request.request_type)
    .bind(request.approval_date)
    .bind(request.approver_id)
    .bind(request.req_id)
    .execute(conn)
    .await?;
    Ok(())
}
