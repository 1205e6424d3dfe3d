//! Issue registry repository for database operations

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use super::books;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::IssueStatus,
        issue::{IssueRecord, NewIssue},
        user::User,
    },
};

#[derive(Clone)]
pub struct IssuesRepository {
    pool: Pool<Postgres>,
}

impl IssuesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All issue entries of a reader, newest first
    pub async fn list_for_reader(&self, reader_id: i32) -> AppResult<Vec<IssueRecord>> {
        let issues = sqlx::query_as::<_, IssueRecord>(
            "SELECT * FROM issue_registry WHERE reader_id = $1 ORDER BY issue_date DESC, issue_id DESC",
        )
        .bind(reader_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(issues)
    }

    /// Close an active loan and put the copy back on the shelf
    pub async fn return_issue(&self, issue_id: i32, admin: &User) -> AppResult<IssueRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut issue = sqlx::query_as::<_, IssueRecord>(
            "SELECT * FROM issue_registry WHERE issue_id = $1 FOR UPDATE",
        )
        .bind(issue_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Issue with id {} not found", issue_id)))?;

        let mut book = books::lock_by_isbn(&mut tx, &issue.isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", issue.isbn)))?;
        admin.require_admin_of(book.lib_id)?;

        issue.mark_returned(admin.id, now)?;
        book.check_in()?;

        books::save_counts(&mut tx, &book).await?;
        sqlx::query(
            r#"
            UPDATE issue_registry
            SET issue_status = $1, return_date = $2, return_approver_id = $3
            WHERE issue_id = $4
            "#,
        )
        .bind(issue.issue_status)
        .bind(issue.return_date)
        .bind(issue.return_approver_id)
        .bind(issue.issue_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(issue)
    }
}

/// Open a loan inside the caller's transaction
pub(crate) async fn insert(conn: &mut PgConnection, issue: &NewIssue) -> AppResult<IssueRecord> {
    let row = sqlx::query_as::<_, IssueRecord>(
        r#"
        INSERT INTO issue_registry
            (isbn, reader_id, issue_approver_id, issue_status, issue_date, expected_return_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&issue.isbn)
    .bind(issue.reader_id)
    .bind(issue.issue_approver_id)
    .bind(IssueStatus::Issued)
    .bind(issue.issue_date)
    .bind(issue.expected_return_date)
    .fetch_one(conn)
    .await?;
    Ok(row)
}
