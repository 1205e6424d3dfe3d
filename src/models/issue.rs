//! Issue registry (active and closed loans)

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::IssueStatus;
use crate::error::{AppError, AppResult};

/// Issue registry row, created when a request is approved
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct IssueRecord {
    pub issue_id: i32,
    pub isbn: String,
    pub reader_id: i32,
    pub issue_approver_id: i32,
    pub issue_status: IssueStatus,
    pub issue_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub return_approver_id: Option<i32>,
}

impl IssueRecord {
    pub fn is_active(&self) -> bool {
        self.issue_status == IssueStatus::Issued
    }

    /// Close the loan
    pub fn mark_returned(&mut self, approver_id: i32, at: DateTime<Utc>) -> AppResult<()> {
        if !self.is_active() {
            return Err(AppError::BusinessRule(format!(
                "Issue {} has already been returned",
                self.issue_id
            )));
        }
        self.issue_status = IssueStatus::Returned;
        self.return_date = Some(at);
        self.return_approver_id = Some(approver_id);
        Ok(())
    }
}

/// Values for a new issue registry row
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub isbn: String,
    pub reader_id: i32,
    pub issue_approver_id: i32,
    pub issue_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
}

impl NewIssue {
    pub fn new(isbn: String, reader_id: i32, approver_id: i32, issued_at: DateTime<Utc>, loan_period_days: i64) -> Self {
        Self {
            isbn,
            reader_id,
            issue_approver_id: approver_id,
            issue_date: issued_at,
            expected_return_date: issued_at + Duration::days(loan_period_days),
        }
    }
}

/// Return response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReturnResponse {
    pub message: String,
    pub issue: IssueRecord,
}
