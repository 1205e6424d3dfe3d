//! Borrow request model and its transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{enums::RequestType, issue::IssueRecord};
use crate::error::{AppError, AppResult};

/// Borrow request raised by a reader for one book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RequestEvent {
    pub req_id: i32,
    /// ISBN of the requested book
    pub book_id: String,
    pub reader_id: i32,
    pub request_date: DateTime<Utc>,
    pub request_type: RequestType,
    pub approval_date: Option<DateTime<Utc>>,
    pub approver_id: Option<i32>,
}

impl RequestEvent {
    /// Move a pending request to `Issued` or `Rejected`, stamping the approver.
    ///
    /// Fails when the request has already been resolved.
    pub fn resolve(&mut self, outcome: RequestType, approver_id: i32, at: DateTime<Utc>) -> AppResult<()> {
        if self.request_type.is_terminal() {
            return Err(AppError::BusinessRule(format!(
                "Request {} is already {}",
                self.req_id, self.request_type
            )));
        }
        if !outcome.is_terminal() {
            return Err(AppError::Internal(format!(
                "Cannot resolve request {} to {}",
                self.req_id, outcome
            )));
        }
        self.request_type = outcome;
        self.approval_date = Some(at);
        self.approver_id = Some(approver_id);
        Ok(())
    }
}

/// Create borrow request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
}

/// Outcome of an approval: the resolved request and the loan it opened
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApprovalResponse {
    pub message: String,
    pub request: RequestEvent,
    pub issue: IssueRecord,
}

/// Outcome of a rejection
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RejectionResponse {
    pub message: String,
    pub request: RequestEvent,
}
