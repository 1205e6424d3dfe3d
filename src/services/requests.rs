//! Borrow request workflow

use validator::Validate;

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::{
        issue::IssueRecord,
        request::{CreateRequest, RequestEvent},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
    config: LoansConfig,
}

impl RequestsService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Reader asks to borrow a book of their own library
    pub async fn create(&self, claims: &UserClaims, data: CreateRequest) -> AppResult<RequestEvent> {
        data.validate()?;

        let reader = self.repository.users.get_caller(claims.id).await?;
        reader.require_reader()?;

        let book = self.repository.books.get_by_isbn(data.isbn.trim()).await?;
        reader.require_library(book.lib_id)?;

        let request = self.repository.requests.create(&book.isbn, reader.id).await?;
        tracing::info!("Reader {} requested book {} (request {})", reader.id, book.isbn, request.req_id);
        Ok(request)
    }

    /// Pending requests for the admin's library
    pub async fn list_pending(&self, claims: &UserClaims) -> AppResult<Vec<RequestEvent>> {
        let admin = self.repository.users.get_caller(claims.id).await?;
        admin.require_admin()?;

        self.repository.requests.list_pending(admin.lib_id).await
    }

    /// Approve a request and open the loan
    pub async fn approve(&self, claims: &UserClaims, req_id: i32) -> AppResult<(RequestEvent, IssueRecord)> {
        let admin = self.repository.users.get_caller(claims.id).await?;
        admin.require_admin()?;

        match self
            .repository
            .requests
            .approve(req_id, &admin, self.config.loan_period_days)
            .await
        {
            Ok((request, issue)) => {
                tracing::info!(
                    "Request {} approved by {}: issue {} due {}",
                    request.req_id, admin.id, issue.issue_id, issue.expected_return_date
                );
                Ok((request, issue))
            }
            Err(e) => {
                tracing::warn!("Approval of request {} by {} failed: {}", req_id, admin.id, e);
                Err(e)
            }
        }
    }

    /// Reject a request
    pub async fn reject(&self, claims: &UserClaims, req_id: i32) -> AppResult<RequestEvent> {
        let admin = self.repository.users.get_caller(claims.id).await?;
        admin.require_admin()?;

        let request = self.repository.requests.reject(req_id, &admin).await?;
        tracing::info!("Request {} rejected by {}", request.req_id, admin.id);
        Ok(request)
    }
}
