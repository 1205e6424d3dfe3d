//! Issue registry queries and returns

use crate::{
    error::AppResult,
    models::{issue::IssueRecord, user::UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct IssuesService {
    repository: Repository,
}

impl IssuesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Loans of a reader, visible only to admins of the reader's library
    pub async fn for_reader(&self, claims: &UserClaims, reader_id: i32) -> AppResult<Vec<IssueRecord>> {
        let admin = self.repository.users.get_caller(claims.id).await?;
        admin.require_admin()?;

        let reader = self.repository.users.get_by_id(reader_id).await?;
        admin.require_library(reader.lib_id)?;

        self.repository.issues.list_for_reader(reader.id).await
    }

    /// Close a loan
    pub async fn return_book(&self, claims: &UserClaims, issue_id: i32) -> AppResult<IssueRecord> {
        let admin = self.repository.users.get_caller(claims.id).await?;
        admin.require_admin()?;

        let issue = self.repository.issues.return_issue(issue_id, &admin).await?;
        tracing::info!("Issue {} ({}) returned, closed by {}", issue.issue_id, issue.isbn, admin.id);
        Ok(issue)
    }
}
