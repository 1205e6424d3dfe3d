//! Business logic services

pub mod books;
pub mod issues;
pub mod libraries;
pub mod requests;
pub mod users;

use crate::{
    config::{AuthConfig, LoansConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub libraries: libraries::LibrariesService,
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub requests: requests::RequestsService,
    pub issues: issues::IssuesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, loans_config: LoansConfig) -> Self {
        Self {
            libraries: libraries::LibrariesService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            books: books::BooksService::new(repository.clone()),
            requests: requests::RequestsService::new(repository.clone(), loans_config),
            issues: issues::IssuesService::new(repository),
        }
    }
}
