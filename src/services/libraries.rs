//! Library management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::library::{CreateLibrary, Library},
    repository::Repository,
};

#[derive(Clone)]
pub struct LibrariesService {
    repository: Repository,
}

impl LibrariesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new library
    pub async fn create(&self, mut data: CreateLibrary) -> AppResult<Library> {
        data.name = data.name.trim().to_string();
        data.validate()?;

        let library = self.repository.libraries.create(&data).await?;
        tracing::info!("Library {} created ({})", library.id, library.name);
        Ok(library)
    }
}
