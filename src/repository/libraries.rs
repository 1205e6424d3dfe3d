//! Libraries repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::library::{CreateLibrary, Library},
};

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool<Postgres>,
}

impl LibrariesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get library by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Library> {
        sqlx::query_as::<_, Library>("SELECT * FROM libraries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))
    }

    /// Create a library
    pub async fn create(&self, data: &CreateLibrary) -> AppResult<Library> {
        let row = sqlx::query_as::<_, Library>(
            "INSERT INTO libraries (name) VALUES ($1) RETURNING *",
        )
        .bind(data.name.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
