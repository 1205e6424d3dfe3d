//! Account creation and login

use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, LoginResponse, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Create a user attached to an existing library
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        let data = data.normalized();
        data.validate()?;

        self.repository.libraries.get_by_id(data.lib_id).await?;

        if self.repository.users.email_exists(&data.email).await? {
            return Err(AppError::Conflict("Same email exists".to_string()));
        }

        let user = self.repository.users.create(&data).await?;
        tracing::info!("User {} created as {} in library {}", user.id, user.role, user.lib_id);
        Ok(user)
    }

    /// Issue a bearer token for the account registered under `email`.
    ///
    /// No credential beyond the email is checked.
    pub async fn login(&self, email: &str) -> AppResult<LoginResponse> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or user does not exist".to_string()))?;

        let token = UserClaims::new(&user, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::debug!("User {} logged in", user.id);

        Ok(LoginResponse {
            message: "Logged in successfully".to_string(),
            token,
            role: user.role,
        })
    }
}
