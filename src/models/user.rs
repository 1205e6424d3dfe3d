//! User model, login payloads and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::Role;
use crate::error::{AppError, AppResult};

/// User record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub role: Role,
    /// Library the user belongs to; scopes every admin action
    pub lib_id: i32,
    pub crea_date: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin role on the stored account
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin access required".to_string()))
        }
    }

    /// Require reader role on the stored account
    pub fn require_reader(&self) -> AppResult<()> {
        if self.role == Role::Reader {
            Ok(())
        } else {
            Err(AppError::Authorization("Reader access required".to_string()))
        }
    }

    /// Require the user to belong to the given library
    pub fn require_library(&self, lib_id: i32) -> AppResult<()> {
        if self.lib_id == lib_id {
            Ok(())
        } else {
            Err(AppError::Authorization("Libraries are different".to_string()))
        }
    }

    /// Require admin role within the given library
    pub fn require_admin_of(&self, lib_id: i32) -> AppResult<()> {
        self.require_admin()?;
        self.require_library(lib_id)
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub contact_number: Option<String>,
    pub role: Role,
    pub lib_id: i32,
}

impl CreateUser {
    /// Trim name and email so a blank name fails validation
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

/// Login request. Only the email is checked.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub role: Role,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub id: i32,
    pub role: Role,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl UserClaims {
    pub fn new(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: user.id,
            role: user.role,
            email: user.email.clone(),
            iat: now,
            exp: now + (expiration_hours as i64 * 3600),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Reject non-admin tokens before touching storage
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin access required".to_string()))
        }
    }

    pub fn require_reader(&self) -> Result<(), AppError> {
        if self.role == Role::Reader {
            Ok(())
        } else {
            Err(AppError::Authorization("Reader access required".to_string()))
        }
    }
}
