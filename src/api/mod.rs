//! API handlers for Shelfdesk REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod issues;
pub mod libraries;
pub mod openapi;
pub mod requests;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
    routing::{get, post, put},
    RequestPartsExt, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Authentication("Missing or invalid authorization header".to_string()))?;

        let claims = UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body extractor whose rejections use the application error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameter extractor with the same rejection format as `AppJson`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Bootstrap and authentication
        .route("/libraries", post(libraries::create_library))
        .route("/users", post(auth::create_user))
        .route("/auth/login", post(auth::login))
        // Inventory
        .route("/books", get(books::list_books).post(books::add_book))
        .route("/books/:isbn", put(books::update_book).delete(books::remove_book))
        // Borrow requests
        .route("/requests", get(requests::list_requests).post(requests::create_request))
        .route("/requests/:id/approve", post(requests::approve_request))
        .route("/requests/:id/reject", post(requests::reject_request))
        // Issue registry
        .route("/readers/:id/issues", get(issues::reader_issues))
        .route("/issues/:id/return", post(issues::return_book))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
