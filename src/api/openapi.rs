//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, issues, libraries, requests};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfdesk API",
        version = "0.1.0",
        description = "Multi-library inventory and lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Bootstrap and auth
        libraries::create_library,
        auth::create_user,
        auth::login,
        // Books
        books::list_books,
        books::add_book,
        books::update_book,
        books::remove_book,
        // Requests
        requests::create_request,
        requests::list_requests,
        requests::approve_request,
        requests::reject_request,
        // Issues
        issues::reader_issues,
        issues::return_book,
    ),
    components(
        schemas(
            // Libraries
            crate::models::library::Library,
            crate::models::library::CreateLibrary,
            // Users
            crate::models::enums::Role,
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            // Books
            crate::models::book::BookInventory,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookResponse,
            books::BooksListResponse,
            // Requests
            crate::models::enums::RequestType,
            crate::models::request::RequestEvent,
            crate::models::request::CreateRequest,
            crate::models::request::ApprovalResponse,
            crate::models::request::RejectionResponse,
            requests::RequestsListResponse,
            // Issues
            crate::models::enums::IssueStatus,
            crate::models::issue::IssueRecord,
            crate::models::issue::ReturnResponse,
            issues::IssueInfoResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "libraries", description = "Library registration"),
        (name = "auth", description = "Account creation and login"),
        (name = "books", description = "Book inventory management"),
        (name = "requests", description = "Borrow request workflow"),
        (name = "issues", description = "Issue registry")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
