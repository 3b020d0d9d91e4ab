//! OpenAPI documentation

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, authors, books, dashboard, health, librarians, libraries, posts, tags, users,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfmark API",
        version = "1.0.0",
        description = "Library catalog and blog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::get_profile,
        auth::update_profile,
        dashboard::dashboard,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::book_permissions,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::bulk_books,
        // Libraries
        libraries::list_libraries,
        libraries::get_library,
        libraries::create_library,
        libraries::update_library,
        libraries::set_library_books,
        libraries::delete_library,
        // Librarians
        librarians::list_librarians,
        librarians::get_librarian,
        librarians::create_librarian,
        librarians::update_librarian,
        librarians::delete_librarian,
        // Blog
        posts::list_posts,
        posts::search_posts,
        posts::get_post,
        posts::create_post,
        posts::update_post,
        posts::delete_post,
        tags::list_tags,
        tags::tag_posts,
        tags::delete_tag,
        // Users
        users::list_users,
        users::get_user,
        users::update_role,
        users::delete_user,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            crate::services::auth::LoginResponse,
            crate::models::user::Account,
            crate::models::user::RegistrationForm,
            crate::models::user::ProfileForm,
            crate::models::user::UpdateRole,
            crate::models::enums::Role,
            crate::models::enums::Action,
            crate::models::enums::EntityType,
            crate::policy::PermissionSet,
            crate::services::dashboard::Dashboard,
            // Catalog
            crate::models::author::Author,
            crate::models::author::AuthorShort,
            crate::models::author::AuthorForm,
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookForm,
            crate::models::book::BulkBookRequest,
            crate::models::library::Library,
            crate::models::library::LibraryShort,
            crate::models::library::LibraryForm,
            crate::models::library::LibraryBooksRequest,
            crate::models::library::Librarian,
            crate::models::library::LibrarianForm,
            // Blog
            crate::models::post::Post,
            crate::models::post::PostShort,
            crate::models::post::PostForm,
            crate::models::tag::Tag,
            crate::models::tag::TagWithCount,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::forms::FieldErrors,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and own profile"),
        (name = "dashboard", description = "Per-user overview"),
        (name = "authors", description = "Authors"),
        (name = "books", description = "Books"),
        (name = "libraries", description = "Libraries and their holdings"),
        (name = "librarians", description = "Librarians"),
        (name = "posts", description = "Blog posts"),
        (name = "tags", description = "Blog tags"),
        (name = "users", description = "User administration")
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
            )
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
