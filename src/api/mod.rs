//! API handlers for the Shelfmark REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod dashboard;
pub mod health;
pub mod librarians;
pub mod libraries;
pub mod openapi;
pub mod posts;
pub mod tags;
pub mod users;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts},
    http::request::Parts,
    routing::{delete, get, post, put},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejectionReason,
    TypedHeader,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{error::AppError, policy::Principal, repository::Page, AppState};

/// JSON request body whose rejection is surfaced by the handler, after the
/// policy check, as a 400 error body.
pub type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Extractor for an authenticated caller. Rejects with 401 when the bearer
/// token is missing, malformed or expired.
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(principal)) => Ok(AuthenticatedUser(principal)),
            MaybeUser(None) => Err(AppError::Authentication(
                "Missing authorization header".to_string(),
            )),
        }
    }
}

/// Extractor for endpoints that anonymous callers may reach.
/// A present but invalid token is still rejected.
pub struct MaybeUser(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header =
            match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
                Ok(TypedHeader(Authorization(bearer))) => bearer,
                Err(rejection) if matches!(rejection.reason(), TypedHeaderRejectionReason::Missing) => {
                    return Ok(MaybeUser(None))
                }
                Err(_) => {
                    return Err(AppError::Authentication(
                        "Invalid authorization header format".to_string(),
                    ))
                }
            };

        let principal = state.services.auth.principal_from_token(header.token()).await?;
        Ok(MaybeUser(Some(principal)))
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Records on this page
    pub items: Vec<T>,
    /// Total number of matching records
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Records per page
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = Page::new(page, per_page);
        Self {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", get(auth::get_profile).put(auth::update_profile))
        .route("/dashboard", get(dashboard::dashboard))
        // Catalog
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/bulk", post(books::bulk_books))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        .route("/books/:id/permissions", get(books::book_permissions))
        .route("/libraries", get(libraries::list_libraries).post(libraries::create_library))
        .route(
            "/libraries/:id",
            get(libraries::get_library)
                .put(libraries::update_library)
                .delete(libraries::delete_library),
        )
        .route("/libraries/:id/books", put(libraries::set_library_books))
        .route(
            "/librarians",
            get(librarians::list_librarians).post(librarians::create_librarian),
        )
        .route(
            "/librarians/:id",
            get(librarians::get_librarian)
                .put(librarians::update_librarian)
                .delete(librarians::delete_librarian),
        )
        // Blog
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/:id",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        )
        .route("/tags", get(tags::list_tags))
        .route("/tags/:name", delete(tags::delete_tag))
        .route("/tags/:name/posts", get(tags::tag_posts))
        .route("/search", get(posts::search_posts))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user).delete(users::delete_user))
        .route("/users/:id/role", put(users::update_role))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
