//! In-process router tests.
//!
//! `app()` uses a pool that never connects, so those requests must be answered
//! before the database is touched. Requests that carry a bearer token resolve
//! the caller's role from the database and run against a migrated test
//! database instead (`cargo test --test router_tests -- --ignored`).

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;

use shelfmark::{
    api::create_router,
    config::AppConfig,
    models::{enums::Role, user::NewAccount},
    repository::Repository,
    services::Services,
    AppState,
};

fn state(pool: PgPool) -> (AppState, AppConfig) {
    let config = AppConfig::default();
    let services = Services::new(Repository::new(pool), config.auth.clone());
    let state = AppState {
        config: Arc::new(config.clone()),
        services: Arc::new(services),
    };
    (state, config)
}

fn app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy(&AppConfig::default().database.url)
        .unwrap();
    create_router(state(pool).0)
}

/// Register `username`, give it `role` and return the router with its token
async fn login_as(pool: &PgPool, username: &str, role: Option<Role>) -> (Router, String) {
    let (state, _) = state(pool.clone());
    let response = state
        .services
        .auth
        .register(NewAccount {
            username: username.to_string(),
            email: format!("{}@example.org", username),
            password: "correct horse battery".to_string(),
        })
        .await
        .unwrap();
    if let Some(role) = role {
        state.services.auth.set_role(response.user.id, role).await.unwrap();
    }
    (create_router(state), response.token)
}

fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn book() -> Value {
    json!({ "title": "Dune", "author_id": 1, "publication_year": 1965 })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), request("GET", "/api/v1/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let (status, body) = send(app(), request("GET", "/api-docs/openapi.json", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Shelfmark API");
}

#[tokio::test]
async fn test_anonymous_create_is_unauthenticated() {
    let (status, body) = send(app(), request("POST", "/api/v1/books", None, Some(book()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn test_anonymous_create_with_incomplete_body_is_unauthenticated() {
    let req = request("POST", "/api/v1/books", None, Some(json!({ "title": "Dune" })));
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_value() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_is_a_bad_value() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .body(Body::from(json!({ "username": "jane", "password": "x" }).to_string()))
        .unwrap();
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let req = request("GET", "/api/v1/books", Some("not.a.jwt"), None);
    let (status, _) = send(app(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_ordering_is_a_validation_error() {
    let req = request("GET", "/api/v1/books?ordering=-password", None, None);
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["ordering"].is_array());
}

#[tokio::test]
async fn test_libraries_require_login() {
    let (status, _) = send(app(), request("GET", "/api/v1/libraries", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validation_happens_before_storage() {
    let body = json!({
        "username": "bad name",
        "email": "not-an-email",
        "password": "short",
        "password_confirm": "different"
    });
    let (status, body) = send(app(), request("POST", "/api/v1/auth/register", None, Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["username", "email", "password", "password_confirm"] {
        assert!(body["fields"][field].is_array(), "missing error for {}", field);
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_member_cannot_create_book(pool: PgPool) {
    let (app, member) = login_as(&pool, "member", None).await;
    let req = request("POST", "/api/v1/books", Some(&member), Some(book()));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_policy_runs_before_body_is_read(pool: PgPool) {
    let (app, member) = login_as(&pool, "member", None).await;
    let req = request("POST", "/api/v1/books", Some(&member), Some(json!({ "title": "Dune" })));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_incomplete_body_is_a_bad_value(pool: PgPool) {
    let (app, admin) = login_as(&pool, "admin", Some(Role::Admin)).await;
    let req = request("POST", "/api/v1/books", Some(&admin), Some(json!({ "title": "Dune" })));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_unknown_role_gets_no_rights(pool: PgPool) {
    let (app, janitor) = login_as(&pool, "janitor", None).await;
    sqlx::query("UPDATE profiles SET role = 'Janitor'")
        .execute(&pool)
        .await
        .unwrap();
    let req = request("POST", "/api/v1/posts", Some(&janitor), Some(json!({ "title": "x", "content": "y" })));
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_librarian_invalid_book_reports_every_field(pool: PgPool) {
    let (app, librarian) = login_as(&pool, "librarian", Some(Role::Librarian)).await;
    let body = json!({
        "title": "SELECT * FROM books",
        "author_id": 1,
        "publication_year": 1200,
        "isbn": "12-34"
    });
    let (status, body) = send(app, request("POST", "/api/v1/books", Some(&librarian), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["title"].is_array());
    assert!(body["fields"]["publication_year"].is_array());
    assert!(body["fields"]["isbn"].is_array());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_bulk_books_not_implemented_for_admin(pool: PgPool) {
    let (app, admin) = login_as(&pool, "admin", Some(Role::Admin)).await;
    let req = request("POST", "/api/v1/books/bulk", Some(&admin), Some(json!({ "ids": [1, 2] })));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"], "NotImplemented");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_bulk_books_checks_policy_first(pool: PgPool) {
    let (app, member) = login_as(&pool, "member", None).await;
    let req = request("POST", "/api/v1/books/bulk", Some(&member), Some(json!({})));
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_member_cannot_list_users(pool: PgPool) {
    let (app, member) = login_as(&pool, "member", None).await;
    let (status, _) = send(app, request("GET", "/api/v1/users", Some(&member), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_librarian_cannot_delete_tags(pool: PgPool) {
    let (app, librarian) = login_as(&pool, "librarian", Some(Role::Librarian)).await;
    let req = request("DELETE", "/api/v1/tags/rust", Some(&librarian), None);
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_admin_role_change_rejects_unknown_role(pool: PgPool) {
    let (app, admin) = login_as(&pool, "admin", Some(Role::Admin)).await;
    let req = request("PUT", "/api/v1/users/3/role", Some(&admin), Some(json!({ "role": "root" })));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["role"].is_array());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_demoted_admin_loses_rights_with_the_same_token(pool: PgPool) {
    let (app, admin) = login_as(&pool, "admin", Some(Role::Admin)).await;
    let (status, _) = send(app.clone(), request("GET", "/api/v1/users", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);

    sqlx::query("UPDATE profiles SET role = 'Member'")
        .execute(&pool)
        .await
        .unwrap();
    let (status, _) = send(app, request("GET", "/api/v1/users", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_logout_is_stateless(pool: PgPool) {
    let (app, member) = login_as(&pool, "member", None).await;
    let (status, _) = send(app, request("POST", "/api/v1/auth/logout", Some(&member), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
