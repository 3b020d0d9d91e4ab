//! API integration tests against a running server

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

/// Register a fresh member account and return (username, token)
async fn register_member(client: &Client) -> (String, String) {
    let username = unique("member");
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.org", username),
            "password": "correct horse battery",
            "password_confirm": "correct horse battery"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse register response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    (username, token)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_then_login() {
    let client = Client::new();
    let (username, _) = register_member(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": "correct horse battery" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["role"], "Member");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let (username, _) = register_member(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_username_is_a_field_error() {
    let client = Client::new();
    let (username, _) = register_member(&client).await;

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": "other@example.org",
            "password": "correct horse battery",
            "password_confirm": "correct horse battery"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["username"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_anonymous_can_browse_books_but_not_libraries() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books?per_page=5", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["per_page"], 5);

    let response = client
        .get(format!("{}/libraries", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_create_author() {
    let client = Client::new();
    let (_, token) = register_member(&client).await;

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ursula K. Le Guin" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_post_tags_are_replaced() {
    let client = Client::new();
    let (_, token) = register_member(&client).await;
    let tag = unique("tag");

    let response = client
        .post(format!("{}/posts", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Reading list",
            "content": "Books for the winter",
            "tags": format!("{t}, winter, {t}", t = tag)
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let post: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(post["tags"].as_array().map(|t| t.len()), Some(2));

    let response = client
        .put(format!("{}/posts/{}", BASE_URL, post["id"]))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Reading list",
            "content": "Books for the spring",
            "tags": "spring"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let post: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(post["tags"], json!(["spring"]));

    let response = client
        .get(format!("{}/tags/{}/posts", BASE_URL, tag))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 0);
}

#[tokio::test]
#[ignore]
async fn test_only_author_edits_post() {
    let client = Client::new();
    let (_, owner) = register_member(&client).await;
    let (_, other) = register_member(&client).await;

    let post: Value = client
        .post(format!("{}/posts", BASE_URL))
        .bearer_auth(&owner)
        .json(&json!({ "title": "Mine", "content": "Hands off" }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .delete(format!("{}/posts/{}", BASE_URL, post["id"]))
        .bearer_auth(&other)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .delete(format!("{}/posts/{}", BASE_URL, post["id"]))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_dashboard_hides_users_from_members() {
    let client = Client::new();
    let (username, token) = register_member(&client).await;

    let response = client
        .get(format!("{}/dashboard", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], username.as_str());
    assert!(body["books"]["recent"].is_array());
    assert!(body.get("users").is_none());
}
