//! API integration tests
//!
//! Expect a server on localhost:8080 started with the development config,
//! which provisions the `admin` account.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an admin token
async fn get_auth_token(client: &Client) -> String {
    login(client, "admin", "admin-password").await
}

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Register a throwaway regular user and return its token
async fn regular_user_token(client: &Client) -> String {
    let username = format!("reader-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({"username": username, "password": "reader-password"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    login(client, &username, "reader-password").await
}

async fn post_json(client: &Client, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

/// Created book with the ids of its author and genre
struct SeededBook {
    id: i64,
    author_id: i64,
    genre_id: i64,
    body: Value,
}

/// Create an author, a genre and a book with the given inventory count
async fn create_book(client: &Client, token: &str, count: i64) -> SeededBook {
    let stamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let (status, author) = post_json(client, token, "/authors", json!({"name": format!("Author {}", stamp)})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, genre) = post_json(client, token, "/genres", json!({"title": format!("Genre {}", stamp)})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, book) = post_json(
        client,
        token,
        "/books",
        json!({
            "title": format!("Book {}", stamp),
            "release_year": 2001,
            "description": "Test book",
            "inventory_count": count,
            "author": author["id"],
            "genre": genre["id"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    SeededBook {
        id: book["id"].as_i64().expect("No book ID"),
        author_id: author["id"].as_i64().expect("No author ID"),
        genre_id: genre["id"].as_i64().expect("No genre ID"),
        body: book,
    }
}

async fn get_book(client: &Client, book_id: i64) -> (StatusCode, Value) {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

async fn send_with_token(request: reqwest::RequestBuilder, token: Option<&str>) -> (StatusCode, Value) {
    let request = match token {
        Some(t) => request.header("Authorization", format!("Bearer {}", t)),
        None => request,
    };
    let response = request.send().await.expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

async fn change_count(client: &Client, token: &str, book_id: i64, value: Value) -> (StatusCode, Value) {
    let response = client
        .patch(format!("{}/books/{}/change-count", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "value": value }))
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
    assert_eq!(body["role"], "admin");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
#[ignore]
async fn test_change_count_sequence() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let reader = regular_user_token(&client).await;
    let book_id = create_book(&client, &admin, 2).await.id;

    let (status, body) = change_count(&client, &reader, book_id, json!(3)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inventory_count"], 5);

    let (status, body) = change_count(&client, &reader, book_id, json!("-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inventory_count"], 4);

    let (status, body) = change_count(&client, &reader, book_id, json!(-10)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["value"].is_array());

    let (status, _) = change_count(&client, &reader, book_id, json!("BooksCount")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["inventory_count"], 4);
}

#[tokio::test]
#[ignore]
async fn test_change_count_unknown_book() {
    let client = Client::new();
    let reader = regular_user_token(&client).await;

    let (status, _) = change_count(&client, &reader, i32::MAX as i64, json!("not a number")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_rating_upsert_and_average() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let reader = regular_user_token(&client).await;
    let book_id = create_book(&client, &admin, 1).await.id;

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["additional_info"]["review_count"], 0);
    assert!(book["additional_info"].get("average_rating").is_none());

    let (status, first) = post_json(&client, &reader, "/ratings", json!({"book": book_id, "rating": 4})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) = post_json(&client, &reader, "/ratings", json!({"book": book_id, "rating": 9})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["rating"], 9);

    let (status, _) = post_json(&client, &admin, "/ratings", json!({"book": book_id, "rating": 6})).await;
    assert_eq!(status, StatusCode::CREATED);

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", reader))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["additional_info"]["average_rating"], 7.5);
    assert_eq!(book["additional_info"]["caller_rating"], 9);
}

#[tokio::test]
#[ignore]
async fn test_review_ownership() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let owner = regular_user_token(&client).await;
    let other = regular_user_token(&client).await;
    let book_id = create_book(&client, &admin, 1).await.id;

    let (status, review) = post_json(&client, &owner, "/reviews", json!({"book": book_id, "review": "Great"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let url = format!("{}/reviews/{}", BASE_URL, review["id"]);

    let response = client.delete(&url).send().await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .delete(&url)
        .header("Authorization", format!("Bearer {}", other))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .delete(&url)
        .header("Authorization", format!("Bearer {}", owner))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_protected_author_delete() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book = create_book(&client, &token, 0).await;
    let author_url = format!("{}/authors/{}", BASE_URL, book.author_id);

    let (status, _) = send_with_token(client.delete(&author_url), Some(&token)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched) = get_book(&client, book.id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["author"], book.body["author"]);
    assert_eq!(fetched["genre"], book.body["genre"]);

    let (status, _) = send_with_token(
        client.delete(format!("{}/books/{}", BASE_URL, book.id)),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_with_token(client.delete(&author_url), Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_protected_genre_delete() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book = create_book(&client, &token, 0).await;
    let genre_url = format!("{}/genres/{}", BASE_URL, book.genre_id);

    let (status, body) = send_with_token(client.delete(&genre_url), Some(&token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Protected");

    let (status, fetched) = get_book(&client, book.id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["author"], book.body["author"]);
    assert_eq!(fetched["genre"], book.body["genre"]);

    let (status, _) = send_with_token(client.get(&genre_url), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_with_token(
        client.delete(format!("{}/books/{}", BASE_URL, book.id)),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_with_token(client.delete(&genre_url), Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_rating_partial_update_ownership() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let owner = regular_user_token(&client).await;
    let other = regular_user_token(&client).await;
    let book = create_book(&client, &admin, 1).await;

    let (status, rating) = post_json(&client, &owner, "/ratings", json!({"book": book.id, "rating": 4})).await;
    assert_eq!(status, StatusCode::CREATED);
    let url = format!("{}/ratings/{}", BASE_URL, rating["id"]);

    let (status, _) = send_with_token(client.patch(&url).json(&json!({"rating": 7})), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_with_token(client.patch(&url).json(&json!({"rating": 7})), Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, patched) = send_with_token(client.patch(&url).json(&json!({"rating": 7})), Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["id"], rating["id"]);
    assert_eq!(patched["rating"], 7);
    assert_eq!(patched["book_title"], rating["book_title"]);
    assert_eq!(patched["user"], rating["user"]);

    let (status, body) = send_with_token(client.patch(&url).json(&json!({"rating": 11})), Some(&owner)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["rating"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_review_partial_update_keeps_book() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let owner = regular_user_token(&client).await;
    let book = create_book(&client, &admin, 1).await;

    let (status, review) = post_json(&client, &owner, "/reviews", json!({"book": book.id, "review": "Good"})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, patched) = send_with_token(
        client
            .patch(format!("{}/reviews/{}", BASE_URL, review["id"]))
            .json(&json!({"review": "Better on a second read"})),
        Some(&owner),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["review"], "Better on a second read");
    assert_eq!(patched["book_title"], review["book_title"]);
}

/// Drives the service with a stale observed count so the guarded update
/// matches no row while the book still exists
#[tokio::test]
#[ignore]
async fn test_stale_count_rejected_by_guarded_update() {
    use librest_server::{config::AppConfig, repository::Repository, services::Services, AppError};
    use sqlx::postgres::PgPoolOptions;

    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token, 2).await.id as i32;

    let config = AppConfig::load().expect("config");
    let pool = PgPoolOptions::new()
        .connect(&config.database.url)
        .await
        .expect("database");
    let services = Services::new(Repository::new(pool), config.auth.clone());

    // Observed 10, actual 2: passes the arithmetic check, fails the SQL guard
    match services.catalog.change_count(book_id, 10, -5).await {
        Err(AppError::Validation(fields)) => {
            assert_eq!(fields["value"], vec!["resulting count cannot be negative".to_string()]);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(services.catalog.inventory_count(book_id).await.expect("count"), 2);

    assert!(matches!(
        services.catalog.change_count(i32::MAX, 10, -5).await,
        Err(AppError::NotFound(_))
    ));
}
