use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use bookshelf_api::config::ApiConfig;

const SECRET_B64: &str = "dGVzdC1zZWNyZXQ=";
const ROOT_USER: &str = "superuser";
const ROOT_PASSWORD: &str = "root-pw";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build the same router as prod, but bind to an ephemeral port.
        let config = ApiConfig {
            token_secret: SECRET_B64.to_string(),
            token_ttl: ChronoDuration::minutes(10),
            guest_username: "guestuser".to_string(),
            root_username: ROOT_USER.to_string(),
            root_email: "super@localhost".to_string(),
            root_password: ROOT_PASSWORD.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        };

        let app = bookshelf_api::app::build_app(config).expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn login(client: &reqwest::Client, base_url: &str, username: &str, password: &str) -> String {
    let res = client
        .post(format!("{}/session", base_url))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn signup_reader(client: &reqwest::Client, base_url: &str, username: &str) {
    let res = client
        .post(format!("{}/signup", base_url))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "reader-pw",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_whoami_fails_closed() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn seeded_root_logs_in_and_resolves() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = login(&client, &srv.base_url, ROOT_USER, ROOT_PASSWORD).await;

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], ROOT_USER);
    assert_eq!(body["role"], "SUPER");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn wrong_password_is_rejected_opaquely() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/session", srv.base_url))
        .json(&json!({ "username": ROOT_USER, "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Unknown identifier gets the same answer as a wrong secret.
    let res = client
        .post(format!("{}/session", srv.base_url))
        .json(&json!({ "username": "who-is-this", "password": ROOT_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_and_expired_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Signed with the wrong secret.
    let claims = json!({
        "sub": ROOT_USER,
        "iat": Utc::now().timestamp(),
        "exp": (Utc::now() + ChronoDuration::minutes(10)).timestamp(),
    });
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Correctly signed but already expired.
    let claims = json!({
        "sub": ROOT_USER,
        "iat": (Utc::now() - ChronoDuration::hours(2)).timestamp(),
        "exp": (Utc::now() - ChronoDuration::hours(1)).timestamp(),
    });
    let expired = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_base64_secret(SECRET_B64).unwrap(),
    )
    .unwrap();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_lifecycle_create_update_browse() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = login(&client, &srv.base_url, ROOT_USER, ROOT_PASSWORD).await;

    // Create.
    let res = client
        .post(format!("{}/books", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "9780306406157",
            "price": "9.99",
            "published": "08/1965",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["version"], 1);

    // Invalid ISBN never persists.
    let res = client
        .post(format!("{}/books", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Broken",
            "isbn": "9780306406158",
            "published": "01/2000",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Update bumps the version.
    let res = client
        .put(format!("{}/books/{}", srv.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "price": "12.50" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["price"], "12.50");
    assert_eq!(updated["version"], 2);

    // Anonymous browsing sees the catalog.
    let res = client
        .get(format!("{}/books", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listing: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listing["items"].as_array().unwrap().len(), 1);

    // Lookup by ISBN.
    let res = client
        .get(format!("{}/books?isbn=9780306406157", srv.base_url))
        .send()
        .await
        .unwrap();
    let by_isbn: serde_json::Value = res.json().await.unwrap();
    assert_eq!(by_isbn["items"][0]["title"], "Dune");
}

#[tokio::test]
async fn self_signup_is_reader_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/signup", srv.base_url))
        .json(&json!({
            "username": "mallory",
            "email": "mallory@example.com",
            "password": "pw",
            "role": "ADMIN",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    signup_reader(&client, &srv.base_url, "carol").await;
    let token = login(&client, &srv.base_url, "carol", "reader-pw").await;

    // A reader cannot mutate the catalog.
    let res = client
        .post(format!("{}/books", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Sneaky",
            "isbn": "0306406152",
            "published": "01/2000",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn shelf_flow_add_duplicate_remove() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let root_token = login(&client, &srv.base_url, ROOT_USER, ROOT_PASSWORD).await;
    let res = client
        .post(format!("{}/books", srv.base_url))
        .bearer_auth(&root_token)
        .json(&json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "9780306406157",
            "price": "9.99",
            "published": "08/1965",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    signup_reader(&client, &srv.base_url, "carol").await;
    let token = login(&client, &srv.base_url, "carol", "reader-pw").await;

    // Add by ISBN.
    let res = client
        .post(format!("{}/shelf", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "isbn": "9780306406157" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Duplicate add conflicts and mutates nothing.
    let res = client
        .post(format!("{}/shelf", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "isbn": "9780306406157" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .get(format!("{}/shelf", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let shelf: serde_json::Value = res.json().await.unwrap();
    assert_eq!(shelf["items"].as_array().unwrap().len(), 1);

    // Remove, then removing again is a miss.
    let res = client
        .delete(format!("{}/shelf", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Dune" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(format!("{}/shelf", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Dune" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn guest_session_browses_but_has_no_shelf() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/session/guest", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["role"], "GUEST");

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/books", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The synthetic guest is never persisted, so it has no membership set.
    let res = client
        .get(format!("{}/shelf", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
