use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reqwest::StatusCode;
use serde_json::{Value, json};

use salon_api::app::{self, services::AppServices};
use salon_auth::{AccountDirectory, TokenClaims};
use salon_core::{RoleId, UserId};
use salon_infra::{AppConfig, InMemoryAccountDirectory, config::BootstrapConfig, seed};

const ADMIN_EMAIL: &str = "admin@salon.com";
const ADMIN_PASSWORD: &str = "admin123";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = jwt_secret.to_string();
        config.password.memory_cost = 1024;
        config.password.time_cost = 1;
        config.bootstrap = BootstrapConfig {
            admin_email: Some(ADMIN_EMAIL.to_string()),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
        };

        // Same wiring as prod, in-memory directory, ephemeral port.
        let directory: Arc<dyn AccountDirectory> = Arc::new(InMemoryAccountDirectory::new());
        let services = Arc::new(AppServices::new(&config, directory.clone()).unwrap());
        seed::bootstrap_admin(directory, services.hasher.clone(), &config.bootstrap)
            .await
            .unwrap();

        let app = app::build_app(&config, services).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, sub: UserId, email: &str, role_id: RoleId) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        sub,
        email: email.to_string(),
        role_id,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn register(client: &reqwest::Client, srv: &TestServer, email: &str, password: &str, role: i64) -> reqwest::Response {
    client
        .post(srv.url("/auth/register"))
        .json(&json!({ "email": email, "password": password, "roleId": role }))
        .send()
        .await
        .unwrap()
}

async fn login(client: &reqwest::Client, srv: &TestServer, email: &str, password: &str) -> reqwest::Response {
    client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
}

async fn admin_token(client: &reqwest::Client, srv: &TestServer) -> String {
    let res = login(client, srv, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn("test-secret").await;

    let res = reqwest::Client::new().get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn routes_live_under_the_api_prefix() {
    let srv = TestServer::spawn("test-secret").await;
    let root = srv.base_url.trim_end_matches("/api");

    let res = reqwest::Client::new().get(format!("{root}/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_login_deactivate_scenario() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    // Register
    let res = register(&client, &srv, "alice@x.com", "secret1", 3).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let token = body["access_token"].as_str().unwrap().to_string();
    let alice_id = body["user"]["id"].as_i64().unwrap();
    assert_eq!(body["user"]["email"], "alice@x.com");
    assert_eq!(body["user"]["role"]["name"], "Cliente");

    let decoded = jsonwebtoken::decode::<Value>(
        &token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap();
    assert_eq!(decoded.claims["email"], "alice@x.com");
    assert_eq!(decoded.claims["roleId"], 3);
    assert_eq!(decoded.claims["sub"], alice_id);

    // Wrong password
    let res = login(&client, &srv, "alice@x.com", "wrong").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_credentials");

    // Admin deactivates alice
    let admin = admin_token(&client, &srv).await;
    let res = client
        .delete(srv.url(&format!("/users/{alice_id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["active"], false);

    // Correct password, inactive account
    let res = login(&client, &srv, "alice@x.com", "secret1").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "account_inactive");

    // Her unexpired token is refused immediately
    let res = client.get(srv.url("/auth/profile")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_returns_token_and_sanitized_user() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    register(&client, &srv, "bob@x.com", "secret1", 2).await;

    let res = login(&client, &srv, "bob@x.com", "secret1").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["roleId"], 2);
    assert!(body["user"]["lastAccessAt"].is_string());

    let raw = body.to_string().to_lowercase();
    assert!(!raw.contains("password"));
    assert!(!raw.contains("argon2"));
}

#[tokio::test]
async fn unknown_email_and_wrong_password_look_the_same() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    register(&client, &srv, "bob@x.com", "secret1", 2).await;

    let wrong = login(&client, &srv, "bob@x.com", "nope-nope").await;
    let unknown = login(&client, &srv, "ghost@x.com", "secret1").await;

    assert_eq!(wrong.status(), unknown.status());
    let wrong: Value = wrong.json().await.unwrap();
    let unknown: Value = unknown.json().await.unwrap();
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn registration_conflicts_and_validation() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    register(&client, &srv, "alice@x.com", "secret1", 3).await;

    let res = register(&client, &srv, "alice@x.com", "secret1", 3).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "email_taken");

    let res = register(&client, &srv, "carol@x.com", "secret1", 99).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "role_not_found");

    let res = register(&client, &srv, "carol@x.com", "123", 3).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = client
        .post(srv.url("/auth/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/auth/profile")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.get(srv.url("/auth/verify")).bearer_auth("garbage").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/roles"))
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn public_route_ignores_invalid_token() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/auth/register"))
        .bearer_auth("definitely-not-a-token")
        .json(&json!({ "email": "dave@x.com", "password": "secret1", "rolId": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn verify_and_profile_echo_the_live_account() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let res = register(&client, &srv, "erin@x.com", "secret1", 2).await;
    let body: Value = res.json().await.unwrap();
    let token = body["access_token"].as_str().unwrap().to_string();

    let res = client.get(srv.url("/auth/verify")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["valid"], true);
    assert_eq!(body["user"]["email"], "erin@x.com");
    assert_eq!(body["user"]["role"], "Empleado");
    assert!(body["user"]["id"].is_i64());

    let res = client.get(srv.url("/auth/profile")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["email"], "erin@x.com");
    assert_eq!(body["active"], true);
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn foreign_signature_is_rejected_but_own_signature_accepted() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let res = register(&client, &srv, "frank@x.com", "secret1", 3).await;
    let body: Value = res.json().await.unwrap();
    let id = UserId::new(body["user"]["id"].as_i64().unwrap());

    let forged = mint_jwt("other-secret", id, "frank@x.com", RoleId::new(3));
    let res = client.get(srv.url("/auth/profile")).bearer_auth(forged).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let genuine = mint_jwt(jwt_secret, id, "frank@x.com", RoleId::new(3));
    let res = client.get(srv.url("/auth/profile")).bearer_auth(genuine).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_for_unknown_subject_is_unauthorized() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, UserId::new(4242), "ghost@x.com", RoleId::new(1));
    let res = reqwest::Client::new()
        .get(srv.url("/users"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_admin_is_restricted_to_administrators() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = register(&client, &srv, "client@x.com", "secret1", 3).await;
    let body: Value = res.json().await.unwrap();
    let client_token = body["access_token"].as_str().unwrap().to_string();

    let res = client.get(srv.url("/users")).bearer_auth(&client_token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // Any authenticated role may read the role catalogue.
    let res = client.get(srv.url("/roles")).bearer_auth(&client_token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let roles: Value = res.json().await.unwrap();
    assert_eq!(roles.as_array().unwrap().len(), 3);
    assert_eq!(roles[0]["name"], "Administrador");
    assert_eq!(roles[0]["userCount"], 1);
    assert_eq!(roles[2]["userCount"], 1);

    let res = client.get(srv.url("/roles/3")).bearer_auth(&client_token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let detail: Value = res.json().await.unwrap();
    assert_eq!(detail["name"], "Cliente");
    assert_eq!(detail["users"][0]["email"], "client@x.com");
    assert_eq!(detail["users"][0]["active"], true);
    assert!(detail["users"][0].get("passwordHash").is_none());

    let admin = admin_token(&client, &srv).await;
    let res = client.get(srv.url("/users")).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let users: Value = res.json().await.unwrap();
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_user_crud() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let admin = admin_token(&client, &srv).await;

    let res = client
        .post(srv.url("/users"))
        .bearer_auth(&admin)
        .json(&json!({ "email": "staff@x.com", "password": "secret1", "roleId": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["active"], true);

    let res = client
        .patch(srv.url(&format!("/users/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "roleId": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["role"]["name"], "Cliente");

    let res = client
        .patch(srv.url(&format!("/users/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "email": ADMIN_EMAIL }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client.get(srv.url("/users/9999")).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/users/abc")).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/roles/7")).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
