//! Common test utilities for atelier integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use tempfile::TempDir;

use atelier_core::{OrderId, PaymentNotice, PaymentRecord, UserId};
use atelier_service::auth::JwtClaims;
use atelier_service::crypto::sha512_hex;
use atelier_service::{create_router, AppState, ServiceConfig};
use atelier_store::{RocksStore, Store};

/// Secret the harness signs identity tokens with.
pub const JWT_SECRET: &str = "test-jwt-secret";
/// Issuer the harness expects.
pub const JWT_ISSUER: &str = "https://auth.atelier.test";
/// Midtrans server key used to sign notifications.
pub const MIDTRANS_SERVER_KEY: &str = "SB-Mid-server-test";

static SEED_ORDERS: AtomicU64 = AtomicU64::new(0);

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store access for seeding and assertions.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Harness whose Midtrans client talks to `snap_url`.
    pub fn with_gateway(snap_url: &str) -> Self {
        let snap_url = snap_url.to_string();
        Self::with_config(move |config| {
            config.midtrans_server_key = Some(MIDTRANS_SERVER_KEY.into());
            config.midtrans_client_key = Some("SB-Mid-client-test".into());
            config.midtrans_snap_url = Some(snap_url);
        })
    }

    /// Harness whose Gemini client talks to `api_url`.
    pub fn with_generative(api_url: &str) -> Self {
        let api_url = api_url.to_string();
        Self::with_config(move |config| {
            config.gemini_api_key = Some("gemini-test-key".into());
            config.gemini_model = "gemini-test".into();
            config.gemini_api_url = Some(api_url);
        })
    }

    /// Harness with a customised configuration.
    pub fn with_config(configure: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let mut config = ServiceConfig {
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_jwt_secret: Some(JWT_SECRET.into()),
            auth_issuer: Some(JWT_ISSUER.into()),
            ..ServiceConfig::default()
        };
        configure(&mut config);

        let store = Arc::new(
            RocksStore::open_with_policy(temp_dir.path(), config.policy)
                .expect("Failed to open store"),
        );

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Authorization header for `user`.
    pub fn auth(user: &str) -> String {
        format!("Bearer {}", token(user, None))
    }

    /// Authorization header for `user` with a display name claim.
    pub fn auth_named(user: &str, name: &str) -> String {
        format!("Bearer {}", token(user, Some(name)))
    }

    /// Sign `user` in with a display name and return the account JSON.
    pub async fn sign_in(&self, user: &str, name: &str) -> serde_json::Value {
        let response = self
            .server
            .post("/v1/accounts")
            .add_header("authorization", Self::auth_named(user, name))
            .json(&json!({}))
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Credit `coins` to `user` through a settled top-up.
    pub fn fund(&self, user: &str, coins: i64) {
        let n = SEED_ORDERS.fetch_add(1, Ordering::Relaxed);
        let order_id = OrderId::new(format!("seed-{n}")).unwrap();
        let record =
            PaymentRecord::pending(order_id.clone(), user_id(user), coins * 100, coins).unwrap();
        self.store.create_payment(&record).unwrap();
        self.store
            .settle_payment(&PaymentNotice {
                order_id,
                transaction_status: "settlement".into(),
                fraud_status: Some("accept".into()),
            })
            .unwrap();
    }

    /// Save and publish a character, returning its catalog ID.
    pub async fn publish(&self, owner: &str, name: &str) -> String {
        self.server
            .post("/v1/characters")
            .add_header("authorization", Self::auth(owner))
            .json(&json!({
                "name": name,
                "description": format!("{name} is a wandering bard."),
            }))
            .await
            .assert_status_ok();

        let response = self
            .server
            .post(&format!("/v1/characters/{name}/publish"))
            .add_header("authorization", Self::auth(owner))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["id"].as_str().unwrap().to_string()
    }

    /// Current coin balance from the store.
    pub fn coins(&self, user: &str) -> i64 {
        self.store
            .get_account(&user_id(user))
            .unwrap()
            .expect("account exists")
            .coins
    }

    /// Notifications for `user`, newest first.
    pub async fn notifications(&self, user: &str) -> Vec<serde_json::Value> {
        let response = self
            .server
            .get("/v1/notifications")
            .add_header("authorization", Self::auth(user))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["notifications"].as_array().unwrap().clone()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a user ID.
pub fn user_id(user: &str) -> UserId {
    UserId::new(user).unwrap()
}

/// A signed identity token for `user`.
pub fn token(user: &str, name: Option<&str>) -> String {
    let claims = JwtClaims {
        sub: user.to_string(),
        aud: Some(json!("atelier")),
        iss: Some(JWT_ISSUER.into()),
        exp: chrono::Utc::now().timestamp() + 3600,
        iat: Some(chrono::Utc::now().timestamp()),
        name: name.map(String::from),
        email: Some(format!("{user}@example.com")),
        picture: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// A Midtrans notification body signed with the harness server key.
pub fn signed_notification(
    order_id: &str,
    gross_amount: &str,
    transaction_status: &str,
    fraud_status: Option<&str>,
) -> String {
    let status_code = "200";
    let signature = sha512_hex(&[order_id, status_code, gross_amount, MIDTRANS_SERVER_KEY]);

    let mut body = json!({
        "order_id": order_id,
        "status_code": status_code,
        "gross_amount": gross_amount,
        "signature_key": signature,
        "transaction_status": transaction_status,
        "payment_type": "bank_transfer",
    });
    if let Some(fraud) = fraud_status {
        body["fraud_status"] = json!(fraud);
    }
    body.to_string()
}
