//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, catalog, characters, generate, health, notifications, payments};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for the generation proxy.
/// Each request holds a slow upstream call open.
const GENERATE_MAX_CONCURRENT_REQUESTS: usize = 16;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Accounts (JWT auth)
/// - `POST /v1/accounts` - Sign in (creates the account on first call)
/// - `GET /v1/accounts/me` - Get current user's account
/// - `PATCH /v1/accounts/me` - Update display name / photo
///
/// ## Characters (JWT auth)
/// - `POST /v1/characters` - Save a character
/// - `GET /v1/characters` - List own characters
/// - `GET|DELETE /v1/characters/{name}` - Get / delete a character
/// - `PUT /v1/characters/{name}/illustration` - Attach an illustration
/// - `POST /v1/characters/{name}/publish` - Publish to the catalog
///
/// ## Catalog (JWT auth)
/// - `GET /v1/catalog` - List published characters
/// - `GET /v1/catalog/{id}` - Get a published character
/// - `POST /v1/catalog/purchase` - Buy a copy
/// - `POST /v1/catalog/vote` - Like / dislike
///
/// ## Notifications (JWT auth)
/// - `GET /v1/notifications` - List notifications
/// - `POST /v1/notifications/{id}/read` - Mark as read
///
/// ## Payments (JWT auth)
/// - `POST /v1/topup` - Start a coin top-up
/// - `GET /v1/topup/config` - Snap embed settings
/// - `GET /v1/payments/{order_id}` - Payment status
///
/// ## Generation (JWT auth, rate-limited)
/// - `POST /v1/generate` - Gemini proxy
/// - `POST /v1/generate/text` - Gemini proxy, text only
///
/// ## Webhooks (Signature verification)
/// - `POST /webhooks/payment` - Midtrans notifications
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let generate_routes = Router::new()
        .route("/", post(generate::generate))
        .route("/text", post(generate::generate_text))
        .layer(ConcurrencyLimitLayer::new(GENERATE_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Accounts
        .route("/accounts", post(accounts::sign_in))
        .route(
            "/accounts/me",
            get(accounts::get_account).patch(accounts::update_profile),
        )
        // Characters
        .route(
            "/characters",
            get(characters::list_characters).post(characters::create_character),
        )
        .route(
            "/characters/:name",
            get(characters::get_character).delete(characters::delete_character),
        )
        .route(
            "/characters/:name/illustration",
            put(characters::set_illustration),
        )
        .route("/characters/:name/publish", post(characters::publish_character))
        // Catalog
        .route("/catalog", get(catalog::list_catalog))
        .route("/catalog/purchase", post(catalog::purchase))
        .route("/catalog/vote", post(catalog::vote))
        .route("/catalog/:id", get(catalog::get_global))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/:id/read", post(notifications::mark_read))
        // Payments
        .route("/topup", post(payments::create_topup))
        .route("/topup/config", get(payments::topup_config))
        .route("/payments/:order_id", get(payments::get_payment))
        // Generation (with its own concurrency limit)
        .nest("/generate", generate_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Webhooks (no rate limit - controlled by the gateway)
        .route("/webhooks/payment", post(payments::payment_webhook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
