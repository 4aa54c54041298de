//! Atelier HTTP API Service.
//!
//! This crate provides the HTTP API for the atelier coin economy, including:
//!
//! - Account sign-in and profiles
//! - Owned characters and the shared catalog (publish, purchase, vote)
//! - Notifications
//! - Coin top-ups through Midtrans Snap and the settlement webhook
//! - A Gemini proxy for the generation features
//!
//! # Authentication
//!
//! End users present an HS256 identity token as a bearer token. The payment webhook
//! is unauthenticated and trusts only notifications whose Midtrans signature matches.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router even when they don't await

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod generative;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use gateway::{GatewayError, MidtransClient};
pub use generative::{GeminiClient, GenerativeError};
pub use routes::create_router;
pub use state::AppState;
