//! Account management handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::{Profile, UserAccount};
use atelier_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, OptionalJson};
use crate::state::AppState;

/// Account response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// User ID.
    pub user_id: String,
    /// Coin balance.
    pub coins: i64,
    /// Display name.
    pub display_name: Option<String>,
    /// Avatar URL.
    pub photo_url: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Created timestamp.
    pub created_at: String,
    /// Last sign-in timestamp.
    pub last_login: String,
}

impl From<&UserAccount> for AccountResponse {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.id.to_string(),
            coins: account.coins,
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
            email: account.email.clone(),
            created_at: account.created_at.to_rfc3339(),
            last_login: account.last_login.to_rfc3339(),
        }
    }
}

/// Sign-in request. Fields override the token's profile claims; the body may be empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

/// Register on first sign-in, or refresh the profile on later ones.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    OptionalJson(body): OptionalJson<SignInRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let claims = auth.profile();
    let profile = Profile {
        display_name: body.display_name.or(claims.display_name),
        photo_url: body.photo_url.or(claims.photo_url),
        email: body.email.or(claims.email),
    };

    let account = state.store.sign_in(&auth.user_id, profile)?;

    tracing::info!(user_id = %auth.user_id, coins = account.coins, "User signed in");

    Ok(Json(AccountResponse::from(&account)))
}

/// Get the current user's account.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .store
        .get_account(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    Ok(Json(AccountResponse::from(&account)))
}

/// Profile update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// New display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// New avatar URL.
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Change display name and/or photo URL.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    if body.display_name.is_none() && body.photo_url.is_none() {
        return Err(ApiError::InvalidArgument(
            "displayName or photoUrl is required".into(),
        ));
    }
    if body.display_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::InvalidArgument("displayName must not be empty".into()));
    }

    let account = state
        .store
        .update_profile(&auth.user_id, body.display_name, body.photo_url)?;

    tracing::info!(user_id = %auth.user_id, "Profile updated");

    Ok(Json(AccountResponse::from(&account)))
}
