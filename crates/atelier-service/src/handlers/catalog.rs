//! Shared catalog handlers: browse, purchase, vote.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::{GlobalCharacter, GlobalCharacterId, VoteKind, VoteState};
use atelier_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Catalog entry response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalCharacterResponse {
    /// Catalog ID.
    pub id: String,
    /// Name.
    pub name: String,
    /// Character sheet text.
    pub description: String,
    /// Illustration URL.
    pub illustration_url: Option<String>,
    /// Publisher.
    pub owner_id: String,
    /// Publisher's display name.
    pub owner_name: String,
    /// Successful purchases.
    pub copy_count: i64,
    /// Standing likes.
    pub like_count: i64,
    /// Standing dislikes.
    pub dislike_count: i64,
    /// Published timestamp.
    pub shared_at: String,
    /// The caller's standing vote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_vote: Option<VoteState>,
}

impl GlobalCharacterResponse {
    /// Build a response, optionally with the caller's vote.
    #[must_use]
    pub fn new(global: &GlobalCharacter, my_vote: Option<VoteState>) -> Self {
        Self {
            id: global.id.to_string(),
            name: global.name.clone(),
            description: global.description.clone(),
            illustration_url: global.illustration_url.clone(),
            owner_id: global.owner_id.to_string(),
            owner_name: global.owner_name.clone(),
            copy_count: global.copy_count,
            like_count: global.like_count,
            dislike_count: global.dislike_count,
            shared_at: global.shared_at.to_rfc3339(),
            my_vote,
        }
    }
}

/// Catalog list response.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    /// Most recently shared first.
    pub characters: Vec<GlobalCharacterResponse>,
}

fn parse_global_id(raw: Option<String>) -> Result<GlobalCharacterId, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::InvalidArgument("globalCharId is required".into()))?;
    GlobalCharacterId::new(raw)
        .map_err(|e| ApiError::InvalidArgument(format!("invalid globalCharId: {e}")))
}

/// List the catalog.
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<CatalogResponse>, ApiError> {
    let catalog = state.store.list_catalog()?;

    let characters = catalog
        .iter()
        .map(|global| {
            let vote = state.store.get_vote(&global.id, &auth.user_id)?;
            Ok(GlobalCharacterResponse::new(global, Some(vote)))
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(CatalogResponse { characters }))
}

/// Get one catalog entry.
pub async fn get_global(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<GlobalCharacterResponse>, ApiError> {
    let id = parse_global_id(Some(id))?;

    let global = state
        .store
        .get_global(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("character not found: {id}")))?;
    let vote = state.store.get_vote(&id, &auth.user_id)?;

    Ok(Json(GlobalCharacterResponse::new(&global, Some(vote))))
}

/// Purchase request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Catalog entry to buy.
    #[serde(default)]
    pub global_char_id: Option<String>,
}

/// Purchase response.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    /// Always true; failures are errors.
    pub success: bool,
    /// Confirmation text.
    pub message: String,
}

/// Buy a copy of a catalog character.
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let id = parse_global_id(body.global_char_id)?;

    let receipt = state.store.purchase(&auth.user_id, &id)?;

    tracing::info!(
        user_id = %auth.user_id,
        global_id = %id,
        coins_remaining = receipt.coins_remaining,
        "Character purchased"
    );

    Ok(Json(PurchaseResponse {
        success: true,
        message: format!(
            "Character \"{}\" has been added to your collection.",
            receipt.character.name
        ),
    }))
}

/// Vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// Catalog entry to vote on.
    #[serde(default)]
    pub global_char_id: Option<String>,
    /// `like` or `dislike`.
    #[serde(default)]
    pub vote_type: Option<String>,
}

/// Vote response.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    /// Always true; failures are errors.
    pub success: bool,
}

/// Toggle a like or dislike.
pub async fn vote(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let id = parse_global_id(body.global_char_id)?;
    let kind: VoteKind = body
        .vote_type
        .ok_or_else(|| ApiError::InvalidArgument("voteType is required".into()))?
        .parse()?;

    let transition = state.store.vote(&auth.user_id, &id, kind)?;

    tracing::debug!(
        user_id = %auth.user_id,
        global_id = %id,
        from = ?transition.from,
        to = ?transition.to,
        retracted = transition.is_retraction(),
        "Vote recorded"
    );

    Ok(Json(VoteResponse { success: true }))
}
