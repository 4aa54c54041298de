//! Owned character handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::{validate_name, OwnedCharacter};
use atelier_store::Store;

use super::catalog::GlobalCharacterResponse;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Owned character response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterResponse {
    /// Name, unique per owner.
    pub name: String,
    /// Character sheet text.
    pub description: String,
    /// Illustration URL.
    pub illustration_url: Option<String>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&OwnedCharacter> for CharacterResponse {
    fn from(character: &OwnedCharacter) -> Self {
        Self {
            name: character.name.clone(),
            description: character.description.clone(),
            illustration_url: character.illustration_url.clone(),
            created_at: character.created_at.to_rfc3339(),
        }
    }
}

/// List response.
#[derive(Debug, Serialize)]
pub struct CharacterListResponse {
    /// Newest first.
    pub characters: Vec<CharacterResponse>,
}

/// Save request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    /// Name.
    pub name: String,
    /// Character sheet text.
    pub description: String,
    /// Illustration URL.
    #[serde(default)]
    pub illustration_url: Option<String>,
}

/// Save a new character into the caller's collection.
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreateCharacterRequest>,
) -> Result<Json<CharacterResponse>, ApiError> {
    let character = OwnedCharacter::new(body.name, body.description, body.illustration_url)?;

    state.store.create_character(&auth.user_id, &character)?;

    tracing::info!(user_id = %auth.user_id, name = %character.name, "Character saved");

    Ok(Json(CharacterResponse::from(&character)))
}

/// List the caller's characters.
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<CharacterListResponse>, ApiError> {
    let characters = state.store.list_characters(&auth.user_id)?;

    Ok(Json(CharacterListResponse {
        characters: characters.iter().map(CharacterResponse::from).collect(),
    }))
}

/// Get one of the caller's characters.
pub async fn get_character(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<CharacterResponse>, ApiError> {
    validate_name(&name)?;

    let character = state
        .store
        .get_character(&auth.user_id, &name)?
        .ok_or_else(|| ApiError::NotFound(format!("character not found: {name}")))?;

    Ok(Json(CharacterResponse::from(&character)))
}

/// Illustration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IllustrationRequest {
    /// Uploaded image URL.
    pub illustration_url: String,
}

/// Attach an illustration to one of the caller's characters.
pub async fn set_illustration(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(name): Path<String>,
    ApiJson(body): ApiJson<IllustrationRequest>,
) -> Result<Json<CharacterResponse>, ApiError> {
    validate_name(&name)?;
    if body.illustration_url.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "illustrationUrl must not be empty".into(),
        ));
    }

    let character = state
        .store
        .set_illustration(&auth.user_id, &name, body.illustration_url)?;

    Ok(Json(CharacterResponse::from(&character)))
}

/// Delete one of the caller's characters.
pub async fn delete_character(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    validate_name(&name)?;

    state.store.delete_character(&auth.user_id, &name)?;

    tracing::info!(user_id = %auth.user_id, name = %name, "Character deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Publish one of the caller's characters to the catalog.
pub async fn publish_character(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<GlobalCharacterResponse>, ApiError> {
    validate_name(&name)?;

    let global = state.store.publish(&auth.user_id, &name)?;

    Ok(Json(GlobalCharacterResponse::new(&global, None)))
}
