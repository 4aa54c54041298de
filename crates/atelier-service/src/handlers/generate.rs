//! Generative-AI proxy handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::generative::{extract_text, GeminiClient, GenerateRequest, GenerativeError};
use crate::state::AppState;

fn client(state: &AppState) -> Result<&GeminiClient, ApiError> {
    state
        .generative
        .as_deref()
        .ok_or_else(|| ApiError::Internal {
            message: "Generative AI not configured".into(),
            detail: None,
        })
}

fn provider_error(err: GenerativeError) -> ApiError {
    match err {
        GenerativeError::Api { status, body } => ApiError::Internal {
            message: format!("Generative AI error: HTTP {status}"),
            detail: Some(body),
        },
        other => ApiError::internal("Generative AI request failed", other),
    }
}

async fn forward(
    state: &AppState,
    auth: &AuthUser,
    request: &GenerateRequest,
) -> Result<serde_json::Value, ApiError> {
    if !request.has_parts() {
        return Err(ApiError::InvalidArgument(
            "contents must contain at least one part".into(),
        ));
    }
    let client = client(state)?;

    tracing::debug!(user_id = %auth.user_id, model = %client.model(), "Forwarding generation request");

    client.generate(request).await.map_err(provider_error)
}

/// Forward a `generateContent` request and return the provider JSON.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    forward(&state, &auth, &body).await.map(Json)
}

/// Extracted text response.
#[derive(Debug, Serialize)]
pub struct GenerateTextResponse {
    /// First candidate's first text part, without code fences.
    pub text: String,
}

/// Forward a request and return only the generated text.
pub async fn generate_text(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> Result<Json<GenerateTextResponse>, ApiError> {
    let response = forward(&state, &auth, &body).await?;

    let text = extract_text(&response).ok_or_else(|| ApiError::Internal {
        message: "Generative AI returned no text".into(),
        detail: Some(response.to_string()),
    })?;

    Ok(Json(GenerateTextResponse { text }))
}
