//! Notification handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::{Notification, NotificationId, NotificationType};
use atelier_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

/// Notification response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    /// Notification ID.
    pub id: String,
    /// Kind.
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Rendered text.
    pub message: String,
    /// Written at.
    pub timestamp: String,
    /// Seen by the user.
    pub is_read: bool,
    /// Order behind a top-up notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl From<&Notification> for NotificationResponse {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            notification_type: n.notification_type,
            message: n.message.clone(),
            timestamp: n.timestamp.to_rfc3339(),
            is_read: n.is_read,
            order_id: n.order_id.as_ref().map(ToString::to_string),
        }
    }
}

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListNotificationsQuery {
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
}

/// List response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    /// Newest first.
    pub notifications: Vec<NotificationResponse>,
    /// Unread count among the returned notifications.
    pub unread_count: usize,
}

/// List the caller's notifications.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListNotificationsQuery>,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let notifications = state
        .store
        .list_notifications(&auth.user_id, query.unread_only)?;

    Ok(Json(NotificationListResponse {
        unread_count: notifications.iter().filter(|n| !n.is_read).count(),
        notifications: notifications.iter().map(NotificationResponse::from).collect(),
    }))
}

/// Mark one of the caller's notifications as read.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let id: NotificationId = id
        .parse()
        .map_err(|e| ApiError::InvalidArgument(format!("invalid notification id: {e}")))?;

    let notification = state.store.mark_notification_read(&auth.user_id, &id)?;

    Ok(Json(NotificationResponse::from(&notification)))
}
