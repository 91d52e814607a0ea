use spin_sdk::http::{Request, Response};

use crate::auth::validate_token;
use crate::config::{notifications_key, NOTIFICATION_BADGE_MAX};
use crate::core::errors::{ApiError, ChatterError, Result};
use crate::core::helpers::{new_id, now, success};
use crate::core::store::{JsonStore, KeyValueStore};
use crate::models::models::{Notification, NotificationKind};

pub fn get_user_notifications(store: &dyn KeyValueStore, user_id: &str) -> anyhow::Result<Vec<Notification>> {
    Ok(store.get_json(&notifications_key(user_id))?.unwrap_or_default())
}

fn save_notifications(
    store: &dyn KeyValueStore,
    user_id: &str,
    notifications: &[Notification],
) -> anyhow::Result<()> {
    store.set_json(&notifications_key(user_id), notifications)
}

/// Newest first: new notifications are prepended.
pub fn add_notification(
    store: &dyn KeyValueStore,
    user_id: &str,
    from_user_id: &str,
    message: &str,
    kind: NotificationKind,
) -> anyhow::Result<Notification> {
    let mut notifications = get_user_notifications(store, user_id)?;

    let notification = Notification {
        id: new_id(),
        from_user_id: from_user_id.to_string(),
        message: message.to_string(),
        read: false,
        timestamp: now(),
        kind,
    };

    notifications.insert(0, notification.clone());
    save_notifications(store, user_id, &notifications)?;

    tracing::debug!(user_id, from_user_id, "notification added");
    Ok(notification)
}

pub fn mark_notification_as_read(
    store: &dyn KeyValueStore,
    user_id: &str,
    notification_id: &str,
) -> Result<Notification> {
    let mut notifications = get_user_notifications(store, user_id)?;
    let notification = notifications
        .iter_mut()
        .find(|n| n.id == notification_id)
        .ok_or(ChatterError::NotificationNotFound)?;

    notification.read = true;
    let updated = notification.clone();
    save_notifications(store, user_id, &notifications)?;
    Ok(updated)
}

pub fn mark_all_notifications_as_read(
    store: &dyn KeyValueStore,
    user_id: &str,
) -> anyhow::Result<Vec<Notification>> {
    let mut notifications = get_user_notifications(store, user_id)?;
    for n in notifications.iter_mut() {
        n.read = true;
    }
    save_notifications(store, user_id, &notifications)?;
    Ok(notifications)
}

/// Removing an unknown id is not an error.
pub fn delete_notification(store: &dyn KeyValueStore, user_id: &str, notification_id: &str) -> anyhow::Result<()> {
    let mut notifications = get_user_notifications(store, user_id)?;
    notifications.retain(|n| n.id != notification_id);
    save_notifications(store, user_id, &notifications)
}

pub fn clear_all_notifications(store: &dyn KeyValueStore, user_id: &str) -> anyhow::Result<()> {
    save_notifications(store, user_id, &[])
}

pub fn unread_count(store: &dyn KeyValueStore, user_id: &str) -> anyhow::Result<usize> {
    Ok(get_user_notifications(store, user_id)?
        .iter()
        .filter(|n| !n.read)
        .count())
}

/// Text for the unread badge; no badge at all when everything is read.
pub fn badge_label(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        n if n > NOTIFICATION_BADGE_MAX => Some(format!("{}+", NOTIFICATION_BADGE_MAX)),
        n => Some(n.to_string()),
    }
}

// === HTTP Handlers ===

pub fn get_unread_count(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let unread = unread_count(store, &user_id)?;
    success(serde_json::json!({ "unread": unread, "badge": badge_label(unread) }))
}

pub fn read_one(store: &dyn KeyValueStore, req: &Request, notification_id: &str) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    match mark_notification_as_read(store, &user_id, notification_id) {
        Ok(notification) => success(serde_json::json!({ "notification": notification })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn read_all(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let notifications = mark_all_notifications_as_read(store, &user_id)?;
    success(serde_json::json!({ "notifications": notifications }))
}

pub fn delete_one(store: &dyn KeyValueStore, req: &Request, notification_id: &str) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    delete_notification(store, &user_id, notification_id)?;
    success(serde_json::json!({}))
}

pub fn clear_all(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    clear_all_notifications(store, &user_id)?;
    success(serde_json::json!({}))
}
