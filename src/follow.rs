use serde::Serialize;
use spin_sdk::http::{Request, Response};

use crate::auth::validate_token;
use crate::core::errors::{ApiError, ChatterError, Result};
use crate::core::helpers::{success, validate_uuid};
use crate::core::store::KeyValueStore;
use crate::feed::user_list;
use crate::models::models::{NotificationKind, PublicUser, User};
use crate::notifications::add_notification;
use crate::users::{get_users, save_users};

#[derive(Serialize, Debug, Clone)]
pub struct FollowToggle {
    pub following: bool,
    pub follower: PublicUser,
    pub target: PublicUser,
}

/// Follow `target_id`, or unfollow when already following. Both users'
/// lists change together; a new follow notifies the target.
pub fn toggle_follow(store: &dyn KeyValueStore, follower_id: &str, target_id: &str) -> Result<FollowToggle> {
    if follower_id == target_id {
        return Err(ChatterError::SelfFollow);
    }

    let mut users = get_users(store)?;
    let follower_index = users
        .iter()
        .position(|u| u.id == follower_id)
        .ok_or(ChatterError::UserNotFound)?;
    let target_index = users
        .iter()
        .position(|u| u.id == target_id)
        .ok_or(ChatterError::UserNotFound)?;

    let was_following = users[follower_index].following.iter().any(|id| id == target_id);

    if was_following {
        users[follower_index].following.retain(|id| id != target_id);
        users[target_index].followers.retain(|id| id != follower_id);
    } else {
        users[follower_index].following.push(target_id.to_string());
        users[target_index].followers.push(follower_id.to_string());
    }

    save_users(store, &users)?;

    if !was_following {
        add_notification(store, target_id, follower_id, "started following you", NotificationKind::Follow)?;
    }

    tracing::info!(follower_id, target_id, following = !was_following, "follow toggled");
    Ok(FollowToggle {
        following: !was_following,
        follower: PublicUser::from(&users[follower_index]),
        target: PublicUser::from(&users[target_index]),
    })
}

fn lookup(users: &[User], ids: &[String]) -> Vec<PublicUser> {
    ids.iter()
        .filter_map(|id| users.iter().find(|u| &u.id == id))
        .map(PublicUser::from)
        .collect()
}

pub fn get_followers(store: &dyn KeyValueStore, user_id: &str) -> Result<Vec<PublicUser>> {
    let users = get_users(store)?;
    let user = users.iter().find(|u| u.id == user_id).ok_or(ChatterError::UserNotFound)?;
    Ok(lookup(&users, &user.followers))
}

pub fn get_following(store: &dyn KeyValueStore, user_id: &str) -> Result<Vec<PublicUser>> {
    let users = get_users(store)?;
    let user = users.iter().find(|u| u.id == user_id).ok_or(ChatterError::UserNotFound)?;
    Ok(lookup(&users, &user.following))
}

// === HTTP Handlers ===

pub fn handle_follow(store: &dyn KeyValueStore, req: &Request, target_user_id: &str) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    if !validate_uuid(target_user_id) {
        return Ok(ApiError::BadRequest("Invalid target user".to_string()).into());
    }

    match toggle_follow(store, &user_id, target_user_id) {
        Ok(toggle) => success(serde_json::json!({
            "following": toggle.following,
            "follower": toggle.follower,
            "target": toggle.target,
        })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn get_followers_list(store: &dyn KeyValueStore, req: &Request, user_id: &str) -> anyhow::Result<Response> {
    let viewer_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let followers = match get_followers(store, user_id) {
        Ok(f) => f,
        Err(e) => return Ok(ApiError::from(e).into()),
    };
    let items = match user_list(store, &followers, &viewer_id) {
        Ok(items) => items,
        Err(e) => return Ok(ApiError::from(e).into()),
    };
    success(serde_json::json!({ "users": items }))
}

pub fn get_following_list(store: &dyn KeyValueStore, req: &Request, user_id: &str) -> anyhow::Result<Response> {
    let viewer_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let following = match get_following(store, user_id) {
        Ok(f) => f,
        Err(e) => return Ok(ApiError::from(e).into()),
    };
    let items = match user_list(store, &following, &viewer_id) {
        Ok(items) => items,
        Err(e) => return Ok(ApiError::from(e).into()),
    };
    success(serde_json::json!({ "users": items }))
}
