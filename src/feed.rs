//! Read models for the feed, comment thread, notification panel and
//! follower lists: the data each screen shows, including its empty state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use spin_sdk::http::{Request, Response};

use crate::auth::validate_token;
use crate::config::DEFAULT_AVATAR;
use crate::core::errors::{ApiError, ChatterError, Result};
use crate::core::helpers::{format_relative_time, now, success};
use crate::core::store::KeyValueStore;
use crate::models::models::{Comment, NotificationKind, Post, PublicUser, Reply, User};
use crate::notifications::{badge_label, get_user_notifications};
use crate::posts::get_all_posts;
use crate::users::get_users;

const UNKNOWN_AUTHOR: &str = "Unknown user";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Listing<T> {
    Empty(EmptyState),
    Items { items: Vec<T> },
}

impl<T> Listing<T> {
    fn from_items(items: Vec<T>, empty: EmptyState) -> Self {
        if items.is_empty() {
            Listing::Empty(empty)
        } else {
            Listing::Items { items }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Listing::Empty(_))
    }

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Empty(_) => &[],
            Listing::Items { items } => items,
        }
    }
}

pub const NO_POSTS: EmptyState = EmptyState {
    message: "No posts yet",
    action: Some("Create your first post"),
};
pub const NO_COMMENTS: EmptyState = EmptyState {
    message: "No comments yet",
    action: None,
};
pub const NO_NOTIFICATIONS: EmptyState = EmptyState {
    message: "No notifications yet",
    action: None,
};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: String,
    pub username: String,
    pub avatar: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub author: AuthorView,
    pub image: String,
    pub caption: String,
    pub like_count: usize,
    pub likes_label: String,
    pub comment_count: usize,
    pub liked: bool,
    pub is_own: bool,
    pub following_author: bool,
    pub time_ago: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub author: AuthorView,
    pub text: String,
    pub is_own: bool,
    pub can_reply: bool,
    pub time_ago: String,
    pub replies: Vec<ReplyView>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub id: String,
    pub author: AuthorView,
    pub text: String,
    pub time_ago: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub from: AuthorView,
    pub message: String,
    pub read: bool,
    pub time_ago: String,
    #[serde(flatten)]
    pub kind: NotificationKind,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
    #[serde(flatten)]
    pub user: AuthorView,
    /// "Follow" or "Unfollow"; absent for the viewer's own entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
}

pub fn likes_label(count: usize) -> String {
    match count {
        0 => "No likes yet".to_string(),
        1 => "1 like".to_string(),
        n => format!("{} likes", n),
    }
}

/// Users by id, for resolving authors without rescanning the collection.
struct Directory {
    users: HashMap<String, User>,
}

impl Directory {
    fn load(store: &dyn KeyValueStore) -> anyhow::Result<Self> {
        let users = get_users(store)?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        Ok(Directory { users })
    }

    fn get(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    fn author(&self, id: &str) -> AuthorView {
        match self.users.get(id) {
            Some(user) => AuthorView {
                id: user.id.clone(),
                username: user.username.clone(),
                avatar: user
                    .profile_image
                    .clone()
                    .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            },
            None => AuthorView {
                id: id.to_string(),
                username: UNKNOWN_AUTHOR.to_string(),
                avatar: DEFAULT_AVATAR.to_string(),
            },
        }
    }
}

fn post_view(directory: &Directory, viewer: &User, post: &Post, at: DateTime<Utc>) -> PostView {
    PostView {
        id: post.id.clone(),
        author: directory.author(&post.user_id),
        image: post.image.clone(),
        caption: post.caption.clone(),
        like_count: post.likes.len(),
        likes_label: likes_label(post.likes.len()),
        comment_count: post.comments.len(),
        liked: post.likes.contains(&viewer.id),
        is_own: post.user_id == viewer.id,
        following_author: viewer.following.contains(&post.user_id),
        time_ago: format_relative_time(post.created_at, at),
    }
}

fn reply_view(directory: &Directory, reply: &Reply, at: DateTime<Utc>) -> ReplyView {
    ReplyView {
        id: reply.id.clone(),
        author: directory.author(&reply.user_id),
        text: reply.text.clone(),
        time_ago: format_relative_time(reply.created_at, at),
    }
}

fn comment_view(directory: &Directory, viewer_id: &str, post: &Post, comment: &Comment, at: DateTime<Utc>) -> CommentView {
    let is_own = comment.user_id == viewer_id;
    CommentView {
        id: comment.id.clone(),
        author: directory.author(&comment.user_id),
        text: comment.text.clone(),
        is_own,
        can_reply: post.user_id == viewer_id && !is_own,
        time_ago: format_relative_time(comment.created_at, at),
        replies: comment
            .replies
            .iter()
            .map(|r| reply_view(directory, r, at))
            .collect(),
    }
}

/// Every post, newest first, as `viewer_id` sees it.
pub fn load_feed(store: &dyn KeyValueStore, viewer_id: &str) -> Result<Listing<PostView>> {
    let directory = Directory::load(store)?;
    let viewer = directory.get(viewer_id).ok_or(ChatterError::UserNotFound)?;
    let at = now();

    let views = get_all_posts(store)?
        .iter()
        .map(|post| post_view(&directory, viewer, post, at))
        .collect();
    Ok(Listing::from_items(views, NO_POSTS))
}

pub fn load_comments(store: &dyn KeyValueStore, post_id: &str, viewer_id: &str) -> Result<Listing<CommentView>> {
    let posts = get_all_posts(store)?;
    let post = posts
        .iter()
        .find(|p| p.id == post_id)
        .ok_or(ChatterError::PostNotFound)?;
    let directory = Directory::load(store)?;
    let at = now();

    let views = post
        .comments
        .iter()
        .map(|c| comment_view(&directory, viewer_id, post, c, at))
        .collect();
    Ok(Listing::from_items(views, NO_COMMENTS))
}

pub fn load_notifications(store: &dyn KeyValueStore, viewer_id: &str) -> anyhow::Result<Listing<NotificationView>> {
    let directory = Directory::load(store)?;
    let at = now();

    let views = get_user_notifications(store, viewer_id)?
        .into_iter()
        .map(|n| NotificationView {
            from: directory.author(&n.from_user_id),
            time_ago: format_relative_time(n.timestamp, at),
            id: n.id,
            message: n.message,
            read: n.read,
            kind: n.kind,
        })
        .collect();
    Ok(Listing::from_items(views, NO_NOTIFICATIONS))
}

/// Follower/following list entries with the action the viewer can take.
pub fn user_list(store: &dyn KeyValueStore, users: &[PublicUser], viewer_id: &str) -> Result<Vec<UserListItem>> {
    let directory = Directory::load(store)?;
    let viewer = directory.get(viewer_id).ok_or(ChatterError::UserNotFound)?;

    Ok(users
        .iter()
        .map(|user| UserListItem {
            user: directory.author(&user.id),
            action: if user.id == viewer.id {
                None
            } else if viewer.following.contains(&user.id) {
                Some("Unfollow")
            } else {
                Some("Follow")
            },
        })
        .collect())
}

// === HTTP Handlers ===

pub fn get_feed(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    match load_feed(store, &user_id) {
        Ok(feed) => success(serde_json::json!({ "feed": feed })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn get_comments(store: &dyn KeyValueStore, req: &Request, post_id: &str) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    match load_comments(store, post_id, &user_id) {
        Ok(comments) => success(serde_json::json!({ "comments": comments })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn get_notifications(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let listing = load_notifications(store, &user_id)?;
    let unread = listing.items().iter().filter(|n| !n.read).count();
    success(serde_json::json!({
        "notifications": listing,
        "unread": unread,
        "badge": badge_label(unread),
    }))
}
