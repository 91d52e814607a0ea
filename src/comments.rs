use serde::{Deserialize, Serialize};
use spin_sdk::http::{Request, Response};

use crate::auth::validate_token;
use crate::config::MAX_COMMENT_LENGTH;
use crate::core::errors::{ApiError, ChatterError, Result};
use crate::core::helpers::{new_id, now, preview, read_json, required, sanitize_text, success, success_with_status};
use crate::core::store::KeyValueStore;
use crate::models::models::{Comment, NotificationKind, Post, Reply};
use crate::notifications::add_notification;
use crate::posts::{get_all_posts, save_posts};

#[derive(Serialize, Debug, Clone)]
pub struct CommentAdded {
    pub comment: Comment,
    pub post: Post,
}

#[derive(Serialize, Debug, Clone)]
pub struct ReplyAdded {
    pub reply: Reply,
    pub comment: Comment,
}

/// Append a comment. The post owner is notified unless they wrote it.
pub fn add_comment(store: &dyn KeyValueStore, post_id: &str, user_id: &str, text: &str) -> Result<CommentAdded> {
    let mut posts = get_all_posts(store)?;
    let post = posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or(ChatterError::PostNotFound)?;

    let comment = Comment {
        id: new_id(),
        user_id: user_id.to_string(),
        text: text.to_string(),
        created_at: now(),
        replies: Vec::new(),
    };
    post.comments.push(comment.clone());

    let post = post.clone();
    save_posts(store, &posts)?;

    if user_id != post.user_id {
        add_notification(
            store,
            &post.user_id,
            user_id,
            &format!("commented on your post: \"{}\"", preview(text)),
            NotificationKind::Comment {
                post_id: post.id.clone(),
                comment_id: comment.id.clone(),
            },
        )?;
    }

    Ok(CommentAdded { comment, post })
}

fn find_comment<'a>(posts: &'a mut [Post], post_id: &str, comment_id: &str) -> Result<&'a mut Comment> {
    posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or(ChatterError::PostNotFound)?
        .comments
        .iter_mut()
        .find(|c| c.id == comment_id)
        .ok_or(ChatterError::CommentNotFound)
}

pub fn update_comment(
    store: &dyn KeyValueStore,
    post_id: &str,
    comment_id: &str,
    user_id: &str,
    text: &str,
) -> Result<Comment> {
    let mut posts = get_all_posts(store)?;
    let comment = find_comment(&mut posts, post_id, comment_id)?;

    if comment.user_id != user_id {
        return Err(ChatterError::NotAuthorized("update this comment"));
    }

    comment.text = text.to_string();
    let updated = comment.clone();
    save_posts(store, &posts)?;
    Ok(updated)
}

pub fn delete_comment(store: &dyn KeyValueStore, post_id: &str, comment_id: &str, user_id: &str) -> Result<()> {
    let mut posts = get_all_posts(store)?;
    let post = posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or(ChatterError::PostNotFound)?;
    let index = post
        .comments
        .iter()
        .position(|c| c.id == comment_id)
        .ok_or(ChatterError::CommentNotFound)?;

    if post.comments[index].user_id != user_id {
        return Err(ChatterError::NotAuthorized("delete this comment"));
    }

    post.comments.remove(index);
    save_posts(store, &posts)?;
    Ok(())
}

/// Append a reply under a comment. The comment author is notified unless
/// they are replying to themselves.
pub fn add_reply(
    store: &dyn KeyValueStore,
    post_id: &str,
    comment_id: &str,
    user_id: &str,
    text: &str,
) -> Result<ReplyAdded> {
    let mut posts = get_all_posts(store)?;
    let comment = find_comment(&mut posts, post_id, comment_id)?;

    let reply = Reply {
        id: new_id(),
        user_id: user_id.to_string(),
        text: text.to_string(),
        created_at: now(),
    };
    comment.replies.push(reply.clone());

    let comment = comment.clone();
    save_posts(store, &posts)?;

    if user_id != comment.user_id {
        add_notification(
            store,
            &comment.user_id,
            user_id,
            &format!("replied to your comment: \"{}\"", preview(text)),
            NotificationKind::Reply {
                post_id: post_id.to_string(),
                comment_id: comment.id.clone(),
                reply_id: reply.id.clone(),
            },
        )?;
    }

    Ok(ReplyAdded { reply, comment })
}

// === HTTP Handlers ===

#[derive(Deserialize)]
struct CommentBody {
    #[serde(default)]
    text: String,
}

fn comment_text(req: &Request) -> std::result::Result<String, ApiError> {
    let body: CommentBody = read_json(req)?;
    let text = sanitize_text(&body.text);
    let text = required(&text, "Comment")?.to_string();
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ApiError::BadRequest("Comment is too long".to_string()));
    }
    Ok(text)
}

pub fn post_comment(store: &dyn KeyValueStore, req: &Request, post_id: &str) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    let text = match comment_text(req) {
        Ok(t) => t,
        Err(e) => return Ok(e.into()),
    };

    match add_comment(store, post_id, &user_id, &text) {
        Ok(added) => success_with_status(201, serde_json::json!({ "comment": added.comment, "post": added.post })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn edit_comment(
    store: &dyn KeyValueStore,
    req: &Request,
    post_id: &str,
    comment_id: &str,
) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    let text = match comment_text(req) {
        Ok(t) => t,
        Err(e) => return Ok(e.into()),
    };

    match update_comment(store, post_id, comment_id, &user_id, &text) {
        Ok(comment) => success(serde_json::json!({ "comment": comment })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn remove_comment(
    store: &dyn KeyValueStore,
    req: &Request,
    post_id: &str,
    comment_id: &str,
) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    match delete_comment(store, post_id, comment_id, &user_id) {
        Ok(()) => success(serde_json::json!({})),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn post_reply(
    store: &dyn KeyValueStore,
    req: &Request,
    post_id: &str,
    comment_id: &str,
) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    let text = match comment_text(req) {
        Ok(t) => t,
        Err(e) => return Ok(e.into()),
    };

    match add_reply(store, post_id, comment_id, &user_id, &text) {
        Ok(added) => success_with_status(201, serde_json::json!({ "reply": added.reply, "comment": added.comment })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}
