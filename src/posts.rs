use serde::{Deserialize, Serialize};
use spin_sdk::http::{Request, Response};

use crate::auth::validate_token;
use crate::config::*;
use crate::core::errors::{ApiError, ChatterError, Result};
use crate::core::helpers::{
    new_id, now, payload_bytes, read_json, required, sanitize_text, success, success_with_status,
    validate_uuid,
};
use crate::core::query_params::{get_string, parse_query_params};
use crate::core::store::{JsonStore, KeyValueStore};
use crate::models::models::{Post, PostUpdate};

pub fn get_all_posts(store: &dyn KeyValueStore) -> anyhow::Result<Vec<Post>> {
    Ok(store.get_json(POSTS_KEY)?.unwrap_or_default())
}

pub fn save_posts(store: &dyn KeyValueStore, posts: &[Post]) -> anyhow::Result<()> {
    store.set_json(POSTS_KEY, posts)
}

pub fn get_user_posts(store: &dyn KeyValueStore, user_id: &str) -> anyhow::Result<Vec<Post>> {
    let mut posts = get_all_posts(store)?;
    posts.retain(|p| p.user_id == user_id);
    Ok(posts)
}

/// New posts go to the front so the collection reads newest first.
pub fn create_post(store: &dyn KeyValueStore, user_id: &str, image: &str, caption: &str) -> Result<Post> {
    let mut posts = get_all_posts(store)?;

    let post = Post {
        id: new_id(),
        user_id: user_id.to_string(),
        image: image.to_string(),
        caption: caption.to_string(),
        likes: Vec::new(),
        comments: Vec::new(),
        created_at: now(),
    };

    posts.insert(0, post.clone());
    save_posts(store, &posts)?;

    tracing::info!(post_id = %post.id, user_id, "post created");
    Ok(post)
}

pub fn update_post(
    store: &dyn KeyValueStore,
    post_id: &str,
    user_id: &str,
    update: PostUpdate,
) -> Result<Post> {
    let mut posts = get_all_posts(store)?;
    let post = posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or(ChatterError::PostNotFound)?;

    if post.user_id != user_id {
        return Err(ChatterError::NotAuthorized("update this post"));
    }

    if let Some(caption) = update.caption {
        post.caption = caption;
    }
    if let Some(image) = update.image {
        post.image = image;
    }

    let updated = post.clone();
    save_posts(store, &posts)?;
    Ok(updated)
}

pub fn delete_post(store: &dyn KeyValueStore, post_id: &str, user_id: &str) -> Result<()> {
    let mut posts = get_all_posts(store)?;
    let index = posts
        .iter()
        .position(|p| p.id == post_id)
        .ok_or(ChatterError::PostNotFound)?;

    if posts[index].user_id != user_id {
        return Err(ChatterError::NotAuthorized("delete this post"));
    }

    posts.remove(index);
    save_posts(store, &posts)?;

    tracing::info!(post_id, user_id, "post deleted");
    Ok(())
}

#[derive(Serialize, Debug, Clone)]
pub struct LikeToggle {
    pub liked: bool,
    pub post: Post,
}

/// Flip `user_id`'s like on a post.
pub fn toggle_like(store: &dyn KeyValueStore, post_id: &str, user_id: &str) -> Result<LikeToggle> {
    let mut posts = get_all_posts(store)?;
    let post = posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or(ChatterError::PostNotFound)?;

    let liked = match post.likes.iter().position(|id| id == user_id) {
        Some(index) => {
            post.likes.remove(index);
            false
        }
        None => {
            post.likes.push(user_id.to_string());
            true
        }
    };

    let post = post.clone();
    save_posts(store, &posts)?;
    Ok(LikeToggle { liked, post })
}

// === HTTP Handlers ===

#[derive(Deserialize)]
struct NewPost {
    #[serde(default)]
    image: String,
    #[serde(default)]
    caption: String,
}

pub fn handle_create_post(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    let body: NewPost = match read_json(req) {
        Ok(b) => b,
        Err(e) => return Ok(e.into()),
    };

    let image = body.image.trim();
    if image.is_empty() {
        return Ok(ApiError::BadRequest("Please upload an image".to_string()).into());
    }
    if payload_bytes(image) > MAX_POST_IMAGE_BYTES {
        return Ok(ApiError::BadRequest("Image size must be less than 5MB".to_string()).into());
    }
    let caption = sanitize_text(&body.caption);
    let caption = match required(&caption, "Caption") {
        Ok(c) => c.to_string(),
        Err(_) => return Ok(ApiError::BadRequest("Please add a caption".to_string()).into()),
    };
    if caption.chars().count() > MAX_CAPTION_LENGTH {
        return Ok(ApiError::BadRequest("Caption is too long".to_string()).into());
    }

    match create_post(store, &user_id, image, &caption) {
        Ok(post) => success_with_status(201, serde_json::json!({ "post": post })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

/// `GET /posts` lists everything, `GET /posts?user=<id>` one author's posts.
pub fn list_posts(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let params = parse_query_params(&req.uri());
    let posts = match get_string(&params, "user") {
        Some(user_id) => get_user_posts(store, &user_id)?,
        None => get_all_posts(store)?,
    };
    success(serde_json::json!({ "posts": posts }))
}

pub fn edit_post(store: &dyn KeyValueStore, req: &Request, post_id: &str) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    if !validate_uuid(post_id) {
        return Ok(ApiError::BadRequest("Post ID required".to_string()).into());
    }
    let mut update: PostUpdate = match read_json(req) {
        Ok(u) => u,
        Err(e) => return Ok(e.into()),
    };

    if let Some(image) = &update.image {
        if payload_bytes(image) > MAX_POST_IMAGE_BYTES {
            return Ok(ApiError::BadRequest("Image size must be less than 5MB".to_string()).into());
        }
    }
    if let Some(caption) = update.caption.take() {
        let caption = sanitize_text(&caption);
        let caption = match required(&caption, "Caption") {
            Ok(c) => c.to_string(),
            Err(_) => return Ok(ApiError::BadRequest("Please add a caption".to_string()).into()),
        };
        if caption.chars().count() > MAX_CAPTION_LENGTH {
            return Ok(ApiError::BadRequest("Caption is too long".to_string()).into());
        }
        update.caption = Some(caption);
    }

    match update_post(store, post_id, &user_id, update) {
        Ok(post) => success(serde_json::json!({ "post": post })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn remove_post(store: &dyn KeyValueStore, req: &Request, post_id: &str) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    if !validate_uuid(post_id) {
        return Ok(ApiError::BadRequest("Post ID required".to_string()).into());
    }

    match delete_post(store, post_id, &user_id) {
        Ok(()) => success(serde_json::json!({})),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn like_post(store: &dyn KeyValueStore, req: &Request, post_id: &str) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    match toggle_like(store, post_id, &user_id) {
        Ok(toggle) => success(serde_json::json!({ "liked": toggle.liked, "post": toggle.post })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}
