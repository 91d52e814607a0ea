use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::auth::validate_token;
use crate::config::*;
use crate::core::errors::{ApiError, ChatterError, Result};
use crate::core::helpers::{
    hash_password, new_id, now, payload_bytes, read_json, required, sanitize_text, success,
    success_with_status,
    validate_uuid, verify_password,
};
use crate::core::store::{JsonStore, KeyValueStore};
use crate::models::models::{ProfileUpdate, PublicUser, User};

pub fn get_users(store: &dyn KeyValueStore) -> anyhow::Result<Vec<User>> {
    Ok(store.get_json(USERS_KEY)?.unwrap_or_default())
}

pub fn save_users(store: &dyn KeyValueStore, users: &[User]) -> anyhow::Result<()> {
    store.set_json(USERS_KEY, users)
}

pub fn get_user(store: &dyn KeyValueStore, user_id: &str) -> Result<PublicUser> {
    get_users(store)?
        .iter()
        .find(|u| u.id == user_id)
        .map(PublicUser::from)
        .ok_or(ChatterError::UserNotFound)
}

/// Register a new account. Email and username must both be unused; on
/// failure the stored collection is left untouched.
pub fn create_user(
    store: &dyn KeyValueStore,
    email: &str,
    username: &str,
    password: &str,
) -> Result<PublicUser> {
    let mut users = get_users(store)?;

    if users.iter().any(|u| u.email == email) {
        return Err(ChatterError::EmailTaken);
    }
    if users.iter().any(|u| u.username == username) {
        return Err(ChatterError::UsernameTaken);
    }

    let user = User {
        id: new_id(),
        email: email.to_string(),
        username: username.to_string(),
        password: hash_password(password)?,
        profile_image: None,
        followers: Vec::new(),
        following: Vec::new(),
        created_at: now(),
    };

    users.push(user.clone());
    save_users(store, &users)?;

    tracing::info!(user_id = %user.id, username = %user.username, "user created");
    Ok(PublicUser::from(&user))
}

pub fn authenticate_user(store: &dyn KeyValueStore, email: &str, password: &str) -> Result<PublicUser> {
    let users = get_users(store)?;
    match users.iter().find(|u| u.email == email) {
        Some(user) if verify_password(password, &user.password) => Ok(PublicUser::from(user)),
        _ => Err(ChatterError::InvalidCredentials),
    }
}

pub fn update_user_profile(
    store: &dyn KeyValueStore,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<PublicUser> {
    let mut users = get_users(store)?;
    let user = users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or(ChatterError::UserNotFound)?;

    if let Some(image) = update.profile_image {
        if payload_bytes(&image) > MAX_PROFILE_IMAGE_BYTES {
            return Err(ChatterError::ProfileImageTooLarge);
        }
        user.profile_image = Some(image);
    }

    let updated = PublicUser::from(&*user);
    save_users(store, &users)?;
    Ok(updated)
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Regex should compile"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

// === HTTP Handlers ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUp {
    #[serde(default)]
    email: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    confirm_password: Option<String>,
}

fn validate_sign_up(form: &SignUp) -> std::result::Result<(String, String), ApiError> {
    let email = required(&form.email, "Email")?;
    if !is_valid_email(email) {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }

    let username = sanitize_text(&form.username);
    let username = required(&username, "Username")?.to_string();
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(
            "Username must be at least 3 characters".to_string(),
        ));
    }

    if form.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if let Some(confirm) = &form.confirm_password {
        if confirm != &form.password {
            return Err(ApiError::BadRequest("Passwords do not match".to_string()));
        }
    }

    Ok((email.to_string(), username))
}

pub fn sign_up(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let form: SignUp = match read_json(req) {
        Ok(f) => f,
        Err(e) => return Ok(e.into()),
    };
    let (email, username) = match validate_sign_up(&form) {
        Ok(v) => v,
        Err(e) => return Ok(e.into()),
    };

    match create_user(store, &email, &username, &form.password) {
        Ok(user) => success_with_status(201, serde_json::json!({ "user": user })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn get_profile(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    match get_user(store, &user_id) {
        Ok(user) => success(serde_json::json!({ "user": user })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn update_profile(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    let update: ProfileUpdate = match read_json(req) {
        Ok(u) => u,
        Err(e) => return Ok(e.into()),
    };

    match update_user_profile(store, &user_id, update) {
        Ok(user) => success(serde_json::json!({ "user": user })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn get_user_details(store: &dyn KeyValueStore, user_id: &str) -> anyhow::Result<Response> {
    if !validate_uuid(user_id) {
        return Ok(ApiError::BadRequest("User ID required".to_string()).into());
    }

    match get_user(store, user_id) {
        Ok(user) => success(serde_json::json!({ "user": user })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}
