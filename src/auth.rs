use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::config::{careervice_token_key, token_expiration_hours, token_key};
use crate::core::errors::ApiError;
use crate::core::helpers::{new_id, now_iso, read_json, success};
use crate::core::store::{JsonStore, KeyValueStore};
use crate::models::models::{PublicUser, TokenData};
use crate::users::{authenticate_user, get_user};

/// The two apps keep separate sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Realm {
    Chatter,
    Careervice,
}

impl Realm {
    fn key(self, token: &str) -> String {
        match self {
            Realm::Chatter => token_key(token),
            Realm::Careervice => careervice_token_key(token),
        }
    }
}

pub fn issue_token(store: &dyn KeyValueStore, realm: Realm, user_id: &str) -> anyhow::Result<String> {
    let token = new_id();
    let data = TokenData {
        user_id: user_id.to_string(),
        created_at: now_iso(),
    };
    store.set_json(&realm.key(&token), &data)?;
    Ok(token)
}

pub fn revoke_token(store: &dyn KeyValueStore, realm: Realm, token: &str) -> anyhow::Result<()> {
    store.delete(&realm.key(token))
}

pub fn bearer_token(req: &Request) -> Option<&str> {
    req.header("Authorization")?
        .as_str()?
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
}

/// User id behind a token, or `None` when unknown or expired.
pub fn token_owner(store: &dyn KeyValueStore, realm: Realm, token: &str) -> Option<String> {
    let data = store.get_json::<TokenData>(&realm.key(token)).ok()??;
    if let Ok(created) = chrono::DateTime::parse_from_rfc3339(&data.created_at) {
        let age_hours = (chrono::Utc::now() - created.with_timezone(&chrono::Utc)).num_hours();
        if age_hours > token_expiration_hours() {
            tracing::debug!(user_id = %data.user_id, "expired token presented");
            return None;
        }
    }
    Some(data.user_id)
}

/// Signed-in Chatter user for a request. Tokens of deleted users are refused.
pub fn validate_token(store: &dyn KeyValueStore, req: &Request) -> Option<String> {
    let token = bearer_token(req)?;
    let user_id = token_owner(store, Realm::Chatter, token)?;
    match get_user(store, &user_id) {
        Ok(_) => Some(user_id),
        Err(_) => None,
    }
}

// === HTTP Handlers ===

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub fn login_user(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let creds: Credentials = match read_json(req) {
        Ok(c) => c,
        Err(e) => return Ok(e.into()),
    };

    let user: PublicUser = match authenticate_user(store, creds.email.trim(), &creds.password) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(email = %creds.email, "failed sign-in");
            return Ok(ApiError::from(e).into());
        }
    };

    let token = issue_token(store, Realm::Chatter, &user.id)?;
    success(serde_json::json!({ "token": token, "user": user }))
}

pub fn logout_user(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let Some(token) = bearer_token(req) else {
        return Ok(ApiError::Unauthorized.into());
    };

    revoke_token(store, Realm::Chatter, token)?;
    success(serde_json::json!({ "message": "Logged out successfully" }))
}
