use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::auth::{bearer_token, issue_token, revoke_token, token_owner, Realm};
use crate::config::{CAREERVICE_USERS_KEY, MIN_PASSWORD_LENGTH};
use crate::core::errors::{ApiError, ChatterError, Result};
use crate::core::helpers::{
    hash_password, new_id, read_json, required, sanitize_text, success, success_with_status, verify_password,
};
use crate::core::store::{JsonStore, KeyValueStore};
use crate::models::careervice::{CareerProfile, CareerUser, PublicCareerUser};
use crate::users::is_valid_email;

pub fn get_accounts(store: &dyn KeyValueStore) -> anyhow::Result<Vec<CareerUser>> {
    Ok(store.get_json(CAREERVICE_USERS_KEY)?.unwrap_or_default())
}

fn save_accounts(store: &dyn KeyValueStore, accounts: &[CareerUser]) -> anyhow::Result<()> {
    store.set_json(CAREERVICE_USERS_KEY, accounts)
}

pub fn get_account(store: &dyn KeyValueStore, user_id: &str) -> Result<PublicCareerUser> {
    get_accounts(store)?
        .iter()
        .find(|u| u.id == user_id)
        .map(PublicCareerUser::from)
        .ok_or(ChatterError::UserNotFound)
}

pub fn signup(store: &dyn KeyValueStore, email: &str, password: &str, full_name: &str) -> Result<PublicCareerUser> {
    let mut accounts = get_accounts(store)?;
    if accounts.iter().any(|u| u.email == email) {
        return Err(ChatterError::EmailTaken);
    }

    let user = CareerUser {
        id: new_id(),
        email: email.to_string(),
        password: hash_password(password)?,
        full_name: full_name.to_string(),
        profile: CareerProfile::default(),
    };
    accounts.push(user.clone());
    save_accounts(store, &accounts)?;

    tracing::info!(user_id = %user.id, "careervice account created");
    Ok(PublicCareerUser::from(&user))
}

pub fn login(store: &dyn KeyValueStore, email: &str, password: &str) -> Result<PublicCareerUser> {
    let accounts = get_accounts(store)?;
    match accounts.iter().find(|u| u.email == email) {
        Some(user) if verify_password(password, &user.password) => Ok(PublicCareerUser::from(user)),
        _ => Err(ChatterError::InvalidCredentials),
    }
}

pub fn logout(store: &dyn KeyValueStore, token: &str) -> anyhow::Result<()> {
    revoke_token(store, Realm::Careervice, token)
}

/// Overlay the given profile fields; fields left out keep their values.
pub fn update_profile(store: &dyn KeyValueStore, user_id: &str, changes: CareerProfile) -> Result<PublicCareerUser> {
    let mut accounts = get_accounts(store)?;
    let user = accounts
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or(ChatterError::UserNotFound)?;

    user.profile.merge(changes);
    let updated = PublicCareerUser::from(&*user);
    save_accounts(store, &accounts)?;
    Ok(updated)
}

/// Signed-in CareerVice account for a request.
pub fn current_account(store: &dyn KeyValueStore, req: &Request) -> Option<String> {
    let token = bearer_token(req)?;
    let user_id = token_owner(store, Realm::Careervice, token)?;
    get_account(store, &user_id).ok().map(|u| u.id)
}

// === HTTP Handlers ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUp {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    full_name: String,
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub fn handle_signup(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let body: SignUp = match read_json(req) {
        Ok(b) => b,
        Err(e) => return Ok(e.into()),
    };

    let full_name = sanitize_text(&body.full_name);
    let full_name = match required(&full_name, "Full name") {
        Ok(n) => n.to_string(),
        Err(e) => return Ok(e.into()),
    };
    let email = body.email.trim();
    if !is_valid_email(email) {
        return Ok(ApiError::BadRequest("Invalid email format".to_string()).into());
    }
    if body.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Ok(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))
        .into());
    }

    let user = match signup(store, email, &body.password, &full_name) {
        Ok(u) => u,
        Err(e) => return Ok(ApiError::from(e).into()),
    };
    let token = issue_token(store, Realm::Careervice, &user.id)?;
    success_with_status(201, serde_json::json!({ "token": token, "user": user }))
}

pub fn handle_login(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let creds: Credentials = match read_json(req) {
        Ok(c) => c,
        Err(e) => return Ok(e.into()),
    };

    let user = match login(store, creds.email.trim(), &creds.password) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(email = %creds.email, "failed careervice sign-in");
            return Ok(ApiError::from(e).into());
        }
    };
    let token = issue_token(store, Realm::Careervice, &user.id)?;
    success(serde_json::json!({ "token": token, "user": user }))
}

pub fn handle_logout(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let Some(token) = bearer_token(req) else {
        return Ok(ApiError::Unauthorized.into());
    };

    logout(store, token)?;
    success(serde_json::json!({ "message": "Logged out successfully" }))
}

pub fn get_profile(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let Some(user_id) = current_account(store, req) else {
        return Ok(ApiError::Unauthorized.into());
    };

    match get_account(store, &user_id) {
        Ok(user) => success(serde_json::json!({ "user": user })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

pub fn put_profile(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let Some(user_id) = current_account(store, req) else {
        return Ok(ApiError::Unauthorized.into());
    };
    let changes: CareerProfile = match read_json(req) {
        Ok(c) => c,
        Err(e) => return Ok(e.into()),
    };

    match update_profile(store, &user_id, changes) {
        Ok(user) => success(serde_json::json!({ "user": user })),
        Err(e) => Ok(ApiError::from(e).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    #[test]
    fn duplicate_email_is_refused() {
        let store = MemoryStore::new();
        signup(&store, "ana@example.com", "secret1", "Ana Pop").unwrap();
        let err = signup(&store, "ana@example.com", "other12", "Someone Else").unwrap_err();
        assert!(matches!(err, ChatterError::EmailTaken));
        assert_eq!(get_accounts(&store).unwrap().len(), 1);
    }

    #[test]
    fn login_checks_the_password() {
        let store = MemoryStore::new();
        signup(&store, "ana@example.com", "secret1", "Ana Pop").unwrap();
        assert!(login(&store, "ana@example.com", "secret1").is_ok());
        assert!(matches!(
            login(&store, "ana@example.com", "wrong").unwrap_err(),
            ChatterError::InvalidCredentials
        ));
    }

    #[test]
    fn profile_updates_merge() {
        let store = MemoryStore::new();
        let user = signup(&store, "ana@example.com", "secret1", "Ana Pop").unwrap();

        update_profile(
            &store,
            &user.id,
            CareerProfile {
                gender: Some("female".to_string()),
                country: Some("Romania".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let updated = update_profile(
            &store,
            &user.id,
            CareerProfile {
                country: Some("Moldova".to_string()),
                gender: Some(" ".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.profile.gender, None);
        assert_eq!(updated.profile.country.as_deref(), Some("Moldova"));

        let untouched = update_profile(&store, &user.id, CareerProfile::default()).unwrap();
        assert_eq!(untouched.profile.country.as_deref(), Some("Moldova"));
    }
}
