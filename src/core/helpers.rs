use std::collections::HashSet;

use ammonia::Builder;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, SubsecRound, Utc};
use rand::rngs::OsRng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use spin_sdk::http::{Request, Response};
use uuid::Uuid;

use crate::config::NOTIFICATION_PREVIEW_CHARS;
use crate::core::errors::ApiError;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Millisecond precision, the same as stored timestamps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn validate_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Strip every HTML tag, leaving plain text with `&`, `<` and `>` as typed.
pub fn sanitize_text(text: &str) -> String {
    let cleaned = Builder::default().tags(HashSet::new()).clean(text).to_string();
    html_escape::decode_html_entities(&cleaned).into_owned()
}

/// Size in bytes of an uploaded image. Base64 data URLs are measured by
/// their decoded payload; anything else by its length.
pub fn payload_bytes(image: &str) -> usize {
    match image.split_once("base64,") {
        Some((_, data)) => {
            let data = data.trim_end();
            let padding = data.bytes().rev().take_while(|b| *b == b'=').count();
            (data.len() * 3 / 4).saturating_sub(padding)
        }
        None => image.len(),
    }
}

/// Short quote of user text for notification messages.
pub fn preview(text: &str) -> String {
    if text.chars().count() > NOTIFICATION_PREVIEW_CHARS {
        let head: String = text.chars().take(NOTIFICATION_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// "just now", "3 minutes ago", "1 year ago". Months are 30 days, years 12 months.
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let months = days / 30;
    let years = months / 12;

    fn ago(n: i64, unit: &str) -> String {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    }

    if seconds < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        ago(minutes, "minute")
    } else if hours < 24 {
        ago(hours, "hour")
    } else if days < 30 {
        ago(days, "day")
    } else if months < 12 {
        ago(months, "month")
    } else {
        ago(years, "year")
    }
}

// === HTTP plumbing ===

pub fn json_response<T: Serialize>(status: u16, body: &T) -> anyhow::Result<Response> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(body)?)
        .build())
}

/// `{"success": true, ...fields}`
pub fn success(fields: serde_json::Value) -> anyhow::Result<Response> {
    success_with_status(200, fields)
}

pub fn success_with_status(status: u16, fields: serde_json::Value) -> anyhow::Result<Response> {
    let mut body = serde_json::json!({ "success": true });
    if let (Some(target), serde_json::Value::Object(extra)) = (body.as_object_mut(), fields) {
        target.extend(extra);
    }
    json_response(status, &body)
}

/// Deserialize a JSON request body, answering 400 when it does not fit.
pub fn read_json<T: DeserializeOwned>(req: &Request) -> Result<T, ApiError> {
    serde_json::from_slice(req.body())
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

/// A required text field: trimmed, and rejected when blank.
pub fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::BadRequest(format!("{} is required", field)))
    } else {
        Ok(trimmed)
    }
}
