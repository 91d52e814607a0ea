use spin_sdk::http::{Request, Response};

use crate::careervice::accounts::current_account;
use crate::careervice::advisor::Advisor;
use crate::config::CAREERVICE_SUGGESTIONS_KEY;
use crate::core::errors::ApiError;
use crate::core::helpers::{new_id, now_iso, read_json, success, success_with_status};
use crate::core::store::{JsonStore, KeyValueStore};
use crate::models::careervice::{AdviceRequest, CareerSuggestion};

/// A generated answer together with the questionnaire it answers.
#[derive(Debug, Clone)]
pub struct NewSuggestion {
    pub request: AdviceRequest,
    pub ai_response: String,
}

fn all_suggestions(store: &dyn KeyValueStore) -> anyhow::Result<Vec<CareerSuggestion>> {
    Ok(store.get_json(CAREERVICE_SUGGESTIONS_KEY)?.unwrap_or_default())
}

/// Stored newest first across all accounts.
pub fn add_suggestion(store: &dyn KeyValueStore, user_id: &str, new: NewSuggestion) -> anyhow::Result<CareerSuggestion> {
    let mut suggestions = all_suggestions(store)?;

    let NewSuggestion { request, ai_response } = new;
    let suggestion = CareerSuggestion {
        id: new_id(),
        user_id: user_id.to_string(),
        level: request.level,
        interests: request.interests,
        strengths: request.strengths,
        fears: request.fears,
        field_of_study: request.field_of_study.filter(|f| !f.trim().is_empty()),
        preferred_job_type: request.preferred_job_type.filter(|j| !j.trim().is_empty()),
        ai_response,
        created_at: now_iso(),
    };

    suggestions.insert(0, suggestion.clone());
    store.set_json(CAREERVICE_SUGGESTIONS_KEY, &suggestions)?;
    Ok(suggestion)
}

pub fn get_suggestions(store: &dyn KeyValueStore, user_id: &str) -> anyhow::Result<Vec<CareerSuggestion>> {
    let mut suggestions = all_suggestions(store)?;
    suggestions.retain(|s| s.user_id == user_id);
    Ok(suggestions)
}

pub fn get_last_suggestion(store: &dyn KeyValueStore, user_id: &str) -> anyhow::Result<Option<CareerSuggestion>> {
    Ok(get_suggestions(store, user_id)?.into_iter().next())
}

fn validate(request: &AdviceRequest) -> Result<(), ApiError> {
    if request.level.trim().is_empty() {
        return Err(ApiError::BadRequest("Please select your education level".to_string()));
    }
    if request.interests.is_empty() {
        return Err(ApiError::BadRequest("Please select at least one interest".to_string()));
    }
    if request.strengths.is_empty() {
        return Err(ApiError::BadRequest("Please select at least one strength".to_string()));
    }
    Ok(())
}

// === HTTP Handlers ===

pub async fn create_suggestion(store: &dyn KeyValueStore, advisor: &Advisor, req: &Request) -> anyhow::Result<Response> {
    let Some(user_id) = current_account(store, req) else {
        return Ok(ApiError::Unauthorized.into());
    };
    let request: AdviceRequest = match read_json(req) {
        Ok(r) => r,
        Err(e) => return Ok(e.into()),
    };
    if let Err(e) = validate(&request) {
        return Ok(e.into());
    }

    let ai_response = advisor.generate(&request).await;
    let suggestion = add_suggestion(store, &user_id, NewSuggestion { request, ai_response })?;

    tracing::info!(user_id = %user_id, suggestion_id = %suggestion.id, "career suggestion stored");
    success_with_status(201, serde_json::json!({ "suggestion": suggestion }))
}

pub fn list_suggestions(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let Some(user_id) = current_account(store, req) else {
        return Ok(ApiError::Unauthorized.into());
    };

    let suggestions = get_suggestions(store, &user_id)?;
    success(serde_json::json!({ "suggestions": suggestions }))
}

pub fn latest_suggestion(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let Some(user_id) = current_account(store, req) else {
        return Ok(ApiError::Unauthorized.into());
    };

    match get_last_suggestion(store, &user_id)? {
        Some(suggestion) => success(serde_json::json!({ "suggestion": suggestion })),
        None => Ok(ApiError::NotFound("No suggestions yet".to_string()).into()),
    }
}
