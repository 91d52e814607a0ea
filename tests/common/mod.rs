#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use spin_sdk::http::{Method, Request};

use chatter::careervice::{Advisor, CompletionBackend};
use chatter::core::db::initialize_collections;
use chatter::core::store::MemoryStore;
use chatter::{route, AppState};

pub fn app() -> AppState {
    app_with(Advisor::template_only())
}

pub fn app_with(advisor: Advisor) -> AppState {
    let store = Arc::new(MemoryStore::new());
    initialize_collections(store.as_ref()).unwrap();
    AppState::new(store, advisor)
}

/// Answers every prompt with the same text, or fails when `reply` is `None`.
pub struct FakeBackend {
    pub reply: Option<String>,
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn complete(&self, _system: &str, _prompt: &str) -> anyhow::Result<String> {
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => anyhow::bail!("backend unavailable"),
        }
    }
}

pub fn fake_advisor(reply: Option<&str>) -> Advisor {
    Advisor::new(Arc::new(FakeBackend {
        reply: reply.map(str::to_string),
    }))
}

pub async fn call(app: &AppState, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (u16, Value) {
    let body = body.map(|b| serde_json::to_vec(&b).unwrap()).unwrap_or_default();
    let mut builder = Request::builder();
    builder.method(method).uri(uri).header("Content-Type", "application/json");
    let auth = token.map(|t| format!("Bearer {}", t));
    if let Some(auth) = &auth {
        builder.header("Authorization", auth.as_str());
    }
    let req = builder.body(body).build();

    let resp = route(app, req).await.expect("route failed");
    let status = *resp.status();
    let json = serde_json::from_slice(resp.body()).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get(app: &AppState, uri: &str, token: Option<&str>) -> (u16, Value) {
    call(app, Method::Get, uri, token, None).await
}

pub async fn post(app: &AppState, uri: &str, token: Option<&str>, body: Value) -> (u16, Value) {
    call(app, Method::Post, uri, token, Some(body)).await
}

/// Sign up and log in; returns `(user_id, token)`.
pub async fn register(app: &AppState, username: &str) -> (String, String) {
    let email = format!("{}@example.com", username);
    let (status, body) = post(
        app,
        "/users",
        None,
        json!({ "email": email, "username": username, "password": "secret1", "confirmPassword": "secret1" }),
    )
    .await;
    assert_eq!(status, 201, "sign-up failed: {:?}", body);
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = post(app, "/login", None, json!({ "email": email, "password": "secret1" })).await;
    assert_eq!(status, 200, "login failed: {:?}", body);
    (user_id, body["token"].as_str().unwrap().to_string())
}

pub async fn create_post(app: &AppState, token: &str, caption: &str) -> String {
    let (status, body) = post(
        app,
        "/posts",
        Some(token),
        json!({ "image": "data:image/png;base64,AAAA", "caption": caption }),
    )
    .await;
    assert_eq!(status, 201, "post failed: {:?}", body);
    body["post"]["id"].as_str().unwrap().to_string()
}
