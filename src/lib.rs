//! Chatter, a small photo-sharing network, and CareerVice, a career-advice
//! app, served from one HTTP surface over a key-value store.
//!
//! The same [`route`] function backs the Spin component (wasm32) and the
//! native actix-web host in `src/bin/main.rs`.

use std::sync::Arc;

use spin_sdk::http::{Request, Response};

pub mod auth;
pub mod backend;
pub mod careervice;
pub mod comments;
pub mod config;
pub mod core;
pub mod feed;
pub mod follow;
pub mod models;
pub mod notifications;
pub mod posts;
pub mod users;

use crate::careervice::{accounts, suggestions, Advisor};
use crate::core::errors::ApiError;
use crate::core::query_params::path_of;
use crate::core::store::KeyValueStore;

/// What every request needs: the store and the advice generator.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub advisor: Advisor,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, advisor: Advisor) -> Self {
        AppState { store, advisor }
    }

    /// Advisor configured from the environment; template-only without an API key.
    pub fn from_env(store: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        Ok(AppState::new(store, advisor_from_env()?))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn advisor_from_env() -> anyhow::Result<Advisor> {
    use crate::careervice::advisor::OpenRouterBackend;

    Ok(match config::advice_api_key() {
        Some(key) => Advisor::new(Arc::new(OpenRouterBackend::new(
            config::advice_api_url(),
            key,
            config::app_origin(),
        )?)),
        None => Advisor::template_only(),
    })
}

#[cfg(target_arch = "wasm32")]
fn advisor_from_env() -> anyhow::Result<Advisor> {
    use crate::careervice::advisor::SpinBackend;

    Ok(match config::advice_api_key() {
        Some(key) => Advisor::new(Arc::new(SpinBackend::new(
            config::advice_api_url(),
            key,
            config::app_origin(),
        ))),
        None => Advisor::template_only(),
    })
}

pub async fn route(state: &AppState, req: Request) -> anyhow::Result<Response> {
    let store = state.store.as_ref();
    let method = req.method().to_string();
    let uri = req.uri();
    let segments: Vec<&str> = path_of(&uri)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    tracing::debug!(%method, path = %path_of(&uri), "request");

    match (method.as_str(), segments.as_slice()) {
        // Stub service
        ("GET", []) => backend::index(),
        ("POST", ["signin"]) => backend::sign_in(store, &req),
        ("POST", ["signup"]) => backend::sign_up(store, &req),

        // Accounts
        ("POST", ["users"]) => users::sign_up(store, &req),
        ("POST", ["login"]) => auth::login_user(store, &req),
        ("POST", ["logout"]) => auth::logout_user(store, &req),
        ("GET", ["profile"]) => users::get_profile(store, &req),
        ("PUT", ["profile"]) => users::update_profile(store, &req),
        ("GET", ["users", id]) => users::get_user_details(store, id),
        ("GET", ["users", id, "followers"]) => follow::get_followers_list(store, &req, id),
        ("GET", ["users", id, "following"]) => follow::get_following_list(store, &req, id),
        ("POST", ["users", id, "follow"]) => follow::handle_follow(store, &req, id),

        // Posts
        ("GET", ["feed"]) => feed::get_feed(store, &req),
        ("GET", ["posts"]) => posts::list_posts(store, &req),
        ("POST", ["posts"]) => posts::handle_create_post(store, &req),
        ("PUT", ["posts", id]) => posts::edit_post(store, &req, id),
        ("DELETE", ["posts", id]) => posts::remove_post(store, &req, id),
        ("POST", ["posts", id, "like"]) => posts::like_post(store, &req, id),

        // Comments
        ("GET", ["posts", id, "comments"]) => feed::get_comments(store, &req, id),
        ("POST", ["posts", id, "comments"]) => comments::post_comment(store, &req, id),
        ("PUT", ["posts", id, "comments", cid]) => comments::edit_comment(store, &req, id, cid),
        ("DELETE", ["posts", id, "comments", cid]) => comments::remove_comment(store, &req, id, cid),
        ("POST", ["posts", id, "comments", cid, "replies"]) => comments::post_reply(store, &req, id, cid),

        // Notifications
        ("GET", ["notifications"]) => feed::get_notifications(store, &req),
        ("DELETE", ["notifications"]) => notifications::clear_all(store, &req),
        ("GET", ["notifications", "count"]) => notifications::get_unread_count(store, &req),
        ("POST", ["notifications", "read"]) => notifications::read_all(store, &req),
        ("POST", ["notifications", id, "read"]) => notifications::read_one(store, &req, id),
        ("DELETE", ["notifications", id]) => notifications::delete_one(store, &req, id),

        // CareerVice
        ("POST", ["careervice", "signup"]) => accounts::handle_signup(store, &req),
        ("POST", ["careervice", "login"]) => accounts::handle_login(store, &req),
        ("POST", ["careervice", "logout"]) => accounts::handle_logout(store, &req),
        ("GET", ["careervice", "profile"]) => accounts::get_profile(store, &req),
        ("PUT", ["careervice", "profile"]) => accounts::put_profile(store, &req),
        ("GET", ["careervice", "suggestions"]) => suggestions::list_suggestions(store, &req),
        ("POST", ["careervice", "suggestions"]) => {
            suggestions::create_suggestion(store, &state.advisor, &req).await
        }
        ("GET", ["careervice", "suggestions", "latest"]) => suggestions::latest_suggestion(store, &req),

        _ => Ok(ApiError::NotFound("No route found".to_string()).into()),
    }
}

#[cfg(target_arch = "wasm32")]
mod component {
    use std::sync::Arc;

    use spin_sdk::http::{IntoResponse, Request, Response};
    use spin_sdk::http_component;

    use crate::core::db::initialize_collections;
    use crate::core::errors::ApiError;
    use crate::core::store::SpinStore;
    use crate::{route, AppState};

    #[http_component]
    async fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
        let store = Arc::new(SpinStore::open_default()?);
        initialize_collections(store.as_ref())?;
        let state = AppState::from_env(store)?;

        match route(&state, req).await {
            Ok(resp) => Ok(resp),
            Err(e) => {
                tracing::error!(error = %e, "request failed");
                Ok(Response::from(ApiError::InternalError("Internal server error".to_string())))
            }
        }
    }
}
