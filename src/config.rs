// === Storage keys ===
pub const USERS_KEY: &str = "users";
pub const POSTS_KEY: &str = "posts";
pub const ADMIN_KEY: &str = "admin";
pub const CAREERVICE_USERS_KEY: &str = "careervice_users";
pub const CAREERVICE_SUGGESTIONS_KEY: &str = "careervice_suggestions";

pub fn notifications_key(user_id: &str) -> String {
    format!("notifications_{}", user_id)
}

pub fn token_key(token: &str) -> String {
    format!("token:{}", token)
}

pub fn careervice_token_key(token: &str) -> String {
    format!("careervice_token:{}", token)
}

// === Limits ===
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_CAPTION_LENGTH: usize = 2200;
pub const MAX_COMMENT_LENGTH: usize = 1000;
pub const MAX_PROFILE_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_POST_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const NOTIFICATION_PREVIEW_CHARS: usize = 30;
pub const NOTIFICATION_BADGE_MAX: usize = 99;
pub const DEFAULT_AVATAR: &str = "assets/default-avatar.png";

// === Advice API ===
pub const ADVICE_MODEL: &str = "openai/gpt-3.5-turbo";
pub const ADVICE_MAX_TOKENS: u32 = 1000;
pub const ADVICE_TEMPERATURE: f32 = 0.7;
pub const ADVICE_TITLE: &str = "CareerVice AI Career Advisor";
pub const ADVICE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ADVICE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_ORIGIN: &str = "http://localhost:5173";

// === Environment ===
pub fn token_expiration_hours() -> i64 {
    std::env::var("CHATTER_TOKEN_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24)
}

pub fn bind_address() -> String {
    std::env::var("CHATTER_BIND").unwrap_or_else(|_| "0.0.0.0:9000".to_string())
}

/// Directory for the file-backed store. Unset means everything lives in memory.
pub fn data_dir() -> Option<String> {
    std::env::var("CHATTER_DATA_DIR").ok().filter(|v| !v.is_empty())
}

pub fn seed_demo_data() -> bool {
    std::env::var("CHATTER_SEED_DEMO")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn advice_api_key() -> Option<String> {
    std::env::var("OPENROUTER_API_KEY").ok().filter(|v| !v.is_empty())
}

pub fn advice_api_url() -> String {
    std::env::var("OPENROUTER_API_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_ADVICE_URL.to_string())
}

pub fn app_origin() -> String {
    std::env::var("CAREERVICE_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_string())
}
