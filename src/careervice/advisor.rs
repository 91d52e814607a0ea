//! Career advice text: a chat-completion call when a backend is configured,
//! otherwise (or whenever that call fails) a template built from the form.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{ADVICE_MAX_TOKENS, ADVICE_MODEL, ADVICE_TEMPERATURE};
use crate::models::careervice::AdviceRequest;

pub const SYSTEM_PROMPT: &str = "You are a professional career advisor with expertise in guiding students and professionals toward fulfilling career paths. Provide practical, encouraging, and actionable career advice.";

pub const NO_CONTENT: &str = "Unable to generate career suggestion at this time.";

/// Generates text for a prompt. Implementations talk to a chat-completion API.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String>;
}

pub fn level_context(level: &str) -> &'static str {
    match level {
        "10th" => "student completing 10th grade",
        "12th" => "student completing 12th grade",
        "graduate" => "college graduate",
        "postgraduate" => "post-graduate student",
        _ => "student",
    }
}

pub fn build_prompt(req: &AdviceRequest) -> String {
    let mut lines = vec![
        format!(
            "As a professional career advisor, provide personalized career guidance for a {} with the following profile:",
            level_context(&req.level)
        ),
        String::new(),
        format!("**Interests:** {}", req.interests.join(", ")),
        format!("**Strengths:** {}", req.strengths.join(", ")),
        format!("**Concerns:** {}", req.fears.join(", ")),
    ];
    if let Some(field) = non_empty(&req.field_of_study) {
        lines.push(format!("**Field of Study:** {}", field));
    }
    if let Some(job) = non_empty(&req.preferred_job_type) {
        lines.push(format!("**Preferred Job Type:** {}", job));
    }
    lines.extend(
        [
            "",
            "Please provide:",
            "1. 3-5 specific career paths that align with their interests and strengths",
            "2. How their strengths can be leveraged in these careers",
            "3. Practical advice for addressing their concerns",
            "4. Concrete next steps they can take",
            "5. Skills they should develop",
            "",
            "Format the response in a clear, encouraging, and actionable manner.",
        ]
        .map(String::from),
    );
    lines.join("\n")
}

/// Deterministic advice used when the API is unavailable.
pub fn fallback_advice(req: &AdviceRequest) -> String {
    let has = |tag: &str| req.interests.iter().any(|i| i == tag);

    let mut lines = vec![
        format!(
            "Based on your profile as a {}, here are personalized career suggestions:",
            level_context(&req.level)
        ),
        String::new(),
        "**Career Paths to Consider:**".to_string(),
    ];
    for (tag, paths) in [
        ("Technology", "Software Development, Data Science, Cybersecurity"),
        ("Healthcare", "Medicine, Nursing, Healthcare Administration"),
        ("Business", "Management, Marketing, Entrepreneurship"),
        ("Arts", "Graphic Design, Content Creation, Art Direction"),
    ] {
        if has(tag) {
            lines.push(format!("• {}", paths));
        }
    }

    lines.push(String::new());
    lines.push("**Your Strengths Align With:**".to_string());
    lines.extend(
        req.strengths
            .iter()
            .map(|s| format!("• {} roles in your field of interest", s)),
    );

    lines.push(String::new());
    lines.push("**Development Areas:**".to_string());
    lines.push(format!(
        "• Address concerns about {} through targeted skill development",
        req.fears.join(", ")
    ));
    lines.push("• Consider internships or mentorship in your areas of interest".to_string());

    lines.push(String::new());
    lines.push("**Next Steps:**".to_string());
    lines.push(format!(
        "1. Explore specific roles in {}",
        non_empty(&req.field_of_study).unwrap_or("your field of interest")
    ));
    lines.push("2. Build relevant skills through courses and projects".to_string());
    lines.push("3. Network with professionals in your target industries".to_string());
    lines.push(format!(
        "4. Consider {} opportunities",
        non_empty(&req.preferred_job_type).unwrap_or("various job types")
    ));

    lines.push(String::new());
    lines.push("**Personalized Advice:**".to_string());
    lines.push(format!(
        "Given your interests in {} and strengths in {}, focus on roles that combine these elements. Start with entry-level positions or internships to gain experience.",
        req.interests.join(", "),
        req.strengths.join(", ")
    ));

    lines.join("\n")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct Advisor {
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl Advisor {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Advisor {
            backend: Some(backend),
        }
    }

    /// No API configured: every suggestion comes from the template.
    pub fn template_only() -> Self {
        Advisor { backend: None }
    }

    /// Never fails. Missing backend, transport errors, non-success
    /// statuses and malformed replies all yield [`fallback_advice`].
    pub async fn generate(&self, req: &AdviceRequest) -> String {
        let Some(backend) = &self.backend else {
            tracing::warn!("advice API key not configured, using template response");
            return fallback_advice(req);
        };

        match backend.complete(SYSTEM_PROMPT, &build_prompt(req)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "advice API call failed, using template response");
                fallback_advice(req)
            }
        }
    }
}

// === Chat-completion wire format ===

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Serialize, Debug)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub fn new(system: &'a str, prompt: &'a str) -> Self {
        ChatRequest {
            model: ADVICE_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: ADVICE_MAX_TOKENS,
            temperature: ADVICE_TEMPERATURE,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatReply>,
}

#[derive(Deserialize, Debug)]
pub struct ChatReply {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, or [`NO_CONTENT`] when there is none.
    pub fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_CONTENT.to_string())
    }
}

// === Backends ===

#[cfg(not(target_arch = "wasm32"))]
pub use native::OpenRouterBackend;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use async_trait::async_trait;
    use secrecy::{ExposeSecret, SecretString};

    use super::{ChatRequest, ChatResponse, CompletionBackend};
    use crate::config::{ADVICE_TIMEOUT_SECS, ADVICE_TITLE};

    pub struct OpenRouterBackend {
        client: reqwest::Client,
        url: String,
        api_key: SecretString,
        origin: String,
    }

    impl OpenRouterBackend {
        pub fn new(url: String, api_key: String, origin: String) -> anyhow::Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(ADVICE_TIMEOUT_SECS))
                .build()?;
            Ok(OpenRouterBackend {
                client,
                url,
                api_key: SecretString::from(api_key),
                origin,
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for OpenRouterBackend {
        async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
            let response = self
                .client
                .post(&self.url)
                .bearer_auth(self.api_key.expose_secret())
                .header("HTTP-Referer", &self.origin)
                .header("X-Title", ADVICE_TITLE)
                .json(&ChatRequest::new(system, prompt))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                anyhow::bail!("API request failed: {}", status);
            }

            let data: ChatResponse = response.json().await?;
            Ok(data.into_text())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use spin::SpinBackend;

#[cfg(target_arch = "wasm32")]
mod spin {
    use async_trait::async_trait;
    use secrecy::{ExposeSecret, SecretString};
    use spin_sdk::http::{Method, Request, Response};

    use super::{ChatRequest, ChatResponse, CompletionBackend};
    use crate::config::ADVICE_TITLE;

    /// Outbound call through the Spin host. The URL's host must be listed in
    /// the component's `allowed_outbound_hosts`.
    pub struct SpinBackend {
        url: String,
        api_key: SecretString,
        origin: String,
    }

    impl SpinBackend {
        pub fn new(url: String, api_key: String, origin: String) -> Self {
            SpinBackend {
                url,
                api_key: SecretString::from(api_key),
                origin,
            }
        }
    }

    #[async_trait(?Send)]
    impl CompletionBackend for SpinBackend {
        async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
            let body = serde_json::to_vec(&ChatRequest::new(system, prompt))?;
            let auth = format!("Bearer {}", self.api_key.expose_secret());
            let request = Request::builder()
                .method(Method::Post)
                .uri(self.url.as_str())
                .header("Authorization", auth.as_str())
                .header("Content-Type", "application/json")
                .header("HTTP-Referer", self.origin.as_str())
                .header("X-Title", ADVICE_TITLE)
                .body(body)
                .build();

            let response: Response = spin_sdk::http::send(request)
                .await
                .map_err(|e| anyhow::anyhow!("advice request failed: {:?}", e))?;

            let status = *response.status();
            if !(200..300).contains(&status) {
                anyhow::bail!("API request failed: {}", status);
            }

            let data: ChatResponse = serde_json::from_slice(response.body())?;
            Ok(data.into_text())
        }
    }
}
