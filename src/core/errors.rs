use http::StatusCode;
use spin_sdk::http::Response;
use thiserror::Error;

/// Expected failures of the storage helpers. The messages are shown to
/// users as-is.
#[derive(Debug, Error)]
pub enum ChatterError {
    #[error("Email already in use")]
    EmailTaken,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("Post not found")]
    PostNotFound,
    #[error("Comment not found")]
    CommentNotFound,
    #[error("Notification not found")]
    NotificationNotFound,
    #[error("Not authorized to {0}")]
    NotAuthorized(&'static str),
    #[error("You cannot follow yourself")]
    SelfFollow,
    #[error("Profile image must be less than 2MB")]
    ProfileImageTooLarge,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChatterError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Unauthorized: {0}")]
    Unauthenticated(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::BadRequest(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalError(msg) => msg,
        }
    }
}

impl From<ChatterError> for ApiError {
    fn from(err: ChatterError) -> Self {
        let msg = err.to_string();
        match err {
            ChatterError::EmailTaken | ChatterError::UsernameTaken => ApiError::Conflict(msg),
            ChatterError::InvalidCredentials => ApiError::Unauthenticated(msg),
            ChatterError::UserNotFound
            | ChatterError::PostNotFound
            | ChatterError::CommentNotFound
            | ChatterError::NotificationNotFound => ApiError::NotFound(msg),
            ChatterError::NotAuthorized(_) => ApiError::Forbidden(msg),
            ChatterError::SelfFollow | ChatterError::ProfileImageTooLarge => {
                ApiError::BadRequest(msg)
            }
            ChatterError::Store(e) => {
                tracing::error!(error = %e, "storage failure");
                ApiError::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        let body = serde_json::json!({
            "success": false,
            "message": err.message(),
        });
        Response::builder()
            .status(err.status().as_u16())
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&body).unwrap_or_default())
            .build()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
