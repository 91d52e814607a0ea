//! CareerVice: accounts with an editable profile, and career suggestions
//! generated from a short questionnaire.

pub mod accounts;
pub mod advisor;
pub mod suggestions;

pub use advisor::{Advisor, CompletionBackend};
