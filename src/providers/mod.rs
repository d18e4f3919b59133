//! Upstream chat service integration

mod blackbox;

use thiserror::Error;

pub use blackbox::BlackboxClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
