//! Blackbox.ai chat endpoint
//!
//! The endpoint accepts the whole accumulated history on every call and
//! answers with the assistant reply as the response body. No authentication
//! headers are sent.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::conversation::Message;

use super::ProviderError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlackboxRequest<'a> {
    messages: &'a [Message],
    id: &'a str,
    user_selected_model: &'a str,
}

pub struct BlackboxClient {
    client: Client,
    url: String,
}

impl BlackboxClient {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post the history and return the assistant reply text
    pub async fn chat(
        &self,
        conversation_id: &str,
        messages: &[Message],
        model: &str,
    ) -> Result<String, ProviderError> {
        let request = BlackboxRequest {
            messages,
            id: conversation_id,
            user_selected_model: model,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let body = response.text().await?;
        parse_reply(&body)
    }
}

/// Accept any non-blank body as the reply. A JSON string literal is unwrapped,
/// and a JSON object carrying an `error` field is rejected.
fn parse_reply(body: &str) -> Result<String, ProviderError> {
    if body.trim().is_empty() {
        return Err(ProviderError::MalformedResponse("empty body".into()));
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(text)) if !text.trim().is_empty() => Ok(text),
        Ok(Value::String(_)) => Err(ProviderError::MalformedResponse("empty reply".into())),
        Ok(Value::Object(map)) if map.contains_key("error") => Err(
            ProviderError::MalformedResponse(format!("upstream error body: {}", map["error"])),
        ),
        _ => Ok(body.to_string()),
    }
}
