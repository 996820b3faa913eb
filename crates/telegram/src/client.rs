//! HTTPS client for the Bot API. One `BotApi` serves as both the update
//! transport and the reply sink.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::api::{ApiResponse, SendMessage, Update};
use crate::poller::{ReplySink, TransportError, UpdateTransport};
use crate::replies::Reply;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

pub struct BotApi {
    http: Client,
    base_url: String,
    token: SecretString,
    poll_timeout_secs: u64,
}

impl BotApi {
    pub fn new(token: SecretString, poll_timeout_secs: u64) -> Self {
        Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
            poll_timeout_secs,
        }
    }

    /// Points the client at a different API host (local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    // The token is part of the URL path; errors are stripped of their URL
    // before display so it cannot leak into logs.
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token.expose_secret())
    }
}

fn poll_error(error: reqwest::Error) -> TransportError {
    TransportError::Poll(error.without_url().to_string())
}

fn deliver_error(error: reqwest::Error) -> TransportError {
    TransportError::Deliver(error.without_url().to_string())
}

#[derive(Serialize)]
struct GetUpdates {
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
}

#[async_trait]
impl UpdateTransport for BotApi {
    async fn next_batch(
        &self,
        offset: Option<i64>,
    ) -> Result<Option<Vec<Update>>, TransportError> {
        let response = self
            .http
            .post(self.method_url("getUpdates"))
            // Leave headroom beyond the server-side long-poll window.
            .timeout(Duration::from_secs(self.poll_timeout_secs + 10))
            .json(&GetUpdates { timeout: self.poll_timeout_secs, offset })
            .send()
            .await
            .map_err(poll_error)?;

        let payload: ApiResponse<Vec<Update>> = response.json().await.map_err(poll_error)?;
        if !payload.ok {
            return Err(TransportError::Poll(
                payload.description.unwrap_or_else(|| "getUpdates rejected".to_string()),
            ));
        }

        Ok(Some(payload.result.unwrap_or_default()))
    }
}

#[async_trait]
impl ReplySink for BotApi {
    async fn deliver(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError> {
        let body = SendMessage {
            chat_id,
            text: reply.text.clone(),
            reply_markup: reply.keyboard.clone(),
        };

        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(deliver_error)?;

        let payload: ApiResponse<serde_json::Value> =
            response.json().await.map_err(deliver_error)?;
        if !payload.ok {
            return Err(TransportError::Deliver(
                payload.description.unwrap_or_else(|| "sendMessage rejected".to_string()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::BotApi;

    #[test]
    fn method_url_embeds_token_and_method() {
        let api = BotApi::new(SecretString::from("123456:abc".to_string()), 30)
            .with_base_url("http://127.0.0.1:9999");
        assert_eq!(api.method_url("getUpdates"), "http://127.0.0.1:9999/bot123456:abc/getUpdates");
    }
}
