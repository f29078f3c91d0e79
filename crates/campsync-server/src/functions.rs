//! Client for the hosted collaborator functions: payout clawback settlement
//! and creator direct messages.

use std::time::Duration;

use campsync_core::AppConfig;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum FunctionsError {
    #[error("HTTP error calling {function}: {source}")]
    Http {
        function: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{function} returned status {status}: {body}")]
    Status {
        function: &'static str,
        status: u16,
        body: String,
    },
}

#[derive(Serialize)]
struct ClawbackRequest<'a> {
    payout_item_id: Uuid,
    reason: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DirectMessageRequest<'a> {
    user_id: Uuid,
    message: DirectMessageBody<'a>,
}

#[derive(Serialize)]
struct DirectMessageBody<'a> {
    content: &'a str,
}

#[derive(Debug, Clone)]
pub struct FunctionsClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl FunctionsClient {
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, service_key: &str, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    /// Builds a client when both the base URL and service key are configured.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Option<Self>, reqwest::Error> {
        match (&config.functions_base_url, &config.functions_service_key) {
            (Some(base_url), Some(key)) => {
                Self::new(base_url, key, &config.user_agent).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Ask the settlement function to reverse a payout item.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionsError`] on transport failure or a non-success status.
    pub async fn execute_clawback(
        &self,
        payout_item_id: Uuid,
        reason: &str,
    ) -> Result<(), FunctionsError> {
        self.invoke(
            "execute-clawback",
            &ClawbackRequest {
                payout_item_id,
                reason,
            },
        )
        .await
    }

    /// Send a direct message to a creator.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionsError`] on transport failure or a non-success status.
    pub async fn send_direct_message(
        &self,
        user_id: Uuid,
        content: &str,
    ) -> Result<(), FunctionsError> {
        self.invoke(
            "send-discord-dm",
            &DirectMessageRequest {
                user_id,
                message: DirectMessageBody { content },
            },
        )
        .await
    }

    async fn invoke<B: Serialize>(
        &self,
        function: &'static str,
        body: &B,
    ) -> Result<(), FunctionsError> {
        let url = format!("{}/{function}", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .json(body)
            .send()
            .await
            .map_err(|source| FunctionsError::Http { function, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(FunctionsError::Status {
            function,
            status: status.as_u16(),
            body,
        })
    }
}
