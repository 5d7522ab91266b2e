//! Slack Web API client.
//!
//! Two calls cover everything the bot does outbound:
//! - `auth.test` once at startup, to fail fast on a bad token
//! - `chat.postEphemeral` per advisory, via the [`AdvisorySink`] trait
//!
//! Slack reports failures inside a 200 response (`{"ok": false, "error":
//! ...}`), so both the HTTP status and the envelope are checked.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{DispatchError, Result, SlackError};
use crate::pipeline::types::{Advisory, AdvisorySink};
use crate::slack::types::{ApiResponse, AuthTestResponse};

/// Slack Web API base URL.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Web API client. Cheap to share behind an `Arc`.
pub struct SlackClient {
    bot_token: SecretString,
    base_url: String,
    client: reqwest::Client,
}

/// Workspace identity reported by `auth.test`.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub team: String,
    pub user: String,
}

impl SlackClient {
    pub fn new(bot_token: SecretString) -> Self {
        Self::with_base_url(bot_token, SLACK_API_BASE.to_string())
    }

    /// Client against a non-default API host (tests point this at a stub).
    pub fn with_base_url(bot_token: SecretString, base_url: String) -> Self {
        Self {
            bot_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Verify the bot token and report who we are. Called once at startup;
    /// a failure here is fatal to the process.
    pub async fn auth_test(&self) -> Result<BotIdentity> {
        let response = self
            .client
            .post(self.api_url("auth.test"))
            .bearer_auth(self.bot_token.expose_secret())
            .send()
            .await
            .map_err(|e| SlackError::RequestFailed {
                method: "auth.test".into(),
                reason: e.to_string(),
            })?;

        let decoded: AuthTestResponse =
            response.json().await.map_err(|e| SlackError::RequestFailed {
                method: "auth.test".into(),
                reason: e.to_string(),
            })?;

        if !decoded.ok {
            return Err(SlackError::AuthFailed {
                reason: decoded.error.unwrap_or_else(|| "unknown error".into()),
            }
            .into());
        }

        Ok(BotIdentity {
            team: decoded.team.unwrap_or_default(),
            user: decoded.user.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl AdvisorySink for SlackClient {
    async fn post_ephemeral(&self, advisory: &Advisory) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(self.api_url("chat.postEphemeral"))
            .bearer_auth(self.bot_token.expose_secret())
            .json(advisory)
            .send()
            .await
            .map_err(|e| DispatchError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DispatchError::Http(format!(
                "chat.postEphemeral returned HTTP {}",
                response.status()
            )));
        }

        let decoded: ApiResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::Http(e.to_string()))?;

        if !decoded.ok {
            return Err(DispatchError::Api {
                method: "chat.postEphemeral".into(),
                error: decoded.error.unwrap_or_else(|| "unknown error".into()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_method_names() {
        let client = SlackClient::with_base_url(
            SecretString::from("xoxb-test"),
            "http://127.0.0.1:9/".to_string(),
        );
        assert_eq!(client.api_url("auth.test"), "http://127.0.0.1:9/auth.test");
        assert_eq!(
            client.api_url("chat.postEphemeral"),
            "http://127.0.0.1:9/chat.postEphemeral"
        );
    }
}
