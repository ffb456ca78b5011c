//! Bearer tokens for the Sheets API.
//!
//! Either a token supplied as-is (`GOOGLE_ACCESS_TOKEN`) or one minted from an
//! OAuth refresh token. Minted tokens are reused until shortly before they
//! expire. Credentials are checked on every acquisition, so a client built
//! without them still constructs and only fails when it is used.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::infra::config::GoogleConfig;
use crate::usecase::ports::error::PortError;

const EXPIRY_MARGIN_SECS: i64 = 60;
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Clone, PartialEq, Eq)]
pub enum GoogleCredentials {
    AccessToken(String),
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoogleCredentials::AccessToken(_) => write!(f, "AccessToken(..)"),
            GoogleCredentials::RefreshToken { client_id, .. } => {
                write!(f, "RefreshToken {{ client_id: {client_id:?}, .. }}")
            }
        }
    }
}

impl GoogleCredentials {
    /// A refresh-token triple wins over a bare access token.
    pub fn from_config(config: &GoogleConfig) -> Option<Self> {
        if let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            config.client_id.clone(),
            config.client_secret.clone(),
            config.refresh_token.clone(),
        ) {
            return Some(GoogleCredentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            });
        }
        config
            .access_token
            .clone()
            .map(GoogleCredentials::AccessToken)
    }
}

pub fn missing_credentials() -> PortError {
    PortError::ConfigurationMissing(
        "Google credentials are not set: provide GOOGLE_ACCESS_TOKEN, or \
         GOOGLE_OAUTH_CLIENT_ID, GOOGLE_OAUTH_CLIENT_SECRET and GOOGLE_OAUTH_REFRESH_TOKEN"
            .to_string(),
    )
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

pub struct TokenProvider {
    http: reqwest::blocking::Client,
    token_url: String,
    credentials: Option<GoogleCredentials>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(
        http: reqwest::blocking::Client,
        token_url: impl Into<String>,
        credentials: Option<GoogleCredentials>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            credentials,
            cached: Mutex::new(None),
        }
    }

    pub fn access_token(&self) -> Result<String, PortError> {
        let credentials = self.credentials.as_ref().ok_or_else(missing_credentials)?;
        match credentials {
            GoogleCredentials::AccessToken(token) => Ok(token.clone()),
            GoogleCredentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => {
                let mut cached = self
                    .cached
                    .lock()
                    .map_err(|_| PortError::External("token cache lock poisoned".to_string()))?;
                if let Some(token) = cached.as_ref() {
                    if token.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now() {
                        return Ok(token.token.clone());
                    }
                }
                let fresh = self.refresh(client_id, client_secret, refresh_token)?;
                let token = fresh.token.clone();
                *cached = Some(fresh);
                Ok(token)
            }
        }
    }

    fn refresh(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<CachedToken, PortError> {
        log::debug!("refreshing google access token");
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
            ])
            .send()
            .map_err(|err| PortError::External(format!("token refresh request failed: {err}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
            let msg = body["error_description"]
                .as_str()
                .or_else(|| body["error"].as_str())
                .unwrap_or("unknown error");
            log::warn!("google token refresh failed with status {}", status.as_u16());
            return Err(PortError::External(format!(
                "token refresh failed ({}): {msg}",
                status.as_u16()
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .map_err(|err| PortError::Parse(format!("token refresh response: {err}")))?;
        let token = body["access_token"]
            .as_str()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| PortError::Parse("token refresh response missing access_token".into()))?;
        let expires_in = body["expires_in"].as_i64().unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Ok(CachedToken {
            token: token.to_string(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn refresh_credentials() -> GoogleCredentials {
        GoogleCredentials::RefreshToken {
            client_id: "cid".into(),
            client_secret: "csec".into(),
            refresh_token: "rtok".into(),
        }
    }

    #[test]
    fn missing_credentials_is_configuration_error() {
        let provider = TokenProvider::new(reqwest::blocking::Client::new(), "http://unused", None);

        let err = provider.access_token().expect_err("should fail without credentials");

        assert!(err.is_fatal());
    }

    #[test]
    fn from_config_prefers_refresh_triple() {
        let config = GoogleConfig {
            access_token: Some("static".into()),
            client_id: Some("cid".into()),
            client_secret: Some("csec".into()),
            refresh_token: Some("rtok".into()),
            ..GoogleConfig::default()
        };

        assert_eq!(GoogleCredentials::from_config(&config), Some(refresh_credentials()));

        let partial = GoogleConfig {
            access_token: Some("static".into()),
            client_id: Some("cid".into()),
            ..GoogleConfig::default()
        };
        assert_eq!(
            GoogleCredentials::from_config(&partial),
            Some(GoogleCredentials::AccessToken("static".into()))
        );
        assert_eq!(GoogleCredentials::from_config(&GoogleConfig::default()), None);
    }

    #[test]
    fn refreshed_token_is_reused_until_expiry() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(200).json_body(serde_json::json!({
                "access_token": "minted",
                "expires_in": 3600,
                "token_type": "Bearer"
            }));
        });
        let provider = TokenProvider::new(
            reqwest::blocking::Client::new(),
            server.url("/token"),
            Some(refresh_credentials()),
        );

        assert_eq!(provider.access_token().expect("first token"), "minted");
        assert_eq!(provider.access_token().expect("cached token"), "minted");

        token_mock.assert_calls(1);
    }

    #[test]
    fn refresh_failure_reports_error_description() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(400).json_body(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            }));
        });
        let provider = TokenProvider::new(
            reqwest::blocking::Client::new(),
            server.url("/token"),
            Some(refresh_credentials()),
        );

        let err = provider.access_token().expect_err("refresh should fail");

        assert!(!err.is_fatal());
        assert!(err.to_string().contains("expired or revoked"));
    }
}
