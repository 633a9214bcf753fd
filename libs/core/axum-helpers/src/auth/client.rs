use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use super::OAuthConfig;

/// Token record returned by the provider's `GET /oauth/access_token/{token}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    #[serde(alias = "access_token")]
    pub id: String,
    pub user_id: i64,
    pub client_id: i64,
    #[serde(default)]
    pub expires: i64,
}

#[derive(Debug, Error)]
pub enum OAuthError {
    /// The provider does not know this token (or refuses it)
    #[error("access token rejected by provider")]
    Rejected,

    #[error("oauth provider answered {0}")]
    Status(StatusCode),

    #[error("oauth provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for the external token service.
#[derive(Clone, Debug)]
pub struct OAuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl OAuthClient {
    pub fn new(config: &OAuthConfig) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Resolve `token` to the caller it was issued to.
    #[instrument(skip(self, token))]
    pub async fn lookup(&self, token: &str) -> Result<AccessToken, OAuthError> {
        let url = format!(
            "{}/oauth/access_token/{}",
            self.base_url,
            urlencoding::encode(token)
        );
        let response = self.http.get(url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<AccessToken>().await?),
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED => {
                debug!("Access token rejected by provider");
                Err(OAuthError::Rejected)
            }
            status => Err(OAuthError::Status(status)),
        }
    }
}
