//! Google OAuth token lifecycle: consent URL, code exchange, persistence and
//! refresh of the single stored credential set.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bizagent_core::models::oauth::OAuthToken;
use bizagent_db::store::OAuthTokenRepository;
use chrono::{Duration as ChronoDuration, Utc};
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::GoogleOAuthConfig;

pub const GOOGLE_PROVIDER: &str = "google";

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Refresh this long before the stored expiry.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Anything that can hand out a currently valid bearer token.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Token endpoint response for both the code and refresh grants.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant>;
    /// True when the provider still accepts `access_token`.
    async fn verify(&self, access_token: &str) -> Result<bool>;
}

pub struct GoogleTokenEndpoint {
    client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleTokenEndpoint {
    pub fn new(config: GoogleOAuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .wrap_err("Failed to build OAuth HTTP client")?;
        Ok(Self { client, config })
    }

    async fn grant(&self, form: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(form)
            .send()
            .await
            .wrap_err("Token endpoint request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!(
                "Token endpoint returned {}: {}",
                status,
                body
            ));
        }

        response
            .json()
            .await
            .wrap_err("Invalid token endpoint response")
    }
}

#[async_trait]
impl TokenEndpoint for GoogleTokenEndpoint {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        self.grant(&[
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", &self.config.redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.grant(&[
            ("refresh_token", refresh_token),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn verify(&self, access_token: &str) -> Result<bool> {
        let response = self
            .client
            .get(TOKENINFO_ENDPOINT)
            .query(&[("access_token", access_token)])
            .send()
            .await
            .wrap_err("Tokeninfo request failed")?;
        Ok(response.status().is_success())
    }
}

pub struct OAuthService {
    config: GoogleOAuthConfig,
    repo: Arc<dyn OAuthTokenRepository>,
    endpoint: Arc<dyn TokenEndpoint>,
}

impl OAuthService {
    pub fn new(
        config: GoogleOAuthConfig,
        repo: Arc<dyn OAuthTokenRepository>,
        endpoint: Arc<dyn TokenEndpoint>,
    ) -> Self {
        Self {
            config,
            repo,
            endpoint,
        }
    }

    pub fn get_auth_url(&self) -> String {
        let scopes = self.config.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            AUTH_ENDPOINT,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scopes),
        )
    }

    /// Exchanges an authorization code and stores the resulting token set.
    pub async fn handle_callback(&self, code: &str) -> bool {
        let result = async {
            let grant = self.endpoint.exchange_code(code).await?;
            let token = self.token_from_grant(grant, None);
            self.repo.save_token(&token).await?;
            Ok::<_, eyre::Report>(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("Stored Google OAuth tokens");
                true
            }
            Err(e) => {
                error!("OAuth callback failed: {:#}", e);
                false
            }
        }
    }

    pub async fn load_tokens(&self) -> Result<Option<OAuthToken>> {
        Ok(self.repo.load_token(GOOGLE_PROVIDER).await?.map(Into::into))
    }

    pub async fn is_authenticated(&self) -> bool {
        match self.load_tokens().await {
            Ok(Some(token)) => token.refresh_token.is_some() || !token.is_expired_at(Utc::now()),
            Ok(None) => false,
            Err(e) => {
                warn!("Could not load OAuth tokens: {:#}", e);
                false
            }
        }
    }

    pub async fn test_connection(&self) -> bool {
        let token = match self.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("OAuth connection test has no usable token: {:#}", e);
                return false;
            }
        };

        match self.endpoint.verify(&token).await {
            Ok(valid) => valid,
            Err(e) => {
                warn!("OAuth token verification failed: {:#}", e);
                false
            }
        }
    }

    fn token_from_grant(&self, grant: TokenGrant, previous_refresh: Option<String>) -> OAuthToken {
        let now = Utc::now();
        let scopes = match grant.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => self.config.scopes.clone(),
        };

        OAuthToken {
            provider: GOOGLE_PROVIDER.to_string(),
            access_token: grant.access_token,
            refresh_token: grant.refresh_token.or(previous_refresh),
            expires_at: grant
                .expires_in
                .map(|secs| now + ChronoDuration::seconds(secs)),
            scopes,
            token_type: grant.token_type.unwrap_or_else(|| "Bearer".to_string()),
            updated_at: now,
        }
    }
}

#[async_trait]
impl AccessTokenSource for OAuthService {
    async fn access_token(&self) -> Result<String> {
        let token = self
            .load_tokens()
            .await?
            .ok_or_else(|| eyre!("Google account is not connected"))?;

        let refresh_at = Utc::now() + ChronoDuration::seconds(REFRESH_MARGIN_SECS);
        if !token.is_expired_at(refresh_at) {
            return Ok(token.access_token);
        }

        let refresh_token = token
            .refresh_token
            .ok_or_else(|| eyre!("Access token expired and no refresh token is stored"))?;

        info!("Refreshing Google access token");
        let grant = self.endpoint.refresh(&refresh_token).await?;
        let refreshed = self.token_from_grant(grant, Some(refresh_token));
        self.repo.save_token(&refreshed).await?;

        Ok(refreshed.access_token)
    }
}
