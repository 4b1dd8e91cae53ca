mod cache;

pub use cache::{Credential, TokenCache};

use crate::config::GoogleConfig;
use crate::error::{AppError, Result};
use oauth2::{
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, RefreshToken, RequestTokenError, Scope,
    StandardRevocableToken, TokenResponse, TokenUrl,
    basic::{
        BasicClient, BasicErrorResponse, BasicRevocationErrorResponse,
        BasicTokenIntrospectionResponse, BasicTokenResponse,
    },
};
use reqwest::redirect::Policy;
use std::path::Path;
use tracing::{debug, info, instrument};
use url::Url;

// Type alias for the client when Auth and Token URLs are set
type ConfiguredClient = Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,    // HasAuthUrl
    EndpointNotSet, // HasDeviceAuthUrl
    EndpointNotSet, // HasIntrospectionUrl
    EndpointNotSet, // HasRevocationUrl
    EndpointSet,    // HasTokenUrl
>;

/// Outcome of resolving a credential
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A bearer credential ready for API calls
    Credential(Credential),
    /// No usable credential; a human must visit the URL and rerun with the code
    ConsentRequired(Url),
}

pub struct CredentialResolver {
    client: ConfiguredClient,
    http_client: reqwest::Client,
    scopes: Vec<Scope>,
}

impl CredentialResolver {
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to build reqwest client: {}", e)))?;

        Self::with_http_client(config, http_client)
    }

    pub fn with_http_client(config: &GoogleConfig, http_client: reqwest::Client) -> Result<Self> {
        let auth_url = AuthUrl::new(config.auth_url.clone())
            .map_err(|e| AppError::Auth(format!("Invalid auth URL: {}", e)))?;
        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| AppError::Auth(format!("Invalid token URL: {}", e)))?;
        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| AppError::Auth(format!("Invalid redirect URL: {}", e)))?;

        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        let scopes = config
            .scope
            .split_whitespace()
            .map(|s| Scope::new(s.to_string()))
            .collect();

        Ok(Self {
            client,
            http_client,
            scopes,
        })
    }

    /// HTTP client to reuse for authenticated API calls
    pub fn http_client(&self) -> reqwest::Client {
        self.http_client.clone()
    }

    /// Provider page where a human grants access and receives a one-time code
    pub fn consent_url(&self) -> Url {
        let (url, _csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.clone())
            .add_extra_param("access_type", "offline")
            .url();
        url
    }

    /// Produce a bearer credential from the cache at `cache_path`, a refresh, or
    /// an exchange of `code`.
    ///
    /// Returns [`Resolution::ConsentRequired`] when nothing is cached and `code`
    /// is empty. A failed exchange leaves the cache untouched.
    #[instrument(name = "Resolving credential", skip_all, fields(cache = ?cache_path))]
    pub async fn resolve(&self, cache_path: &Path, code: &str) -> Result<Resolution> {
        let cache = TokenCache::new(cache_path);
        let cached = cache.load()?;

        if let Some(credential) = cached {
            if !credential.is_expired() {
                debug!("Using cached credential");
                return Ok(Resolution::Credential(credential));
            }

            if let Some(refresh_token) = &credential.refresh_token {
                debug!("Cached credential expired, refreshing...");
                match self.refresh(refresh_token).await {
                    Ok(refreshed) => {
                        cache.save(&refreshed)?;
                        return Ok(Resolution::Credential(refreshed));
                    }
                    Err(e) => debug!("Token refresh failed ({}), falling back to code", e),
                }
            }
        }

        if code.is_empty() {
            return Ok(Resolution::ConsentRequired(self.consent_url()));
        }

        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(exchange_error)?;

        let credential = credential_from_response(&token_result, None);
        cache.save(&credential)?;
        info!(path = ?cache.path(), "Token is cached");

        Ok(Resolution::Credential(credential))
    }

    /// Only talks to the token endpoint; persisting the result is up to the caller
    async fn refresh(&self, refresh_token: &str) -> Result<Credential> {
        let token_result = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(exchange_error)?;

        // Refresh responses usually omit the refresh token; keep the old one
        Ok(credential_from_response(&token_result, Some(refresh_token)))
    }
}

fn credential_from_response(
    token_result: &BasicTokenResponse,
    fallback_refresh_token: Option<&str>,
) -> Credential {
    let refresh_token = token_result
        .refresh_token()
        .map(|token| token.secret().clone())
        .or_else(|| fallback_refresh_token.map(str::to_string));

    // Provider-controlled; an out-of-range lifetime saturates instead of wrapping
    let expires_at = token_result.expires_in().map(|d| {
        let secs = i64::try_from(d.as_secs()).unwrap_or(i64::MAX);
        chrono::Utc::now().timestamp().saturating_add(secs)
    });

    Credential {
        access_token: token_result.access_token().secret().clone(),
        refresh_token,
        expires_at,
    }
}

fn exchange_error<RE>(e: RequestTokenError<RE, BasicErrorResponse>) -> AppError
where
    RE: std::error::Error + 'static,
{
    match e {
        RequestTokenError::ServerResponse(response) => AppError::Exchange(response.to_string()),
        other => AppError::Exchange(other.to_string()),
    }
}
