//! Scheme options.
//!
//! Every field has a default, so a configuration file only needs to name
//! what it overrides. Keys are camelCase to stay compatible with existing
//! scheme option files.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

const DEFAULT_SCHEME_NAME: &str = "cognito";
const DEFAULT_TOKEN_TYPE: &str = "Bearer";
const DEFAULT_HEADER_NAME: &str = "Authorization";
const DEFAULT_TOKEN_MAX_AGE: u64 = 1800;
const DEFAULT_REFRESH_MAX_AGE: u64 = 60 * 60 * 24 * 30;
const DEFAULT_TOKEN_PREFIX: &str = "_token_expiration.";
const DEFAULT_REFRESH_PREFIX: &str = "_refresh_token_expiration.";
const DEFAULT_STORAGE_SERVICE: &str = "CognitoIdentityServiceProvider";

/// Options for one auth scheme instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemeConfig {
    /// Scheme name; suffix of every storage key.
    pub name: String,
    /// Access credential options.
    pub token: TokenConfig,
    /// Refresh credential options.
    pub refresh_token: RefreshTokenConfig,
    /// User profile options.
    pub user: UserConfig,
    /// Optional remote endpoints.
    pub endpoints: EndpointsConfig,
    /// Reset the session on startup when the access credential has expired.
    pub auto_logout: bool,
    /// Provider client settings.
    pub credentials: ProviderCredentials,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SCHEME_NAME.to_string(),
            token: TokenConfig::default(),
            refresh_token: RefreshTokenConfig::default(),
            user: UserConfig::default(),
            endpoints: EndpointsConfig::default(),
            auto_logout: false,
            credentials: ProviderCredentials::default(),
        }
    }
}

impl SchemeConfig {
    /// Storage key of the access credential's expiration.
    #[must_use]
    pub fn token_expiration_key(&self) -> String {
        format!("{}{}", self.token.expiration_prefix, self.name)
    }

    /// Storage key of the refresh credential's expiration.
    #[must_use]
    pub fn refresh_token_expiration_key(&self) -> String {
        format!("{}{}", self.refresh_token.expiration_prefix, self.name)
    }

    /// Checks the options for values that would make credentials collide.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfiguration`] if the scheme name or
    /// header name is empty, or both credentials share an expiration key.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "scheme name must not be empty".to_string(),
            ));
        }
        if self.token.name.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "token.name must not be empty".to_string(),
            ));
        }
        if self.token_expiration_key() == self.refresh_token_expiration_key() {
            return Err(DomainError::InvalidConfiguration(format!(
                "token and refreshToken share the expiration key {}",
                self.token_expiration_key()
            )));
        }
        Ok(())
    }
}

/// Which credential of the provider session a token reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// The identity token.
    #[serde(alias = "idToken")]
    IdToken,
    /// The access token.
    #[serde(alias = "accessToken")]
    AccessToken,
    /// The refresh token.
    #[serde(alias = "refreshToken")]
    RefreshToken,
}

/// Access credential options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenConfig {
    /// Session credential used as the access credential.
    pub property: CredentialSource,
    /// Scheme prefix, e.g. `Bearer`. Empty or absent means no prefix.
    #[serde(rename = "type")]
    pub token_type: Option<String>,
    /// Request header name.
    pub name: String,
    /// Fallback lifetime in seconds for opaque tokens; `0` disables tracking.
    pub max_age: u64,
    /// Prefix of the expiration storage key.
    pub expiration_prefix: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            property: CredentialSource::IdToken,
            token_type: Some(DEFAULT_TOKEN_TYPE.to_string()),
            name: DEFAULT_HEADER_NAME.to_string(),
            max_age: DEFAULT_TOKEN_MAX_AGE,
            expiration_prefix: DEFAULT_TOKEN_PREFIX.to_string(),
        }
    }
}

impl TokenConfig {
    /// The effective prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        non_empty(self.token_type.as_deref())
    }
}

/// Refresh credential options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshTokenConfig {
    /// Session credential used as the refresh credential.
    pub property: CredentialSource,
    /// Optional scheme prefix.
    #[serde(rename = "type")]
    pub token_type: Option<String>,
    /// Fallback lifetime in seconds; `0` disables tracking.
    pub max_age: u64,
    /// Prefix of the expiration storage key.
    pub expiration_prefix: String,
}

impl Default for RefreshTokenConfig {
    fn default() -> Self {
        Self {
            property: CredentialSource::RefreshToken,
            token_type: None,
            max_age: DEFAULT_REFRESH_MAX_AGE,
            expiration_prefix: DEFAULT_REFRESH_PREFIX.to_string(),
        }
    }
}

impl RefreshTokenConfig {
    /// The effective prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        non_empty(self.token_type.as_deref())
    }
}

/// User profile options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserConfig {
    /// Dotted path of the profile inside the user endpoint response; absent
    /// means the whole body.
    pub property: Option<String>,
    /// Fetch the profile right after login.
    pub auto_fetch: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            property: None,
            auto_fetch: true,
        }
    }
}

/// Optional remote endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Token endpoint; requests to it bypass the interceptor.
    pub token: Option<Endpoint>,
    /// User-info endpoint; absent means the profile comes from the provider alone.
    pub user: Option<Endpoint>,
}

/// A remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Absolute URL.
    pub url: String,
    /// HTTP method.
    #[serde(default)]
    pub method: EndpointMethod,
}

impl Endpoint {
    /// A `GET` endpoint at `url`.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: EndpointMethod::Get,
        }
    }
}

/// Methods allowed for endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
}

/// Provider client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderCredentials {
    /// Provider application client id.
    #[serde(alias = "userPoolWebClientId")]
    pub client_id: Option<String>,
    /// Service segment of the provider's own storage keys.
    pub service: String,
}

impl Default for ProviderCredentials {
    fn default() -> Self {
        Self {
            client_id: None,
            service: DEFAULT_STORAGE_SERVICE.to_string(),
        }
    }
}

impl ProviderCredentials {
    /// Prefix of every key the provider writes to the store.
    #[must_use]
    pub fn storage_prefix(&self) -> String {
        format!(
            "auth.{}.{}.",
            self.service,
            self.client_id.as_deref().unwrap_or_default()
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
