//! Auth scheme controller.
//!
//! Orchestrates the access and refresh credentials against the identity
//! provider: session restore on startup, login, logout, refresh and user
//! profile retrieval. Mutating operations take `&mut self`, so calls on one
//! controller can never interleave.

use std::sync::Arc;

use sessionkit_domain::{
    CheckResult, DomainError, Endpoint, LoginCredentials, SchemeConfig, TokenStatus, UserProfile,
    merge_profile, provider_profile, response_property,
};
use tracing::{debug, error, info, warn};

use super::expiration::TokenContext;
use super::provider_storage::ProviderStorage;
use super::refresh_token::RefreshToken;
use super::token::AccessToken;
use crate::error::{AuthError, AuthResult, ProviderError};
use crate::ports::{
    Clock, ExpiryStore, HeaderSink, IdentityProvider, RequestInterceptor, SharedSession,
    UserInfoClient,
};

/// Where an error reported to the error handlers originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorContext {
    /// Scheme operation that failed.
    pub method: &'static str,
}

/// Callback invoked with errors that are also returned to the caller.
pub type ErrorHandler = Box<dyn Fn(&AuthError, &ErrorContext) + Send + Sync>;

/// Coarse session state of the scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeState {
    /// No credentials are held.
    NoSession,
    /// Credentials are held.
    SessionActive {
        /// The access credential has expired.
        token_expired: bool,
        /// The refresh credential has expired.
        refresh_token_expired: bool,
    },
}

struct NoopInterceptor;

impl RequestInterceptor for NoopInterceptor {
    fn initialize(&self, _token_endpoint: Option<&Endpoint>) {}
}

/// Builder for [`AuthScheme`].
pub struct AuthSchemeBuilder {
    config: SchemeConfig,
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn ExpiryStore>,
    clock: Arc<dyn Clock>,
    headers: Arc<dyn HeaderSink>,
    interceptor: Option<Arc<dyn RequestInterceptor>>,
    user_info: Option<Arc<dyn UserInfoClient>>,
    error_handlers: Vec<ErrorHandler>,
}

impl AuthSchemeBuilder {
    /// Sets the request interceptor armed after a successful session restore.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Sets the client used for `endpoints.user`.
    #[must_use]
    pub fn user_info(mut self, client: Arc<dyn UserInfoClient>) -> Self {
        self.user_info = Some(client);
        self
    }

    /// Registers an error handler.
    #[must_use]
    pub fn on_error(
        mut self,
        handler: impl Fn(&AuthError, &ErrorContext) + Send + Sync + 'static,
    ) -> Self {
        self.error_handlers.push(Box::new(handler));
        self
    }

    /// Validates the options and builds the scheme.
    ///
    /// The provider receives a [`ProviderStorage`] over the same store.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the options are invalid or a user endpoint
    /// is configured without a user-info client.
    pub fn build(self) -> AuthResult<AuthScheme> {
        self.config.validate()?;

        let user_endpoint = match (self.config.endpoints.user.clone(), self.user_info) {
            (Some(endpoint), Some(client)) => Some((endpoint, client)),
            (Some(_), None) => {
                return Err(DomainError::InvalidConfiguration(
                    "endpoints.user requires a user-info client".to_string(),
                )
                .into());
            }
            (None, _) => None,
        };

        let storage = ProviderStorage::new(
            self.store.clone(),
            self.config.credentials.storage_prefix(),
        );
        self.provider.attach_storage(Arc::new(storage));

        Ok(AuthScheme {
            context: TokenContext::new(self.store, self.clock),
            config: self.config,
            provider: self.provider,
            headers: self.headers,
            interceptor: self
                .interceptor
                .unwrap_or_else(|| Arc::new(NoopInterceptor)),
            user_endpoint,
            error_handlers: self.error_handlers,
            token: None,
            refresh_token: None,
            user: None,
        })
    }
}

/// Auth scheme over an identity provider session.
pub struct AuthScheme {
    config: SchemeConfig,
    provider: Arc<dyn IdentityProvider>,
    context: TokenContext,
    headers: Arc<dyn HeaderSink>,
    interceptor: Arc<dyn RequestInterceptor>,
    user_endpoint: Option<(Endpoint, Arc<dyn UserInfoClient>)>,
    error_handlers: Vec<ErrorHandler>,
    token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    user: Option<UserProfile>,
}

impl AuthScheme {
    /// Starts building a scheme from its required collaborators.
    #[must_use]
    pub fn builder(
        config: SchemeConfig,
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn ExpiryStore>,
        clock: Arc<dyn Clock>,
        headers: Arc<dyn HeaderSink>,
    ) -> AuthSchemeBuilder {
        AuthSchemeBuilder {
            config,
            provider,
            store,
            clock,
            headers,
            interceptor: None,
            user_info: None,
            error_handlers: Vec::new(),
        }
    }

    /// The scheme options.
    #[must_use]
    pub const fn config(&self) -> &SchemeConfig {
        &self.config
    }

    /// The access credential, if a session is held.
    #[must_use]
    pub const fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// The refresh credential, if a session is held.
    #[must_use]
    pub const fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    /// The current user profile.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Whether a user profile is set.
    #[must_use]
    pub const fn logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Replaces the user profile.
    pub fn set_user(&mut self, user: Option<UserProfile>) {
        self.user = user;
    }

    /// Coarse state derived from the held credentials, without syncing.
    #[must_use]
    pub fn state(&self) -> SchemeState {
        let Some(token) = &self.token else {
            return SchemeState::NoSession;
        };

        SchemeState::SessionActive {
            token_expired: token.status().is_expired(),
            refresh_token_expired: self
                .refresh_token
                .as_ref()
                .is_some_and(|refresh| refresh.status().is_expired()),
        }
    }

    /// Computes the composite validity of the held credentials.
    ///
    /// Both credentials are synced first. With `verify_status` false only
    /// the presence of the access credential is checked.
    pub fn check(&self, verify_status: bool) -> CheckResult {
        let token = self.token.as_ref().and_then(AccessToken::sync);
        if let Some(refresh_token) = &self.refresh_token {
            refresh_token.sync();
        }

        if token.is_none() {
            return CheckResult::invalid();
        }

        if !verify_status {
            return CheckResult::valid();
        }

        let token_status = self
            .token
            .as_ref()
            .map_or(TokenStatus::Unknown, AccessToken::status);
        let refresh_status = self
            .refresh_token
            .as_ref()
            .map_or(TokenStatus::Unknown, RefreshToken::status);

        if token_status.is_unknown() || refresh_status.is_unknown() {
            return CheckResult::invalid();
        }

        if refresh_status.is_expired() {
            return CheckResult::refresh_token_expired();
        }

        if token_status.is_expired() {
            return CheckResult::token_expired();
        }

        CheckResult::valid()
    }

    /// Restores the session held by the provider on startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the restored session carries a malformed token,
    /// after resetting the scheme, or if the user endpoint fails.
    pub async fn mounted(&mut self) -> AuthResult<()> {
        let session = match self.provider.current_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!(scheme = %self.config.name, error = %err, "session retrieval failed");
                None
            }
        };

        let Some(session) = session else {
            debug!(scheme = %self.config.name, "no session to restore");
            self.reset();
            return Ok(());
        };

        if let Err(err) = self.init_tokens(&session) {
            warn!(scheme = %self.config.name, error = %err, "restored session is unusable");
            self.reset();
            return Err(err);
        }

        let status = self.check(true);
        if status.refresh_token_expired || (status.token_expired && self.config.auto_logout) {
            info!(
                scheme = %self.config.name,
                token_expired = status.token_expired,
                refresh_token_expired = status.refresh_token_expired,
                "restored session expired"
            );
            self.reset();
            return Ok(());
        }

        self.interceptor
            .initialize(self.config.endpoints.token.as_ref());
        info!(scheme = %self.config.name, "session restored");

        self.fetch_user_once().await
    }

    /// Signs in with fresh credentials, replacing any previous session.
    ///
    /// # Errors
    ///
    /// Returns an error if sign-out or sign-in fails, the new session carries
    /// a malformed token, or the automatic user fetch fails.
    pub async fn login(&mut self, credentials: &LoginCredentials) -> AuthResult<SharedSession> {
        self.logout().await?;

        let session = self.provider.sign_in(credentials).await?;
        if let Err(err) = self.init_tokens(&session) {
            self.reset();
            return Err(err);
        }
        info!(scheme = %self.config.name, username = %credentials.username, "logged in");

        if self.config.user.auto_fetch {
            self.fetch_user().await?;
        }

        Ok(session)
    }

    /// Renews the session through the provider.
    ///
    /// Returns `None` when no refresh credential is held.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ExpiredAuthSession`] if the refresh credential
    /// has expired, or the error that stopped the renewal. The scheme is
    /// reset in both cases.
    pub async fn refresh_tokens(&mut self) -> AuthResult<Option<SharedSession>> {
        let Some(refresh_token) = &self.refresh_token else {
            return Ok(None);
        };
        let Some(refresh_value) = refresh_token.get() else {
            return Ok(None);
        };

        if refresh_token.status().is_expired() {
            warn!(scheme = %self.config.name, "refresh token expired");
            self.reset();
            return Err(AuthError::ExpiredAuthSession);
        }

        self.headers.clear_header();
        match self.renew_session(&refresh_value).await {
            Ok(session) => {
                info!(scheme = %self.config.name, "tokens refreshed");
                Ok(session)
            }
            Err(err) => {
                warn!(scheme = %self.config.name, error = %err, "token refresh failed");
                self.reset();
                Err(err)
            }
        }
    }

    /// Fetches the user profile.
    ///
    /// Does nothing without an access credential or a provider user.
    ///
    /// # Errors
    ///
    /// Returns the user endpoint's error after passing it to the error handlers.
    pub async fn fetch_user(&mut self) -> AuthResult<()> {
        if !self.check(false).valid {
            return Ok(());
        }

        let provider_user = match self.provider.current_authenticated_user().await {
            Ok(user) => user,
            Err(err) => {
                debug!(scheme = %self.config.name, error = %err, "no authenticated user");
                None
            }
        };
        let Some(provider_user) = provider_user else {
            return Ok(());
        };

        let profile = provider_profile(&self.config.name, &provider_user.username);

        let Some((endpoint, client)) = &self.user_endpoint else {
            self.user = Some(profile);
            return Ok(());
        };

        match client.fetch(endpoint).await {
            Ok(response) => {
                let extra = response_property(&response, self.config.user.property.as_deref());
                self.user = Some(merge_profile(profile, extra));
                Ok(())
            }
            Err(err) => {
                let err = AuthError::from(err);
                self.call_on_error(&err, ErrorContext { method: "fetch_user" });
                Err(err)
            }
        }
    }

    /// Fetches the user profile unless one is already set.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_user`].
    pub async fn fetch_user_once(&mut self) -> AuthResult<()> {
        if self.user.is_some() {
            return Ok(());
        }
        self.fetch_user().await
    }

    /// Signs out from the provider and resets the scheme.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if sign-out fails; the scheme is left untouched.
    pub async fn logout(&mut self) -> AuthResult<()> {
        self.provider.sign_out().await?;
        self.reset();
        Ok(())
    }

    /// Clears the profile, both credentials and the request header.
    pub fn reset(&mut self) {
        self.user = None;

        if let Some(token) = self.token.take() {
            token.reset();
        }

        if let Some(refresh_token) = self.refresh_token.take() {
            refresh_token.reset();
        }

        self.headers.clear_header();
        debug!(scheme = %self.config.name, "auth state reset");
    }

    fn init_tokens(&mut self, session: &SharedSession) -> AuthResult<()> {
        if self.token.is_none() {
            self.token = Some(self.new_access_token(Some(session.clone()))?);
        }

        if self.refresh_token.is_none() {
            self.refresh_token = Some(self.new_refresh_token(Some(session.clone()))?);
        }

        Ok(())
    }

    fn update_tokens(&mut self, session: Option<SharedSession>) -> AuthResult<()> {
        let token = self.new_access_token(session.clone())?;
        let refresh_token = self.new_refresh_token(session)?;

        self.token = Some(token);
        self.refresh_token = Some(refresh_token);
        Ok(())
    }

    fn new_access_token(&self, session: Option<SharedSession>) -> AuthResult<AccessToken> {
        AccessToken::new(
            session,
            &self.config,
            self.context.clone(),
            self.headers.clone(),
        )
    }

    fn new_refresh_token(&self, session: Option<SharedSession>) -> AuthResult<RefreshToken> {
        RefreshToken::new(session, &self.config, self.context.clone())
    }

    async fn renew_session(&mut self, refresh_value: &str) -> AuthResult<Option<SharedSession>> {
        self.refresh_provider_session(refresh_value).await?;

        let session = self.provider.current_session().await?;
        self.update_tokens(session.clone())?;
        Ok(session)
    }

    /// Starts the provider refresh. The completion callback only logs
    /// failures; the caller re-reads the current session either way.
    async fn refresh_provider_session(&self, refresh_value: &str) -> AuthResult<()> {
        let user = self
            .provider
            .current_authenticated_user()
            .await?
            .ok_or(ProviderError::NotAuthenticated)?;

        let scheme = self.config.name.clone();
        self.provider.refresh_session(
            &user,
            refresh_value,
            Box::new(move |outcome| {
                if let Err(err) = outcome {
                    error!(scheme = %scheme, error = %err, "provider session refresh failed");
                }
            }),
        );

        Ok(())
    }

    fn call_on_error(&self, err: &AuthError, context: ErrorContext) {
        for handler in &self.error_handlers {
            handler(err, &context);
        }
    }
}

impl std::fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthScheme")
            .field("name", &self.config.name)
            .field("token", &self.token)
            .field("refresh_token", &self.refresh_token)
            .field("logged_in", &self.logged_in())
            .finish_non_exhaustive()
    }
}
