//! Integration tests for the auth scheme over the real adapters.
//!
//! These tests drive login, restore, refresh and logout against a scripted
//! identity provider while expirations persist through a shared JSON file.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use reqwest::Client;
use serde_json::json;
use tempfile::tempdir;

use sessionkit_application::ports::{
    Clock, ExpiryStore, IdentityProvider, ProviderSession, ProviderUser, RefreshCallback,
    SessionStorage, SharedSession,
};
use sessionkit_application::{AuthError, AuthScheme, ProviderError};
use sessionkit_domain::{CheckResult, LoginCredentials, SchemeConfig, StoredValue};
use sessionkit_infrastructure::{
    JsonFileMedium, RequestHeaders, UniversalStorage, load_scheme_config,
};

const NOW: i64 = 1_700_000_000_000;
const NOW_SECS: i64 = NOW / 1000;
const PREFIX: &str = "auth.CognitoIdentityServiceProvider.web-client.";

fn jwt(exp: i64) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{exp}}}"#))
    )
}

struct TestClock(AtomicI64);

impl TestClock {
    fn advance(&self, millis: i64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0.load(Ordering::SeqCst)).unwrap()
    }
}

#[derive(Debug, Clone)]
struct Session {
    id_token: String,
    refresh_token: String,
}

impl ProviderSession for Session {
    fn id_token(&self) -> Option<String> {
        Some(self.id_token.clone())
    }

    fn access_token(&self) -> Option<String> {
        None
    }

    fn refresh_token(&self) -> Option<String> {
        Some(self.refresh_token.clone())
    }
}

/// Provider that keeps its session keys in the attached storage, like the SDK.
#[derive(Default)]
struct StoringProvider {
    storage: Mutex<Option<Arc<dyn SessionStorage>>>,
    next_refresh: Mutex<Option<Session>>,
}

impl StoringProvider {
    fn storage(&self) -> Arc<dyn SessionStorage> {
        self.storage.lock().clone().expect("storage attached")
    }

    fn save(&self, username: &str, session: &Session) {
        let storage = self.storage();
        storage.set_item(&format!("{PREFIX}LastAuthUser"), username);
        storage.set_item(&format!("{PREFIX}{username}.idToken"), &session.id_token);
        storage.set_item(&format!("{PREFIX}{username}.refreshToken"), &session.refresh_token);
    }

    fn load(&self) -> Option<(String, Session)> {
        let storage = self.storage();
        let username = storage.get_item(&format!("{PREFIX}LastAuthUser"))?;
        let session = Session {
            id_token: storage.get_item(&format!("{PREFIX}{username}.idToken"))?,
            refresh_token: storage.get_item(&format!("{PREFIX}{username}.refreshToken"))?,
        };
        Some((username, session))
    }
}

#[async_trait]
impl IdentityProvider for StoringProvider {
    fn attach_storage(&self, storage: Arc<dyn SessionStorage>) {
        *self.storage.lock() = Some(storage);
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<SharedSession, ProviderError> {
        if credentials.password != "secret" {
            return Err(ProviderError::SignInRejected("bad password".to_string()));
        }
        let session = Session {
            id_token: jwt(NOW_SECS + 3600),
            refresh_token: jwt(NOW_SECS + 86_400),
        };
        self.save(&credentials.username, &session);
        Ok(Arc::new(session))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.storage().clear();
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<SharedSession>, ProviderError> {
        Ok(self
            .load()
            .map(|(_, session)| Arc::new(session) as SharedSession))
    }

    async fn current_authenticated_user(&self) -> Result<Option<ProviderUser>, ProviderError> {
        Ok(self.load().map(|(username, _)| ProviderUser::new(username)))
    }

    fn refresh_session(&self, user: &ProviderUser, _refresh_token: &str, callback: RefreshCallback) {
        let outcome = match self.next_refresh.lock().take() {
            Some(session) => {
                self.save(&user.username, &session);
                Ok(Arc::new(session) as SharedSession)
            }
            None => Err(ProviderError::Other("refresh token revoked".to_string())),
        };
        callback(outcome);
    }
}

struct Context {
    scheme: AuthScheme,
    store: Arc<UniversalStorage<JsonFileMedium>>,
    headers: Arc<RequestHeaders>,
    provider: Arc<StoringProvider>,
}

fn config() -> SchemeConfig {
    let mut config = SchemeConfig::default();
    config.credentials.client_id = Some("web-client".to_string());
    config
}

fn context(path: &Path, config: SchemeConfig, clock: Arc<TestClock>) -> Context {
    let store = Arc::new(UniversalStorage::new(JsonFileMedium::new(path)));
    let headers = Arc::new(RequestHeaders::from_config(&config).unwrap());
    let provider = Arc::new(StoringProvider::default());
    let scheme = AuthScheme::builder(
        config,
        provider.clone(),
        store.clone(),
        clock,
        headers.clone(),
    )
    .interceptor(headers.clone())
    .build()
    .unwrap();

    Context {
        scheme,
        store,
        headers,
        provider,
    }
}

fn authorization(headers: &RequestHeaders) -> Option<String> {
    let request = headers.apply(Client::new().get("https://api.example.com/items").build().unwrap());
    request
        .headers()
        .get("authorization")
        .map(|value| value.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_login_survives_reload() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("session.json");
    let clock = Arc::new(TestClock(AtomicI64::new(NOW)));

    let mut first = context(&path, config(), clock.clone());
    first
        .scheme
        .login(&LoginCredentials::new("alice", "secret"))
        .await
        .unwrap();
    assert_eq!(
        authorization(&first.headers),
        Some(format!("Bearer {}", jwt(NOW_SECS + 3600)))
    );

    let mut reloaded = context(&path, config(), clock);
    assert!(!reloaded.headers.is_armed());
    reloaded.scheme.mounted().await.unwrap();

    assert!(reloaded.headers.is_armed());
    assert_eq!(reloaded.scheme.check(true), CheckResult::valid());
    assert_eq!(
        reloaded
            .scheme
            .user()
            .cloned()
            .map(serde_json::Value::Object),
        Some(json!({ "cognito": { "username": "alice" } }))
    );
    assert_eq!(
        reloaded.store.get_universal("_token_expiration.cognito"),
        Some(StoredValue::Millis((NOW_SECS + 3600) * 1000))
    );
}

#[tokio::test]
async fn test_expiry_written_by_another_context_is_seen() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("session.json");
    let clock = Arc::new(TestClock(AtomicI64::new(NOW)));

    let mut ctx = context(&path, config(), clock);
    ctx.scheme
        .login(&LoginCredentials::new("alice", "secret"))
        .await
        .unwrap();

    let other = UniversalStorage::new(JsonFileMedium::new(&path));
    other.set_universal("_refresh_token_expiration.cognito", StoredValue::Millis(NOW - 1));

    let result = ctx.scheme.check(true);
    assert_eq!(result, CheckResult::refresh_token_expired());

    let refreshed = ctx.scheme.refresh_tokens().await;
    assert!(matches!(refreshed, Err(AuthError::ExpiredAuthSession)));
    assert!(ctx.scheme.token().is_none());
    assert_eq!(authorization(&ctx.headers), None);
    assert_eq!(
        other.sync_universal("_refresh_token_expiration.cognito"),
        Some(StoredValue::FALSE)
    );
}

#[tokio::test]
async fn test_refresh_renews_tokens_through_provider() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("session.json");
    let clock = Arc::new(TestClock(AtomicI64::new(NOW)));

    let mut ctx = context(&path, config(), clock.clone());
    ctx.scheme
        .login(&LoginCredentials::new("alice", "secret"))
        .await
        .unwrap();

    clock.advance(3_600_000);
    assert_eq!(ctx.scheme.check(true), CheckResult::token_expired());

    let renewed = Session {
        id_token: jwt(NOW_SECS + 7200),
        refresh_token: jwt(NOW_SECS + 90_000),
    };
    *ctx.provider.next_refresh.lock() = Some(renewed.clone());

    let session = ctx.scheme.refresh_tokens().await.unwrap().unwrap();
    assert_eq!(session.id_token(), Some(renewed.id_token.clone()));
    assert_eq!(ctx.scheme.check(true), CheckResult::valid());
    assert_eq!(authorization(&ctx.headers), Some(format!("Bearer {}", renewed.id_token)));
}

#[tokio::test]
async fn test_logout_clears_file_state() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("session.json");
    let clock = Arc::new(TestClock(AtomicI64::new(NOW)));

    let mut ctx = context(&path, config(), clock.clone());
    ctx.scheme
        .login(&LoginCredentials::new("alice", "secret"))
        .await
        .unwrap();
    ctx.scheme.logout().await.unwrap();

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        stored,
        json!({
            "_token_expiration.cognito": false,
            "_refresh_token_expiration.cognito": false
        })
    );

    let mut reloaded = context(&path, config(), clock);
    reloaded.scheme.mounted().await.unwrap();
    assert_eq!(reloaded.scheme.check(false), CheckResult::invalid());
    assert!(!reloaded.scheme.logged_in());
}

#[tokio::test]
async fn test_rejected_login_leaves_no_session() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let clock = Arc::new(TestClock(AtomicI64::new(NOW)));

    let mut ctx = context(&temp_dir.path().join("session.json"), config(), clock);
    let result = ctx
        .scheme
        .login(&LoginCredentials::new("alice", "wrong"))
        .await;

    assert!(matches!(
        result,
        Err(AuthError::Provider(ProviderError::SignInRejected(_)))
    ));
    assert_eq!(ctx.scheme.check(false), CheckResult::invalid());
}

#[tokio::test]
async fn test_options_file_drives_storage_keys() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let options = temp_dir.path().join("auth.yaml");
    std::fs::write(
        &options,
        "name: pool\nautoLogout: true\ncredentials:\n  clientId: web-client\n",
    )
    .unwrap();
    let config = load_scheme_config(&options).unwrap();
    let clock = Arc::new(TestClock(AtomicI64::new(NOW)));

    let mut ctx = context(&temp_dir.path().join("session.json"), config, clock.clone());
    ctx.scheme
        .login(&LoginCredentials::new("alice", "secret"))
        .await
        .unwrap();
    assert_eq!(
        ctx.store.get_universal("_token_expiration.pool"),
        Some(StoredValue::Millis((NOW_SECS + 3600) * 1000))
    );

    clock.advance(3_600_000);
    let mut reloaded = context(
        &temp_dir.path().join("session.json"),
        load_scheme_config(&options).unwrap(),
        clock,
    );
    reloaded.scheme.mounted().await.unwrap();
    assert!(reloaded.scheme.token().is_none());
    assert!(!reloaded.headers.is_armed());
}
