//! In-memory fakes for the auth ports.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sessionkit_domain::{Endpoint, LoginCredentials, StoredValue};

use crate::error::{ProviderError, UserInfoError};
use crate::ports::{
    Clock, ExpiryStore, HeaderSink, IdentityProvider, ProviderSession, ProviderUser,
    RefreshCallback, RequestInterceptor, SessionStorage, SharedSession, UserInfoClient,
};

pub fn jwt_with_payload(payload: &str) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}

pub fn jwt_with_exp(exp: i64) -> String {
    jwt_with_payload(&format!(r#"{{"sub":"user-1","exp":{exp}}}"#))
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn at(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap()
    }
}

/// Store with separate process state and medium maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<HashMap<String, StoredValue>>,
    medium: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn get(&self, key: &str) -> Option<StoredValue> {
        self.state.lock().get(key).cloned()
    }

    /// Simulates another context writing to the medium.
    pub fn write_medium(&self, key: &str, value: StoredValue) {
        self.medium.lock().insert(key.to_string(), value);
    }

    pub fn remove_medium(&self, key: &str) {
        self.medium.lock().remove(key);
    }
}

impl ExpiryStore for MemoryStore {
    fn get_universal(&self, key: &str) -> Option<StoredValue> {
        self.get(key)
    }

    fn set_universal(&self, key: &str, value: StoredValue) -> StoredValue {
        self.state.lock().insert(key.to_string(), value.clone());
        self.medium.lock().insert(key.to_string(), value.clone());
        value
    }

    fn sync_universal(&self, key: &str) -> Option<StoredValue> {
        let value = self.medium.lock().get(key).cloned();
        let mut state = self.state.lock();
        match &value {
            Some(value) => state.insert(key.to_string(), value.clone()),
            None => state.remove(key),
        };
        value
    }

    fn remove_universal(&self, key: &str) {
        self.state.lock().remove(key);
        self.medium.lock().remove(key);
    }
}

/// Header sink remembering the last value and interceptor arming.
#[derive(Debug, Default)]
pub struct RecordingHeaders {
    value: Mutex<Option<String>>,
    armed: AtomicUsize,
}

impl RecordingHeaders {
    pub fn current(&self) -> Option<String> {
        self.value.lock().clone()
    }

    pub fn armed_count(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }
}

impl HeaderSink for RecordingHeaders {
    fn set_header(&self, value: &str) {
        *self.value.lock() = Some(value.to_string());
    }

    fn clear_header(&self) {
        *self.value.lock() = None;
    }
}

impl RequestInterceptor for RecordingHeaders {
    fn initialize(&self, _token_endpoint: Option<&Endpoint>) {
        self.armed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mutable provider session.
#[derive(Debug, Default)]
pub struct FakeSession {
    id_token: Mutex<Option<String>>,
    access_token: Mutex<Option<String>>,
    refresh_token: Mutex<Option<String>>,
}

impl FakeSession {
    pub fn new(id_token: &str, refresh_token: &str) -> Self {
        Self {
            id_token: Mutex::new(Some(id_token.to_string())),
            access_token: Mutex::new(None),
            refresh_token: Mutex::new(Some(refresh_token.to_string())),
        }
    }

    pub fn with_payload(payload: &str) -> Self {
        Self::new(&jwt_with_payload(payload), "refresh")
    }

    pub fn set_id_token(&self, value: Option<&str>) {
        *self.id_token.lock() = value.map(str::to_string);
    }

    pub fn set_access_token(&self, value: Option<&str>) {
        *self.access_token.lock() = value.map(str::to_string);
    }

    pub fn set_refresh_token(&self, value: Option<&str>) {
        *self.refresh_token.lock() = value.map(str::to_string);
    }
}

impl ProviderSession for FakeSession {
    fn id_token(&self) -> Option<String> {
        self.id_token.lock().clone()
    }

    fn access_token(&self) -> Option<String> {
        self.access_token.lock().clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.refresh_token.lock().clone()
    }
}

#[derive(Default)]
struct ProviderState {
    session: Option<SharedSession>,
    user: Option<ProviderUser>,
    session_error: Option<ProviderError>,
    user_error: Option<ProviderError>,
    sign_in_session: Option<SharedSession>,
    refreshed_session: Option<SharedSession>,
    refresh_error: Option<ProviderError>,
    refresh_calls: Vec<String>,
    storage: Option<Arc<dyn SessionStorage>>,
}

/// Scripted identity provider.
#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<ProviderState>,
    sign_outs: AtomicUsize,
    sign_ins: AtomicUsize,
}

impl FakeProvider {
    pub fn with_session(session: Arc<FakeSession>, username: &str) -> Self {
        let provider = Self::default();
        {
            let mut state = provider.state.lock();
            state.session = Some(session as SharedSession);
            state.user = Some(ProviderUser::new(username));
        }
        provider
    }

    pub fn set_session(&self, session: Option<Arc<FakeSession>>) {
        self.state.lock().session = session.map(|session| session as SharedSession);
    }

    pub fn set_user(&self, username: Option<&str>) {
        self.state.lock().user = username.map(ProviderUser::new);
    }

    pub fn fail_session(&self, error: ProviderError) {
        self.state.lock().session_error = Some(error);
    }

    pub fn fail_user(&self, error: ProviderError) {
        self.state.lock().user_error = Some(error);
    }

    pub fn on_sign_in(&self, session: Arc<FakeSession>) {
        self.state.lock().sign_in_session = Some(session as SharedSession);
    }

    pub fn on_refresh(&self, session: Arc<FakeSession>) {
        self.state.lock().refreshed_session = Some(session as SharedSession);
    }

    pub fn fail_refresh(&self, error: ProviderError) {
        self.state.lock().refresh_error = Some(error);
    }

    pub fn refresh_calls(&self) -> Vec<String> {
        self.state.lock().refresh_calls.clone()
    }

    pub fn storage(&self) -> Option<Arc<dyn SessionStorage>> {
        self.state.lock().storage.clone()
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub fn sign_ins(&self) -> usize {
        self.sign_ins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn attach_storage(&self, storage: Arc<dyn SessionStorage>) {
        self.state.lock().storage = Some(storage);
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<SharedSession, ProviderError> {
        self.sign_ins.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        let session = state
            .sign_in_session
            .clone()
            .ok_or_else(|| ProviderError::SignInRejected(credentials.username.clone()))?;
        state.session = Some(session.clone());
        state.user = Some(ProviderUser::new(credentials.username.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        state.session = None;
        state.user = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<SharedSession>, ProviderError> {
        let state = self.state.lock();
        if let Some(error) = &state.session_error {
            return Err(error.clone());
        }
        Ok(state.session.clone())
    }

    async fn current_authenticated_user(&self) -> Result<Option<ProviderUser>, ProviderError> {
        let state = self.state.lock();
        if let Some(error) = &state.user_error {
            return Err(error.clone());
        }
        Ok(state.user.clone())
    }

    fn refresh_session(&self, _user: &ProviderUser, refresh_token: &str, callback: RefreshCallback) {
        let outcome = {
            let mut state = self.state.lock();
            state.refresh_calls.push(refresh_token.to_string());
            if let Some(error) = state.refresh_error.clone() {
                Err(error)
            } else if let Some(session) = state.refreshed_session.clone() {
                state.session = Some(session.clone());
                Ok(session)
            } else {
                Err(ProviderError::Other("no refreshed session scripted".to_string()))
            }
        };
        callback(outcome);
    }
}

/// User-info client answering with a scripted result.
pub struct FakeUserInfo {
    response: Mutex<Result<serde_json::Value, UserInfoError>>,
    calls: AtomicUsize,
}

impl FakeUserInfo {
    pub fn answering(response: Result<serde_json::Value, UserInfoError>) -> Self {
        Self {
            response: Mutex::new(response),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserInfoClient for FakeUserInfo {
    async fn fetch(&self, _endpoint: &Endpoint) -> Result<serde_json::Value, UserInfoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().clone()
    }
}
