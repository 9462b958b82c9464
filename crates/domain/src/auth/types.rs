//! Credential state types shared by the token lifecycle and the scheme controller.

use serde::{Deserialize, Serialize};

/// A primitive value kept in the universal store.
///
/// The store only ever holds strings, numbers or `false`. Cookie-like media
/// round-trip everything as text, so readers must accept numbers encoded as
/// strings too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// A boolean flag; `false` marks a cleared entry.
    Flag(bool),
    /// An integer, typically epoch milliseconds.
    Millis(i64),
    /// Free-form text.
    Text(String),
}

impl StoredValue {
    /// The cleared marker.
    pub const FALSE: Self = Self::Flag(false);

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns true if the value is falsy (`false`, `0` or an empty string).
    #[must_use]
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Flag(flag) => !flag,
            Self::Millis(value) => *value == 0,
            Self::Text(text) => text.is_empty(),
        }
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Absolute expiry of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiration {
    /// Expires at the given epoch milliseconds.
    At(i64),
    /// No expiry is tracked.
    #[default]
    Cleared,
}

impl Expiration {
    /// Builds an expiration from epoch milliseconds, mapping `0` to [`Expiration::Cleared`].
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        if millis == 0 {
            Self::Cleared
        } else {
            Self::At(millis)
        }
    }

    /// Interprets a stored value as an expiration.
    #[must_use]
    pub fn from_stored(value: Option<&StoredValue>) -> Self {
        match value {
            Some(StoredValue::Millis(millis)) => Self::from_millis(*millis),
            Some(StoredValue::Text(text)) => text
                .trim()
                .parse::<i64>()
                .map_or(Self::Cleared, Self::from_millis),
            Some(StoredValue::Flag(_)) | None => Self::Cleared,
        }
    }

    /// Converts into the value persisted in the store.
    #[must_use]
    pub const fn to_stored(self) -> StoredValue {
        match self {
            Self::At(millis) => StoredValue::Millis(millis),
            Self::Cleared => StoredValue::FALSE,
        }
    }

    /// Epoch milliseconds, or `None` if cleared.
    #[must_use]
    pub const fn millis(self) -> Option<i64> {
        match self {
            Self::At(millis) => Some(millis),
            Self::Cleared => None,
        }
    }
}

/// Validity of a credential at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// The expiration lies strictly in the future.
    Valid,
    /// The expiration is at or before the reference time.
    Expired,
    /// Either the value or the expiration is missing.
    Unknown,
}

impl TokenStatus {
    /// Derives the status of a credential value against `now_millis`.
    #[must_use]
    pub fn evaluate(value: Option<&str>, expiration: Expiration, now_millis: i64) -> Self {
        if value.is_none_or(str::is_empty) {
            return Self::Unknown;
        }

        match expiration {
            Expiration::Cleared => Self::Unknown,
            Expiration::At(expires_at) if expires_at <= now_millis => Self::Expired,
            Expiration::At(_) => Self::Valid,
        }
    }

    /// Returns true for [`TokenStatus::Valid`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns true for [`TokenStatus::Expired`].
    #[must_use]
    pub const fn is_expired(self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Returns true for [`TokenStatus::Unknown`].
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Composite validity reported by the scheme controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// Whether the session can be used as-is.
    pub valid: bool,
    /// The access credential has expired.
    pub token_expired: bool,
    /// The refresh credential has expired.
    pub refresh_token_expired: bool,
    /// Whether the scheme supports refreshing.
    pub is_refreshable: bool,
}

impl CheckResult {
    /// An invalid result with no expiry flags set.
    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            valid: false,
            token_expired: false,
            refresh_token_expired: false,
            is_refreshable: true,
        }
    }

    /// A valid result.
    #[must_use]
    pub const fn valid() -> Self {
        Self {
            valid: true,
            ..Self::invalid()
        }
    }

    /// Invalid because the access credential expired.
    #[must_use]
    pub const fn token_expired() -> Self {
        Self {
            token_expired: true,
            ..Self::invalid()
        }
    }

    /// Invalid because the refresh credential expired.
    #[must_use]
    pub const fn refresh_token_expired() -> Self {
        Self {
            refresh_token_expired: true,
            ..Self::invalid()
        }
    }
}

/// Username and password handed to the provider's sign-in.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginCredentials {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl LoginCredentials {
    /// Creates a new set of login credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
