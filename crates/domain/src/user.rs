//! User profile assembly.

use serde_json::{Map, Value};

/// A user profile: a JSON object keyed by source.
pub type UserProfile = Map<String, Value>;

/// Minimal profile built from the provider's identity alone.
///
/// The identity is nested under `scheme_name` so profiles merged from
/// several sources keep the provider's view apart.
#[must_use]
pub fn provider_profile(scheme_name: &str, username: &str) -> UserProfile {
    let mut identity = Map::new();
    identity.insert("username".to_string(), Value::String(username.to_string()));

    let mut profile = Map::new();
    profile.insert(scheme_name.to_string(), Value::Object(identity));
    profile
}

/// Picks the value at a dotted `property` path of `response`.
///
/// `None` or an empty path selects the whole response.
#[must_use]
pub fn response_property<'a>(response: &'a Value, property: Option<&str>) -> Option<&'a Value> {
    let Some(path) = property.filter(|path| !path.is_empty()) else {
        return Some(response);
    };

    path.split('.')
        .try_fold(response, |value, segment| value.get(segment))
}

/// Merges the object fields of `extra` over `base`.
///
/// Non-object values carry no fields and leave `base` unchanged.
#[must_use]
pub fn merge_profile(mut base: UserProfile, extra: Option<&Value>) -> UserProfile {
    if let Some(Value::Object(fields)) = extra {
        for (key, value) in fields {
            base.insert(key.clone(), value.clone());
        }
    }
    base
}
