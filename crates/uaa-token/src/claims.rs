//! UAA access token claims
//!
//! The same claim set is returned by local verification (the JWT payload) and by
//! remote verification (the `/check_token` response body).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Claims carried by a UAA access token
///
/// Registered claims (RFC 7519) and the UAA specific ones are typed; anything else is
/// kept verbatim in `additional`.
///
/// Typed fields are filled leniently: numbers in strings, fractional timestamps and
/// `"true"`/`"false"` are coerced. A value that still does not fit its field is moved
/// to `additional` under its own name, so no claim is ever dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Claims {
    /// JWT ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Subject (user or client id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issuer, e.g. `https://uaa.example.com/oauth/token`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aud: Vec<String>,

    /// Granted scopes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,

    /// OAuth client that obtained the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Identity provider origin (`uaa`, `ldap`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Identity zone id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zid: Option<String>,

    /// Revocation signature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev_sig: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<i64>,

    /// Issued at (seconds since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration (seconds since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Not before (seconds since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Claims not modelled above
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Claims {
    /// Whether `scope` grants the given scope
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// True unless `exp` is present and strictly after `now`
    ///
    /// A claim set without `exp` counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) => exp.saturating_mul(1000) <= now.timestamp_millis(),
            None => true,
        }
    }

    /// Look up a claim that is not modelled as a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.additional.get(name)
    }
}

/// The only claim read from an unverified token
///
/// Never use this for an authorization decision; it only selects the issuer whose
/// key is used for the trusted verification.
#[derive(Debug, Clone, Deserialize)]
pub struct UnverifiedClaims {
    /// Claimed issuer
    #[serde(default)]
    pub iss: Option<String>,
}

impl From<Map<String, Value>> for Claims {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            jti: take(&mut map, "jti"),
            sub: take(&mut map, "sub"),
            iss: take(&mut map, "iss"),
            aud: take_list(&mut map, "aud"),
            scope: take_list(&mut map, "scope"),
            client_id: take(&mut map, "client_id"),
            cid: take(&mut map, "cid"),
            azp: take(&mut map, "azp"),
            grant_type: take(&mut map, "grant_type"),
            user_id: take(&mut map, "user_id"),
            user_name: take(&mut map, "user_name"),
            email: take(&mut map, "email"),
            origin: take(&mut map, "origin"),
            zid: take(&mut map, "zid"),
            rev_sig: take(&mut map, "rev_sig"),
            revocable: take(&mut map, "revocable"),
            auth_time: take(&mut map, "auth_time"),
            iat: take(&mut map, "iat"),
            exp: take(&mut map, "exp"),
            nbf: take(&mut map, "nbf"),
            additional: map.into_iter().collect(),
        }
    }
}

/// Conversion of a JSON claim value into a typed field
trait Coerce: Sized {
    fn coerce(value: &Value) -> Option<Self>;
}

impl Coerce for String {
    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl Coerce for i64 {
    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
            Value::String(s) => {
                let s = s.trim();
                s.parse().ok().or_else(|| s.parse().ok().and_then(truncate))
            }
            _ => None,
        }
    }
}

impl Coerce for bool {
    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

fn truncate(f: f64) -> Option<i64> {
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f.trunc() as i64)
}

/// Remove `name` from `map` when it fits `T`; a misfit stays in `map`
fn take<T: Coerce>(map: &mut Map<String, Value>, name: &str) -> Option<T> {
    let value = map.remove(name)?;
    if value.is_null() {
        return None;
    }
    let typed = T::coerce(&value);
    if typed.is_none() {
        map.insert(name.to_string(), value);
    }
    typed
}

/// Accepts `"a b"`, `"a"` or `["a", "b"]`
fn take_list(map: &mut Map<String, Value>, name: &str) -> Vec<String> {
    let Some(value) = map.remove(name) else {
        return Vec::new();
    };
    let list = match &value {
        Value::Null => Some(Vec::new()),
        Value::String(s) => Some(s.split_whitespace().map(str::to_owned).collect()),
        Value::Array(items) => items.iter().map(String::coerce).collect(),
        _ => None,
    };
    list.unwrap_or_else(|| {
        map.insert(name.to_string(), value);
        Vec::new()
    })
}
