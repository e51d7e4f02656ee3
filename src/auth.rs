use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Reserved claim carrying the principal (an email address for researchers).
pub const SUBJECT_CLAIM: &str = "sub";
/// Reserved claim carrying the expiry instant, seconds since the Unix epoch.
pub const EXPIRY_CLAIM: &str = "exp";

/// Claims asserted by a token.
///
/// A flat mapping of claim names to JSON values. `sub` and `exp` are the only
/// names the codec interprets; everything else passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(subject: impl Into<String>) -> Self {
        let subject: String = subject.into();
        let mut claims = Self::new();
        claims.insert(SUBJECT_CLAIM, subject);
        claims
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The subject, if present as a non-empty string.
    pub fn subject(&self) -> Option<&str> {
        self.get(SUBJECT_CLAIM)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The expiry as Unix seconds, if present as an integer.
    pub fn expires_at(&self) -> Option<i64> {
        self.get(EXPIRY_CLAIM).and_then(Value::as_i64)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Why a token could not be issued or accepted.
///
/// Callers branch on these: `ExpiredToken` means "ask the user to
/// authenticate again", the rest mean "reject outright".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a well-formed signed token")]
    MalformedToken,

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token expired at {expired_at}")]
    ExpiredToken {
        /// Unix seconds
        expired_at: i64,
    },

    #[error("token has no subject claim")]
    MissingSubjectClaim,

    #[error("cannot issue a token for an empty claims set")]
    EmptyClaims,

    #[error("time-to-live puts the expiry out of range")]
    InvalidTtl,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subject_ignores_non_string_and_empty_values() {
        let mut claims = Claims::new();
        assert_eq!(claims.subject(), None);

        claims.insert(SUBJECT_CLAIM, 42);
        assert_eq!(claims.subject(), None);

        claims.insert(SUBJECT_CLAIM, "");
        assert_eq!(claims.subject(), None);

        claims.insert(SUBJECT_CLAIM, "alice@example.com");
        assert_eq!(claims.subject(), Some("alice@example.com"));
    }

    #[test]
    fn claims_serialize_as_a_flat_object() {
        let mut claims = Claims::with_subject("bob@example.com");
        claims.insert("role", "reviewer");

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value, json!({"sub": "bob@example.com", "role": "reviewer"}));

        let back: Claims = serde_json::from_value(value).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn expires_at_requires_an_integer() {
        let mut claims = Claims::new();
        claims.insert(EXPIRY_CLAIM, "soon");
        assert_eq!(claims.expires_at(), None);

        claims.insert(EXPIRY_CLAIM, 1_700_000_000);
        assert_eq!(claims.expires_at(), Some(1_700_000_000));
    }
}
