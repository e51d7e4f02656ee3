use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};

use crate::auth::{Claims, TokenError, EXPIRY_CLAIM};

/// Lifetime of a token when the caller does not ask for one.
pub const DEFAULT_TTL: Duration = Duration::minutes(15);

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies HS256 tokens under one symmetric secret.
///
/// Immutable after construction, so a single instance is shared by every
/// worker.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign `claims` with an expiry of `ttl` (default 15 minutes) from now.
    pub fn issue(&self, claims: &Claims, ttl: Option<Duration>) -> Result<String, TokenError> {
        self.issue_at(claims, ttl, OffsetDateTime::now_utc())
    }

    /// Same as [`issue`](Self::issue) against an explicit clock.
    ///
    /// The caller's claims are copied; any `exp` they carry is replaced.
    pub fn issue_at(
        &self,
        claims: &Claims,
        ttl: Option<Duration>,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        if claims.is_empty() {
            return Err(TokenError::EmptyClaims);
        }

        let expires_at = now
            .checked_add(ttl.unwrap_or(DEFAULT_TTL))
            .ok_or(TokenError::InvalidTtl)?;

        let mut payload = claims.clone();
        payload.insert(EXPIRY_CLAIM, expires_at.unix_timestamp());

        encode(&Header::new(ALGORITHM), &payload, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Check the signature, then the expiry against `now`.
    ///
    /// A token stays valid through the second named by its `exp` claim.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, TokenError> {
        // Expiry is checked below against the supplied clock rather than
        // the library's wall clock.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::MalformedToken,
            })?;

        let expired_at = claims.expires_at().ok_or(TokenError::MalformedToken)?;
        if now.unix_timestamp() > expired_at {
            return Err(TokenError::ExpiredToken { expired_at });
        }

        Ok(claims)
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.extract_subject_at(token, OffsetDateTime::now_utc())
    }

    pub fn extract_subject_at(&self, token: &str, now: OffsetDateTime) -> Result<String, TokenError> {
        let claims = self.verify_at(token, now)?;
        claims
            .subject()
            .map(str::to_owned)
            .ok_or(TokenError::MissingSubjectClaim)
    }
}
