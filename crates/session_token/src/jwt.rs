use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of a session token: 24 hours.
pub const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

const ALG_HS256: &str = "HS256";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTokenHeader {
    pub alg: String,
    pub typ: String,
}

impl SessionTokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALG_HS256.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Identity assertion carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject user id.
    pub id: i64,
    /// Subject email, as stored.
    pub email: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    /// Claims for `id`/`email` issued at `now_unix_seconds`, valid for [`SESSION_TTL_SECONDS`].
    #[must_use]
    pub fn new(
        id: i64,
        email: impl Into<String>,
        issuer: impl Into<String>,
        now_unix_seconds: i64,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            iss: issuer.into(),
            iat: now_unix_seconds,
            exp: now_unix_seconds.saturating_add(SESSION_TTL_SECONDS),
        }
    }
}

/// Why a presented token was not accepted.
///
/// Callers outside the service only ever see a generic "unauthorized"; the
/// distinction exists for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BadSignature,
    Malformed,
    Expired,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signing key")]
    InvalidKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

impl Error {
    /// Collapse the error into a [`Rejection`] reason.
    ///
    /// Returns `None` for key errors, which are configuration faults rather
    /// than properties of the presented token.
    #[must_use]
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::TokenFormat | Self::Base64 | Self::Json(_) | Self::UnsupportedAlg(_) => {
                Some(Rejection::Malformed)
            }
            Self::InvalidSignature => Some(Rejection::BadSignature),
            Self::Expired => Some(Rejection::Expired),
            Self::InvalidKey => None,
        }
    }
}

/// Symmetric signing key shared by mint and parse.
#[derive(Clone)]
pub struct HmacKey(Vec<u8>);

impl HmacKey {
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the secret is empty.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::InvalidKey);
        }
        Ok(Self(secret))
    }

    fn mac(&self) -> Result<HmacSha256, Error> {
        HmacSha256::new_from_slice(&self.0).map_err(|_| Error::InvalidKey)
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HmacKey").field(&"***").finish()
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Create an HS256 signed session token (JWT).
///
/// # Errors
///
/// Returns an error if the header/claims JSON cannot be encoded or the key is unusable.
pub fn sign_hs256(key: &HmacKey, claims: &SessionClaims) -> Result<String, Error> {
    let header_b64 = b64e_json(&SessionTokenHeader::hs256())?;
    let claims_b64 = b64e_json(claims)?;
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = key.mac()?;
    mac.update(signing_input.as_bytes());
    let signature_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature_b64}"))
}

/// Verify an HS256 session token and return its decoded claims.
///
/// The signature is checked over the raw signing input before the claims
/// segment is decoded, so no claim is read from an unauthenticated token.
///
/// # Errors
///
/// Returns an error if:
/// - the token is malformed or contains invalid base64/json,
/// - the header names an algorithm other than `HS256`,
/// - the signature does not match `key`,
/// - `exp` is not strictly after `now_unix_seconds`.
pub fn verify_hs256(
    token: &str,
    key: &HmacKey,
    now_unix_seconds: i64,
) -> Result<SessionClaims, Error> {
    let mut parts = token.split('.');
    let header_b64 = parts.next().ok_or(Error::TokenFormat)?;
    let claims_b64 = parts.next().ok_or(Error::TokenFormat)?;
    let sig_b64 = parts.next().ok_or(Error::TokenFormat)?;
    if parts.next().is_some() || header_b64.is_empty() || claims_b64.is_empty() {
        return Err(Error::TokenFormat);
    }

    let header: SessionTokenHeader = b64d_json(header_b64)?;
    if header.alg != ALG_HS256 {
        return Err(Error::UnsupportedAlg(header.alg));
    }

    let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::Base64)?;
    let mut mac = key.mac()?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(claims_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| Error::InvalidSignature)?;

    let claims: SessionClaims = b64d_json(claims_b64)?;
    if claims.exp <= now_unix_seconds {
        return Err(Error::Expired);
    }

    Ok(claims)
}
