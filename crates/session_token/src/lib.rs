//! Signed, time-bounded session tokens.
//!
//! Tokens are compact HS256 JWTs carrying the subject id and email, an issuer
//! tag and an absolute expiry. Validity is signature plus expiry only; there is
//! no revocation list.

mod jwt;

pub use jwt::{
    Error, HmacKey, Rejection, SESSION_TTL_SECONDS, SessionClaims, SessionTokenHeader,
    sign_hs256, verify_hs256,
};
