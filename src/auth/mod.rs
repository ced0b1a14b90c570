//! Account signup, password login and session validation.
//!
//! [`AuthService`] is the only entry point the HTTP handlers use. It owns the
//! password hasher, the signing key and the clock, and reaches persistence only
//! through [`UserStore`](crate::store::UserStore).
//!
//! Failures are reported as [`AuthError`]. The transport turns them into fixed
//! messages so clients cannot tell an unknown email from a wrong password, or
//! one token defect from another.

pub mod password;
pub mod session;

mod service;
mod state;


pub use service::AuthService;
#[cfg(test)]
pub(crate) use session::FixedClock;
pub use session::{Clock, Identity, SessionVerifier, SystemClock};
pub use state::{AuthConfig, DEFAULT_SESSION_ISSUER};

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already in use")]
    DuplicateEmail,
    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user store unavailable")]
    StoreUnavailable(#[source] StoreError),
    #[error(transparent)]
    Credential(#[from] password::Error),
    #[error("failed to mint session token")]
    TokenMint(#[source] session_token::Error),
}
