//! Session token validation for protected routes.

use serde::Serialize;
use session_token::{verify_hs256, HmacKey};
#[cfg(test)]
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use utoipa::ToSchema;

/// Source of "now" for token minting and expiry checks.
pub trait Clock: Send + Sync {
    fn now_unix_seconds(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_seconds(&self) -> i64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Manually driven clock for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

#[cfg(test)]
impl FixedClock {
    #[must_use]
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now_unix_seconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Who a valid session token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Identity {
    pub id: i64,
    pub email: String,
}

#[derive(Clone)]
pub struct SessionVerifier {
    key: Arc<HmacKey>,
    clock: Arc<dyn Clock>,
}

impl SessionVerifier {
    #[must_use]
    pub fn new(key: Arc<HmacKey>, clock: Arc<dyn Clock>) -> Self {
        Self { key, clock }
    }

    /// # Errors
    /// Returns the codec error for a token that is malformed, forged or expired.
    pub fn validate(&self, token: &str) -> Result<Identity, session_token::Error> {
        let claims = verify_hs256(token, &self.key, self.clock.now_unix_seconds())?;
        Ok(Identity {
            id: claims.id,
            email: claims.email,
        })
    }
}
