//! Auth configuration.

use super::password::CredentialHasher;
use session_token::HmacKey;
use std::sync::Arc;

pub const DEFAULT_SESSION_ISSUER: &str = "bouquet";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    signing_key: Arc<HmacKey>,
    issuer: String,
    hasher: CredentialHasher,
}

impl AuthConfig {
    #[must_use]
    pub fn new(signing_key: HmacKey) -> Self {
        Self {
            signing_key: Arc::new(signing_key),
            issuer: DEFAULT_SESSION_ISSUER.to_string(),
            hasher: CredentialHasher::default(),
        }
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.issuer = issuer;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = hasher;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub(super) fn signing_key(&self) -> Arc<HmacKey> {
        self.signing_key.clone()
    }

    pub(super) fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }
}
