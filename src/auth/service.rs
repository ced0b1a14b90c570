use super::{
    password::{self, CredentialHasher},
    session::{Clock, Identity, SessionVerifier},
    AuthConfig, AuthError,
};
use crate::store::{NewUser, StoreError, UserStore};
use session_token::{sign_hs256, HmacKey, Rejection, SessionClaims};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: CredentialHasher,
    key: Arc<HmacKey>,
    issuer: String,
    clock: Arc<dyn Clock>,
    verifier: SessionVerifier,
    // Verified against on unknown emails so both login failures cost one Argon2 run.
    dummy_hash: Arc<str>,
}

impl AuthService {
    /// # Errors
    /// Returns [`password::Error`] if the configured hasher cannot produce a hash.
    pub fn new(
        users: Arc<dyn UserStore>,
        config: &AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, password::Error> {
        let key = config.signing_key();
        let hasher = config.hasher().clone();
        let dummy_hash = hasher.hash("bouquet-unknown-account")?;
        Ok(Self {
            users,
            hasher,
            verifier: SessionVerifier::new(key.clone(), clock.clone()),
            key,
            issuer: config.issuer().to_string(),
            clock,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Register a new account and return its id.
    ///
    /// # Errors
    /// - [`AuthError::DuplicateEmail`] if the email is taken, including when a
    ///   concurrent signup commits first.
    /// - [`AuthError::StoreUnavailable`] if the store cannot be read or written.
    /// - [`AuthError::Credential`] if hashing fails.
    #[instrument(skip(self, name, email, password))]
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<i64, AuthError> {
        if self
            .users
            .find_user_by_email(email)
            .await
            .map_err(AuthError::StoreUnavailable)?
            .is_some()
        {
            debug!("signup rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash_blocking(password.to_string()).await?;

        let new_user = NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        };

        match self.users.insert_user(&new_user).await {
            Ok(id) => {
                info!(user_id = id, "user created");
                Ok(id)
            }
            Err(StoreError::Conflict) => {
                debug!("signup lost race on unique email");
                Err(AuthError::DuplicateEmail)
            }
            Err(err) => Err(AuthError::StoreUnavailable(err)),
        }
    }

    /// Check credentials and mint a session token.
    ///
    /// # Errors
    /// - [`AuthError::InvalidCredentials`] for an unknown email or a wrong password.
    /// - [`AuthError::Credential`] if the stored hash is unusable.
    /// - [`AuthError::StoreUnavailable`] or [`AuthError::TokenMint`] on server faults.
    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let Some(user) = self
            .users
            .find_user_by_email(email)
            .await
            .map_err(AuthError::StoreUnavailable)?
        else {
            let _ = self
                .hasher
                .verify_blocking(password.to_string(), self.dummy_hash.to_string())
                .await;
            debug!("login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .hasher
            .verify_blocking(password.to_string(), user.password_hash)
            .await
            .inspect_err(|err| error!(user_id = user.id, "stored password hash unusable: {err}"))?;

        if !matches {
            debug!(user_id = user.id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = SessionClaims::new(
            user.id,
            user.email,
            self.issuer.clone(),
            self.clock.now_unix_seconds(),
        );
        let token = sign_hs256(&self.key, &claims).map_err(AuthError::TokenMint)?;

        info!(user_id = user.id, "login succeeded");
        Ok(token)
    }

    /// Resolve a presented session token to the identity it asserts.
    ///
    /// # Errors
    /// Returns the [`Rejection`] category; the detailed reason is only logged.
    pub fn validate_session(&self, token: &str) -> Result<Identity, Rejection> {
        self.verifier.validate(token).map_err(|err| {
            debug!("session token rejected: {err}");
            err.rejection().unwrap_or(Rejection::BadSignature)
        })
    }
}
