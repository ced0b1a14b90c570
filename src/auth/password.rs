//! Password hashing and verification.
//!
//! Hashes are Argon2id PHC strings with a fresh random salt per call, so two
//! hashes of the same password differ while both verify.

use argon2::{
    password_hash::{self, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};
use rand::rngs::OsRng;
#[cfg(test)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid password hashing cost: {0}")]
    InvalidCost(argon2::Error),
    #[error("failed to hash password")]
    Hashing(#[source] password_hash::Error),
    /// The stored hash was not produced by this hasher (corrupted storage).
    #[error("malformed password hash")]
    MalformedHash(#[source] password_hash::Error),
    #[error("password hashing task failed")]
    Task(#[from] tokio::task::JoinError),
}

/// Argon2id hasher with a fixed cost.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    #[cfg(test)]
    verify_calls: Arc<AtomicUsize>,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::from_params(Params::default())
    }
}

impl CredentialHasher {
    /// Build a hasher from Argon2 cost parameters.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCost`] if argon2 rejects the combination
    /// (e.g. memory below `8 * parallelism` KiB).
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, Error> {
        let params =
            Params::new(memory_kib, iterations, parallelism, None).map_err(Error::InvalidCost)?;
        Ok(Self::from_params(params))
    }

    fn from_params(params: Params) -> Self {
        Self {
            params,
            #[cfg(test)]
            verify_calls: Arc::default(),
        }
    }

    /// Number of [`Self::verify`] calls made through this hasher and its clones.
    #[cfg(test)]
    pub(crate) fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// # Errors
    /// Returns [`Error::Hashing`] if the hash computation fails.
    pub fn hash(&self, password: &str) -> Result<String, Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(Error::Hashing)?
            .to_string();
        Ok(hash)
    }

    /// Check `password` against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only a hash this hasher cannot interpret is
    /// an error. The cost parameters are read from the stored hash.
    ///
    /// # Errors
    /// Returns [`Error::MalformedHash`] if `hash` is not a usable Argon2 PHC string.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, Error> {
        #[cfg(test)]
        self.verify_calls.fetch_add(1, Ordering::SeqCst);

        let parsed = PasswordHash::new(hash).map_err(Error::MalformedHash)?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(Error::MalformedHash(err)),
        }
    }

    /// [`Self::hash`] on the blocking pool; Argon2 is CPU bound.
    ///
    /// # Errors
    /// Same as [`Self::hash`], plus [`Error::Task`] if the worker panics.
    pub async fn hash_blocking(&self, password: String) -> Result<String, Error> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    /// [`Self::verify`] on the blocking pool.
    ///
    /// # Errors
    /// Same as [`Self::verify`], plus [`Error::Task`] if the worker panics.
    pub async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, Error> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?
    }
}
