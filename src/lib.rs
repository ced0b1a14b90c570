//! # Bouquet (accounts and product catalog API)
//!
//! `bouquet` serves user signup/login and a product catalog over HTTP, backed
//! by PostgreSQL.
//!
//! ## Authentication
//!
//! Passwords are hashed with Argon2id and never stored or returned in
//! plaintext. A successful login mints an HS256 session token (see the
//! `session_token` crate) valid for 24 hours. The signing key is loaded once at
//! startup and is never rotated while the process runs.
//!
//! Failed logins never reveal whether the email or the password was wrong, and
//! rejected session tokens never reveal which check failed.
//!
//! ## Catalog
//!
//! Products use caller-supplied string ids. Tags are stored as a JSON array so
//! their order and duplicates survive a round trip.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
