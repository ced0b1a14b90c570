use crate::auth::DEFAULT_SESSION_ISSUER;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::path::PathBuf;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_SECRET_FILE: &str = "session-secret-file";
pub const ARG_SESSION_ISSUER: &str = "session-issuer";

/// Where the session signing key comes from.
#[derive(Debug)]
pub enum SecretSource {
    Inline(SecretString),
    File(PathBuf),
}

#[derive(Debug)]
pub struct Options {
    pub secret: SecretSource,
    pub issuer: String,
}

impl Options {
    /// Parse session arguments from matches.
    ///
    /// # Errors
    /// Returns an error if neither a secret nor a secret file is provided.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Helper to filter empty strings which clap might pass through if env vars are set to ""
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let secret = match (
            get_non_empty(ARG_SESSION_SECRET),
            get_non_empty(ARG_SESSION_SECRET_FILE),
        ) {
            (Some(secret), _) => SecretSource::Inline(SecretString::from(secret)),
            (None, Some(path)) => SecretSource::File(PathBuf::from(path)),
            (None, None) => anyhow::bail!(
                "missing required argument: --{ARG_SESSION_SECRET} or --{ARG_SESSION_SECRET_FILE}"
            ),
        };

        Ok(Self {
            secret,
            issuer: get_non_empty(ARG_SESSION_ISSUER)
                .unwrap_or_else(|| DEFAULT_SESSION_ISSUER.to_string()),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session tokens")
                .long_help(
                    "Secret used to sign session tokens (HS256).\n\nLoaded once at startup; changing it invalidates every issued token. Prefer --session-secret-file outside development.",
                )
                .env("BOUQUET_SESSION_SECRET")
                .hide_env_values(true)
                .conflicts_with(ARG_SESSION_SECRET_FILE),
        )
        .arg(
            Arg::new(ARG_SESSION_SECRET_FILE)
                .long(ARG_SESSION_SECRET_FILE)
                .help("Path to a file containing the session token secret")
                .env("BOUQUET_SESSION_SECRET_FILE"),
        )
        .arg(
            Arg::new(ARG_SESSION_ISSUER)
                .long(ARG_SESSION_ISSUER)
                .help("Issuer (iss) written into session tokens")
                .env("BOUQUET_SESSION_ISSUER")
                .default_value(DEFAULT_SESSION_ISSUER),
        )
}
