//! Map validated command-line arguments to an action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{password, session, ARG_DB_MAX_CONNECTIONS, ARG_DSN, ARG_PORT};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let db_max_connections = matches
        .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
        .copied()
        .unwrap_or(5);

    let session_opts = session::Options::parse(matches)?;
    let password_opts = password::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        db_max_connections,
        session_secret: session_opts.secret,
        session_issuer: session_opts.issuer,
        password_memory_kib: password_opts.memory_kib,
        password_iterations: password_opts.iterations,
        password_parallelism: password_opts.parallelism,
    }))
}
