use crate::{
    api,
    auth::{password::CredentialHasher, AuthConfig, AuthService, SystemClock},
    cli::commands::session::SecretSource,
    store::{postgres::PgStore, Store},
};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use session_token::HmacKey;
use std::{fs, path::Path, sync::Arc};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub db_max_connections: u32,
    pub session_secret: SecretSource,
    pub session_issuer: String,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub password_parallelism: u32,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the signing key is unusable, the database is unreachable,
/// the schema cannot be created, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let secret = load_session_secret(args.session_secret)?;
    let signing_key = HmacKey::new(secret.expose_secret().as_bytes().to_vec())
        .context("Invalid session secret")?;

    let hasher = CredentialHasher::with_cost(
        args.password_memory_kib,
        args.password_iterations,
        args.password_parallelism,
    )
    .context("Invalid password hashing parameters")?;

    let auth_config = AuthConfig::new(signing_key)
        .with_issuer(args.session_issuer)
        .with_hasher(hasher);

    debug!("Auth config: {:?}", auth_config);

    let store = Arc::new(PgStore::connect(&args.dsn, args.db_max_connections).await?);
    store
        .migrate()
        .await
        .context("Failed to create database schema")?;

    info!("Database schema ready");

    let auth = Arc::new(
        AuthService::new(store.clone(), &auth_config, Arc::new(SystemClock))
            .context("Failed to initialize password verification")?,
    );

    api::new(args.port, auth, store as Arc<dyn Store>).await
}

/// Resolve the session secret, reading it from disk when given as a file.
///
/// Trailing newlines in the file are ignored; an empty secret is an error.
fn load_session_secret(source: SecretSource) -> Result<SecretString> {
    let secret = match source {
        SecretSource::Inline(secret) => secret,
        SecretSource::File(path) => read_secret_file(&path)?,
    };

    if secret.expose_secret().is_empty() {
        return Err(anyhow!("Session secret is empty"));
    }

    Ok(secret)
}

fn read_secret_file(path: &Path) -> Result<SecretString> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session secret file: {}", path.display()))?;
    Ok(SecretString::from(
        contents.trim_end_matches(['\r', '\n']).to_string(),
    ))
}
