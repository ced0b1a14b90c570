//! `sqlx`/PostgreSQL implementation of the store traits.

use super::{NewUser, Product, ProductStore, Store, StoreError, User, UserStore, UserSummary};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Connection, PgPool, Row};
use std::time::Duration;
use tracing::{info_span, warn, Instrument, Span};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database.
    ///
    /// # Errors
    /// Returns an error if the pool cannot establish its first connection.
    pub async fn connect(dsn: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Create the `users` and `products` tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> Result<()> {
        for (index, statement) in split_sql_statements(SCHEMA_SQL).into_iter().enumerate() {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
        }

        Ok(())
    }
}

fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .collect()
}

fn query_span(operation: &'static str, statement: &'static str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

/// SQLSTATE 23505 is `unique_violation`.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict
    } else {
        StoreError::Database(err)
    }
}

pub(crate) fn encode_tags(tags: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(tags).map_err(StoreError::Encoding)
}

/// Decode a stored tags column; anything that is not a JSON string array
/// reads back as no tags.
pub(crate) fn decode_tags(product_id: &str, raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!(product_id, "failed to decode product tags: {err}");
        Vec::new()
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = "SELECT id, name, email, password FROM users WHERE email = $1";
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .map_err(StoreError::Database)?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password_hash: row.get("password"),
        }))
    }

    async fn insert_user(&self, user: &NewUser) -> Result<i64, StoreError> {
        let query = "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id";
        let row = sqlx::query(query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(map_write_error)?;

        Ok(row.get("id"))
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        let query = "SELECT id, name, email FROM users ORDER BY id";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .map_err(StoreError::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| UserSummary {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
            })
            .collect())
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO products
                (id, name, description, image, price, discounted_price, rating, tags, is_new, is_bestseller)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ";
        let tags = encode_tags(&product.tags)?;
        sqlx::query(query)
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.image)
            .bind(product.price)
            .bind(product.discounted_price)
            .bind(product.rating)
            .bind(tags)
            .bind(product.is_new)
            .bind(product.is_bestseller)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(map_write_error)?;

        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let query = r"
            SELECT id, name, description, image, price, discounted_price, rating, tags, is_new, is_bestseller
            FROM products
            ORDER BY id
        ";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .map_err(StoreError::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id: String = row.get("id");
                let raw_tags: String = row.get("tags");
                let tags = decode_tags(&id, &raw_tags);
                Product {
                    id,
                    name: row.get("name"),
                    description: row.get("description"),
                    image: row.get("image"),
                    price: row.get("price"),
                    discounted_price: row.get("discounted_price"),
                    rating: row.get("rating"),
                    tags,
                    is_new: row.get("is_new"),
                    is_bestseller: row.get("is_bestseller"),
                }
            })
            .collect())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .map_err(StoreError::Database)?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .map_err(StoreError::Database)
    }
}
