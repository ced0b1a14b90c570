//! Persistence boundary for user and product records.
//!
//! The auth core and the HTTP handlers only see these traits; `postgres`
//! provides the production implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (duplicate email or product id).
    #[error("record already exists")]
    Conflict,
    #[error("database error")]
    Database(#[source] sqlx::Error),
    #[error("failed to encode record")]
    Encoding(#[source] serde_json::Error),
}

/// Stored user, including the password hash. Never serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Fields required to create a user; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Public view of a user for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub price: f64,
    pub discounted_price: f64,
    pub rating: f64,
    pub tags: Vec<String>,
    pub is_new: bool,
    pub is_bestseller: bool,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup; `Ok(None)` when no user has this email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a user and return the assigned id.
    ///
    /// Fails with [`StoreError::Conflict`] if the email is already taken, even
    /// when a prior lookup saw no such user.
    async fn insert_user(&self, user: &NewUser) -> Result<i64, StoreError>;

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] if the product id already exists.
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
}

#[async_trait]
pub trait Store: UserStore + ProductStore {
    /// Cheap connectivity check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}
