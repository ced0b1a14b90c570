//! In-memory store used by unit and router tests.

use super::{NewUser, Product, ProductStore, Store, StoreError, User, UserStore, UserSummary};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    users: Mutex<Vec<User>>,
    products: Mutex<Vec<Product>>,
    writes: AtomicUsize,
    /// Every call fails with a database error.
    unavailable: AtomicBool,
    /// Lookups miss even when the user exists, as when a concurrent signup
    /// commits between the duplicate check and the insert.
    stale_lookups: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn set_stale_lookups(&self, stale: bool) {
        self.stale_lookups.store(stale, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        if self.stale_lookups.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let users = self.users.lock().await;
        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<i64, StoreError> {
        self.check_available()?;
        let mut users = self.users.lock().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict);
        }
        let id = i64::try_from(users.len()).unwrap_or(i64::MAX - 1) + 1;
        users.push(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
        });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        self.check_available()?;
        let users = self.users.lock().await;
        Ok(users.iter().map(UserSummary::from).collect())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.check_available()?;
        let mut products = self.products.lock().await;
        if products.iter().any(|existing| existing.id == product.id) {
            return Err(StoreError::Conflict);
        }
        products.push(product.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.check_available()?;
        Ok(self.products.lock().await.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
