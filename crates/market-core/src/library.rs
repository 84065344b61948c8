//! # User Libraries
//!
//! The set of products each user has purchased or been granted access to.
//! At most one library record exists per user; `grant` creates it lazily.

use crate::error::MarketError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// The products a user owns access to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLibrary {
    pub username: String,
    /// Product ids, in grant order
    pub products: Vec<Uuid>,
}

impl UserLibrary {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            products: Vec::new(),
        }
    }

    pub fn contains(&self, product_id: Uuid) -> bool {
        self.products.contains(&product_id)
    }
}

/// Storage seam for user libraries
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// The library for `username`, if one exists
    async fn library_for(&self, username: &str) -> Option<UserLibrary>;

    /// Grant `product_id` to `username`, creating the library record
    /// if needed. Granting an already-owned product is a no-op.
    async fn grant(&self, username: &str, product_id: Uuid) -> Result<(), MarketError>;
}

/// In-memory library store
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    libraries: RwLock<HashMap<String, UserLibrary>>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for MemoryLibrary {
    async fn library_for(&self, username: &str) -> Option<UserLibrary> {
        self.libraries
            .read()
            .ok()
            .and_then(|libs| libs.get(username).cloned())
    }

    async fn grant(&self, username: &str, product_id: Uuid) -> Result<(), MarketError> {
        let mut libraries = self
            .libraries
            .write()
            .map_err(|_| MarketError::Internal("library lock poisoned".into()))?;

        let library = libraries
            .entry(username.to_string())
            .or_insert_with(|| UserLibrary::new(username));

        if !library.contains(product_id) {
            library.products.push(product_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_library_is_none() {
        let store = MemoryLibrary::new();
        assert!(store.library_for("nobody").await.is_none());
    }

    #[tokio::test]
    async fn test_grant_creates_library_lazily() {
        let store = MemoryLibrary::new();
        let product_id = Uuid::new_v4();

        store.grant("ada", product_id).await.unwrap();

        let library = store.library_for("ada").await.unwrap();
        assert_eq!(library.username, "ada");
        assert!(library.contains(product_id));
    }

    #[tokio::test]
    async fn test_repeat_grant_is_idempotent() {
        let store = MemoryLibrary::new();
        let product_id = Uuid::new_v4();

        store.grant("ada", product_id).await.unwrap();
        store.grant("ada", product_id).await.unwrap();

        let library = store.library_for("ada").await.unwrap();
        assert_eq!(library.products.len(), 1);
    }

    #[tokio::test]
    async fn test_one_library_per_user() {
        let store = MemoryLibrary::new();
        store.grant("ada", Uuid::new_v4()).await.unwrap();
        store.grant("ada", Uuid::new_v4()).await.unwrap();

        let library = store.library_for("ada").await.unwrap();
        assert_eq!(library.products.len(), 2);
        assert!(store.library_for("grace").await.is_none());
    }
}
