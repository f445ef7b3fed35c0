pub mod memory;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StoreBackend};
use crate::models::{AdminUser, IdentityKey, NewUserScore, UserScore};
use crate::utils::AppResult;

pub use memory::MemoryStore;
pub use mongo::MongoDB;

/// Data access for user scores, shared by the HTTP service and the importer.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Creates the user if no record matches the identity case-insensitively,
    /// otherwise overwrites the stored score in place and keeps the stored casing.
    /// Returns the record as it is after the write.
    async fn upsert(&self, score: &NewUserScore) -> AppResult<UserScore>;

    async fn find_by_identity(&self, identity: &IdentityKey) -> AppResult<Option<UserScore>>;

    async fn list_all(&self) -> AppResult<Vec<UserScore>>;

    /// All records tied at the current maximum score. Empty when the store is empty.
    async fn top_scorers(&self) -> AppResult<Vec<UserScore>>;
}

/// Accounts for the optional token authentication.
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_admin(&self, username: &str) -> AppResult<Option<AdminUser>>;

    /// Inserts the account unless the username is already taken.
    /// Returns `false` when it already existed.
    async fn insert_admin(&self, admin: &AdminUser) -> AppResult<bool>;
}

/// Handles to the configured backend.
#[derive(Clone)]
pub struct Stores {
    pub scores: Arc<dyn ScoreStore>,
    pub admins: Arc<dyn AdminStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            scores: store.clone(),
            admins: store,
        }
    }
}

pub async fn connect(config: &Config) -> AppResult<Stores> {
    match config.store_backend {
        StoreBackend::MongoDB => {
            let db = Arc::new(MongoDB::new(&config.database_url).await?);
            Ok(Stores {
                scores: db.clone(),
                admins: db,
            })
        }
        StoreBackend::Memory => {
            log::warn!("⚠️  Using in-memory store, data is lost on exit");
            Ok(Stores::in_memory())
        }
    }
}
