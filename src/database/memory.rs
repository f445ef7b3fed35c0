use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AdminStore, ScoreStore};
use crate::models::{AdminUser, IdentityKey, NewUserScore, UserScore};
use crate::utils::AppResult;

/// Process-local store used by tests and `STORE_BACKEND=memory`.
/// Records keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    scores: RwLock<Vec<UserScore>>,
    admins: RwLock<Vec<AdminUser>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn upsert(&self, score: &NewUserScore) -> AppResult<UserScore> {
        let identity = score.identity();
        // Write lock spans lookup and insert
        let mut scores = self.scores.write().await;

        if let Some(existing) = scores.iter_mut().find(|s| identity.matches(s)) {
            existing.score = score.score();
            return Ok(existing.clone());
        }

        let created = score.clone().into_user_score();
        scores.push(created.clone());
        Ok(created)
    }

    async fn find_by_identity(&self, identity: &IdentityKey) -> AppResult<Option<UserScore>> {
        let scores = self.scores.read().await;
        Ok(scores.iter().find(|s| identity.matches(s)).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<UserScore>> {
        Ok(self.scores.read().await.clone())
    }

    async fn top_scorers(&self) -> AppResult<Vec<UserScore>> {
        let scores = self.scores.read().await;
        let Some(max) = scores.iter().map(|s| s.score).max() else {
            return Ok(Vec::new());
        };

        Ok(scores.iter().filter(|s| s.score == max).cloned().collect())
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn find_admin(&self, username: &str) -> AppResult<Option<AdminUser>> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|a| a.username == username).cloned())
    }

    async fn insert_admin(&self, admin: &AdminUser) -> AppResult<bool> {
        let mut admins = self.admins.write().await;
        if admins.iter().any(|a| a.username == admin.username) {
            return Ok(false);
        }
        admins.push(admin.clone());
        Ok(true)
    }
}
