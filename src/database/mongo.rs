use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

use super::{AdminStore, ScoreStore};
use crate::models::{AdminUser, IdentityKey, NewUserScore, UserScore, UserScoreDocument};
use crate::utils::{AppError, AppResult};

const USER_SCORES: &str = "user_scores";
const ADMIN_USERS: &str = "admin_users";
const DEFAULT_DB_NAME: &str = "user_scores";
const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> AppResult<Self> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(10);
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(database_name(uri));

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique indexes backing the case-insensitive identity and admin usernames
    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("🔧 Creating database indexes...");

        let identity_index = IndexModel::builder()
            .keys(doc! { "first_name_key": 1, "second_name_key": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_scores_identity".to_string())
                    .build(),
            )
            .build();
        self.user_scores().create_index(identity_index).await?;
        log::info!("   ✅ Index ready: user_scores(first_name_key, second_name_key) unique");

        let score_index = IndexModel::builder().keys(doc! { "score": -1 }).build();
        self.user_scores().create_index(score_index).await?;
        log::info!("   ✅ Index ready: user_scores(score)");

        let admin_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.admin_users().create_index(admin_index).await?;
        log::info!("   ✅ Index ready: admin_users(username) unique");

        Ok(())
    }

    fn user_scores(&self) -> Collection<UserScoreDocument> {
        self.db.collection(USER_SCORES)
    }

    fn admin_users(&self) -> Collection<AdminUser> {
        self.db.collection(ADMIN_USERS)
    }

    async fn upsert_once(
        &self,
        score: &NewUserScore,
    ) -> mongodb::error::Result<Option<UserScoreDocument>> {
        let identity = score.identity();

        self.user_scores()
            .find_one_and_update(
                identity_filter(&identity),
                doc! {
                    "$set": { "score": score.score() },
                    "$setOnInsert": {
                        "first_name": score.first_name(),
                        "second_name": score.second_name(),
                    },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
    }
}

/// Database name from the URI path, e.g. `mongodb://host:27017/scores?x=y` -> `scores`
fn database_name(uri: &str) -> &str {
    uri.split_once("://")
        .and_then(|(_, rest)| rest.split_once('/'))
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DB_NAME)
}

fn identity_filter(identity: &IdentityKey) -> mongodb::bson::Document {
    doc! {
        "first_name_key": &identity.first,
        "second_name_key": &identity.second,
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY,
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[async_trait]
impl ScoreStore for MongoDB {
    async fn upsert(&self, score: &NewUserScore) -> AppResult<UserScore> {
        let written = match self.upsert_once(score).await {
            // Two racing upserts of a new identity: the loser hits the unique index,
            // and a second attempt matches the winner's document.
            Err(e) if is_duplicate_key(&e) => {
                log::debug!("Upsert raced on identity, retrying as update");
                self.upsert_once(score).await?
            }
            other => other?,
        };

        written
            .map(UserScore::from)
            .ok_or_else(|| AppError::StoreUnavailable("Upsert returned no document".into()))
    }

    async fn find_by_identity(&self, identity: &IdentityKey) -> AppResult<Option<UserScore>> {
        let found = self.user_scores().find_one(identity_filter(identity)).await?;
        Ok(found.map(UserScore::from))
    }

    async fn list_all(&self) -> AppResult<Vec<UserScore>> {
        let cursor = self.user_scores().find(doc! {}).sort(doc! { "_id": 1 }).await?;
        let docs: Vec<UserScoreDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(UserScore::from).collect())
    }

    async fn top_scorers(&self) -> AppResult<Vec<UserScore>> {
        // One command, so a concurrent write can't empty the answer between
        // reading the maximum and reading the records holding it.
        let pipeline = vec![
            doc! { "$sort": { "_id": 1 } },
            doc! { "$group": { "_id": "$score", "records": { "$push": "$$ROOT" } } },
            doc! { "$sort": { "_id": -1 } },
            doc! { "$limit": 1 },
            doc! { "$unwind": "$records" },
            doc! { "$replaceRoot": { "newRoot": "$records" } },
        ];

        let cursor = self.user_scores().aggregate(pipeline).await?;
        let docs: Vec<mongodb::bson::Document> = cursor.try_collect().await?;

        docs.into_iter()
            .map(|d| {
                mongodb::bson::from_document::<UserScoreDocument>(d)
                    .map(UserScore::from)
                    .map_err(|e| AppError::StoreUnavailable(format!("Malformed score record: {}", e)))
            })
            .collect()
    }
}

#[async_trait]
impl AdminStore for MongoDB {
    async fn find_admin(&self, username: &str) -> AppResult<Option<AdminUser>> {
        Ok(self.admin_users().find_one(doc! { "username": username }).await?)
    }

    async fn insert_admin(&self, admin: &AdminUser) -> AppResult<bool> {
        match self.admin_users().insert_one(admin).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name("mongodb://localhost:27017/scores"), "scores");
        assert_eq!(
            database_name("mongodb+srv://u:p@cluster.example.net/ranking?retryWrites=true"),
            "ranking"
        );
        assert_eq!(database_name("mongodb://localhost:27017"), DEFAULT_DB_NAME);
        assert_eq!(database_name("mongodb://localhost:27017/?w=1"), DEFAULT_DB_NAME);
    }

    async fn test_db() -> MongoDB {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/user_scores_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();
        db.user_scores().delete_many(doc! {}).await.unwrap();
        db
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_upsert_and_top_scorers() {
        let db = test_db().await;

        db.upsert(&NewUserScore::new("Jane", "Doe", 10).unwrap()).await.unwrap();
        let updated = db.upsert(&NewUserScore::new("JANE", "DOE", 15).unwrap()).await.unwrap();
        db.upsert(&NewUserScore::new("John", "Roe", 15).unwrap()).await.unwrap();
        db.upsert(&NewUserScore::new("Low", "Score", 3).unwrap()).await.unwrap();

        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.score, 15);
        assert_eq!(db.list_all().await.unwrap().len(), 3);

        let top = db.top_scorers().await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].first_name, "Jane");
        assert_eq!(top[1].first_name, "John");
        assert!(top.iter().all(|u| u.score == 15));

        assert!(db
            .find_by_identity(&IdentityKey::new("jane", "doe"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_concurrent_upserts_never_duplicate() {
        let db = test_db().await;

        let handles: Vec<_> = (0..16)
            .map(|i: i64| {
                let db = db.clone();
                let first = if i % 2 == 0 { "jane" } else { "JANE" };
                tokio::spawn(async move {
                    db.upsert(&NewUserScore::new(first, "Doe", i).unwrap()).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let all = db.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].second_name, "Doe");
        assert_eq!(db.top_scorers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_top_scorers_empty_store() {
        let db = test_db().await;
        assert!(db.top_scorers().await.unwrap().is_empty());
    }
}
