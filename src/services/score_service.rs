use crate::database::ScoreStore;
use crate::models::{IdentityKey, NewUserScore, UserScore};
use crate::utils::{AppError, AppResult};

pub async fn list_all(store: &dyn ScoreStore) -> AppResult<Vec<UserScore>> {
    store.list_all().await
}

pub async fn find_user_score(
    store: &dyn ScoreStore,
    first_name: &str,
    second_name: &str,
) -> AppResult<UserScore> {
    store
        .find_by_identity(&IdentityKey::new(first_name, second_name))
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No score found for first_name: {}, second_name: {}",
                first_name, second_name
            ))
        })
}

pub async fn top_scorers(store: &dyn ScoreStore) -> AppResult<Vec<UserScore>> {
    store.top_scorers().await
}

pub async fn create_or_update(store: &dyn ScoreStore, score: NewUserScore) -> AppResult<UserScore> {
    let saved = store.upsert(&score).await?;
    log::debug!(
        "💾 Saved score {} for {} {}",
        saved.score,
        saved.first_name,
        saved.second_name
    );
    Ok(saved)
}
