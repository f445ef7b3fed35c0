use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::AppError;

/// A user's best-known score as exposed over the API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, utoipa::ToSchema)]
pub struct UserScore {
    pub first_name: String,
    pub second_name: String,
    pub score: i64,
}

/// Case-insensitive identity of a user: the normalized (first, second) name pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub first: String,
    pub second: String,
}

impl IdentityKey {
    pub fn new(first_name: &str, second_name: &str) -> Self {
        Self {
            first: normalize(first_name),
            second: normalize(second_name),
        }
    }

    pub fn of(score: &UserScore) -> Self {
        Self::new(&score.first_name, &score.second_name)
    }

    pub fn matches(&self, score: &UserScore) -> bool {
        *self == Self::of(score)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Body of `POST /user_scores/`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UserScoreRequest {
    pub first_name: String,
    pub second_name: String,
    pub score: i64,
}

/// Query of `GET /user_scores/`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserScoreQuery {
    pub first_name: String,
    pub second_name: String,
}

/// A validated score submission, ready for the upsert rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserScore {
    first_name: String,
    second_name: String,
    score: i64,
}

impl NewUserScore {
    /// Trims both names and rejects blank ones.
    pub fn new(first_name: &str, second_name: &str, score: i64) -> Result<Self, AppError> {
        let first_name = first_name.trim();
        let second_name = second_name.trim();

        if first_name.is_empty() {
            return Err(AppError::Validation("first_name must not be blank".into()));
        }
        if second_name.is_empty() {
            return Err(AppError::Validation("second_name must not be blank".into()));
        }

        Ok(Self {
            first_name: first_name.to_string(),
            second_name: second_name.to_string(),
            score,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn second_name(&self) -> &str {
        &self.second_name
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn set_score(&mut self, score: i64) {
        self.score = score;
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(&self.first_name, &self.second_name)
    }

    pub fn into_user_score(self) -> UserScore {
        UserScore {
            first_name: self.first_name,
            second_name: self.second_name,
            score: self.score,
        }
    }
}

impl TryFrom<UserScoreRequest> for NewUserScore {
    type Error = AppError;

    fn try_from(request: UserScoreRequest) -> Result<Self, Self::Error> {
        NewUserScore::new(&request.first_name, &request.second_name, request.score)
    }
}

/// Stored shape of a user score (collection: user_scores)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserScoreDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub second_name: String,
    pub first_name_key: String,
    pub second_name_key: String,
    pub score: i64,
}

impl From<UserScoreDocument> for UserScore {
    fn from(doc: UserScoreDocument) -> Self {
        UserScore {
            first_name: doc.first_name,
            second_name: doc.second_name,
            score: doc.score,
        }
    }
}
