use actix_web::{web, HttpResponse};

use crate::database::ScoreStore;
use crate::models::{NewUserScore, UserScore, UserScoreQuery, UserScoreRequest};
use crate::services::score_service;
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/",
    tag = "Scores",
    responses(
        (status = 200, description = "Every stored user score", body = Vec<UserScore>)
    )
)]
pub async fn show_all(store: web::Data<dyn ScoreStore>) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET / - list all scores");

    let scores = score_service::list_all(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(scores))
}

#[utoipa::path(
    get,
    path = "/user_scores/",
    tag = "Scores",
    params(UserScoreQuery),
    responses(
        (status = 200, description = "Score of the matching user (names are case-insensitive)", body = UserScore),
        (status = 404, description = "No user with these names"),
        (status = 422, description = "Missing query parameter")
    )
)]
pub async fn get_score_for_user(
    store: web::Data<dyn ScoreStore>,
    query: web::Query<UserScoreQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "🔎 GET /user_scores/ - {} {}",
        query.first_name,
        query.second_name
    );

    let score =
        score_service::find_user_score(store.get_ref(), &query.first_name, &query.second_name)
            .await?;
    Ok(HttpResponse::Ok().json(score))
}

#[utoipa::path(
    post,
    path = "/user_scores/",
    tag = "Scores",
    request_body = UserScoreRequest,
    responses(
        (status = 200, description = "Created or updated score", body = UserScore),
        (status = 422, description = "Invalid body")
    )
)]
pub async fn post_user_score(
    store: web::Data<dyn ScoreStore>,
    body: web::Json<UserScoreRequest>,
) -> Result<HttpResponse, AppError> {
    let new_score = NewUserScore::try_from(body.into_inner())?;
    log::info!(
        "✏️  POST /user_scores/ - {} {} = {}",
        new_score.first_name(),
        new_score.second_name(),
        new_score.score()
    );

    let saved = score_service::create_or_update(store.get_ref(), new_score).await?;
    Ok(HttpResponse::Ok().json(saved))
}

#[utoipa::path(
    get,
    path = "/top_scorers/",
    tag = "Scores",
    responses(
        (status = 200, description = "Users tied at the highest score", body = Vec<UserScore>)
    )
)]
pub async fn get_top_scorers(store: web::Data<dyn ScoreStore>) -> Result<HttpResponse, AppError> {
    log::info!("🏆 GET /top_scorers/");

    let scores = score_service::top_scorers(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(scores))
}
