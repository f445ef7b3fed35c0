pub mod auth;
pub mod health;
pub mod metrics;
pub mod swagger;
pub mod user_scores;

use actix_web::{web, HttpRequest};

use crate::utils::AppError;

/// Registers every route. The caller provides the store and token settings as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(form_config())
        .route("/", web::get().to(user_scores::show_all))
        .service(
            web::resource("/user_scores/")
                .route(web::get().to(user_scores::get_score_for_user))
                .route(web::post().to(user_scores::post_user_score)),
        )
        .route("/top_scorers/", web::get().to(user_scores::get_top_scorers))
        .route("/token", web::post().to(auth::login))
        .route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::get_metrics));
}

// Malformed bodies and queries are validation failures (422), not generic 400s

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::Validation(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::Validation(err.to_string()).into())
}

fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::Validation(err.to_string()).into())
}
