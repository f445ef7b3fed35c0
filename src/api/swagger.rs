use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Score Service API",
        version = "1.0.0",
        description = "Best-known score per user. Names are matched case-insensitively.\n\n**Authentication:** disabled by default. When enabled, obtain a bearer token from `/token`."
    ),
    paths(
        crate::api::user_scores::show_all,
        crate::api::user_scores::get_score_for_user,
        crate::api::user_scores::post_user_score,
        crate::api::user_scores::get_top_scorers,
        crate::api::auth::login,
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::models::UserScore,
            crate::models::UserScoreRequest,
            crate::services::auth_service::TokenRequest,
            crate::services::auth_service::TokenResponse,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Scores", description = "Read and upsert user scores."),
        (name = "Auth", description = "Optional bearer token authentication."),
        (name = "Health", description = "Health check and request metrics."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /token"))
                        .build(),
                ),
            );
        }
    }
}
