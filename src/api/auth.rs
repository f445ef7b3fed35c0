use actix_web::{web, HttpResponse};

use crate::database::AdminStore;
use crate::services::auth_service::{self, TokenRequest, TokenResponse, TokenSettings};
use crate::utils::AppError;

#[utoipa::path(
    post,
    path = "/token",
    tag = "Auth",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Bearer token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn login(
    admins: web::Data<dyn AdminStore>,
    settings: web::Data<TokenSettings>,
    form: web::Form<TokenRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /token - username: {}", form.username);

    match auth_service::login(admins.get_ref(), &settings, &form).await {
        Ok(response) => {
            log::info!("✅ Token issued: {}", form.username);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", form.username, e);
            Err(e)
        }
    }
}
