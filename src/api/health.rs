use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::config::StoreBackend;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Configured persistence backend, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(backend: Option<web::Data<StoreBackend>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: backend.map(|b| b.to_string()),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
