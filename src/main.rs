use actix_cors::Cors;
use actix_web::{middleware::Condition, middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use score_service::{
    api, config::Config, database, middleware, services::auth_service,
    services::auth_service::TokenSettings,
};

fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;

    log::info!("🚀 Starting Score Service...");
    log::info!("📊 Store backend: {}", config.store_backend);

    let stores = database::connect(&config)
        .await
        .context("Failed to connect to the score store")?;
    log::info!("✅ Store ready");

    auth_service::bootstrap_admin(stores.admins.as_ref(), &config.auth).await?;
    if config.auth.enabled {
        log::info!("🔒 Bearer token authentication enabled");
    }

    let scores = web::Data::from(stores.scores.clone());
    let admins = web::Data::from(stores.admins.clone());
    let backend = web::Data::new(config.store_backend);
    let settings = TokenSettings::from_config(&config.auth)?;
    let token_settings = web::Data::new(settings.clone());
    let auth_enabled = config.auth.enabled;
    let allowed_origins = config.cors_allowed_origins.clone();

    let bind_address = config.bind_address();
    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);

    HttpServer::new(move || {
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(scores.clone())
            .app_data(admins.clone())
            .app_data(backend.clone())
            .app_data(token_settings.clone())
            .wrap(Condition::new(
                auth_enabled,
                middleware::AuthMiddleware::new(settings.clone()),
            ))
            .wrap(cors(&allowed_origins))
            .wrap(middleware::RequestMetrics)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            .configure(api::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;

    Ok(())
}
