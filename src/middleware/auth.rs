use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::services::auth_service::{verify_token, TokenSettings};
use crate::utils::AppError;

/// Paths reachable without a token
const PUBLIC_PREFIXES: &[&str] = &["/health", "/metrics", "/token", "/swagger-ui", "/api-docs"];

fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Requires `Authorization: Bearer <jwt>` on every non-public route.
/// Verified claims are stored in the request extensions.
pub struct AuthMiddleware {
    settings: Rc<TokenSettings>,
}

impl AuthMiddleware {
    pub fn new(settings: TokenSettings) -> Self {
        Self {
            settings: Rc::new(settings),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            settings: self.settings.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    settings: Rc<TokenSettings>,
}

impl<S> AuthMiddlewareService<S> {
    fn authorize(&self, req: &ServiceRequest) -> Result<(), AppError> {
        let header = req
            .headers()
            .get("Authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authorization token".into()))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid token format".into()))?;

        let claims = verify_token(&self.settings, token)?;
        req.extensions_mut().insert(claims);
        Ok(())
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !is_public(req.path()) {
            if let Err(e) = self.authorize(&req) {
                log::warn!("🔒 Rejected {} {}: {}", req.method(), req.path(), e);
                let response = req.into_response(e.error_response()).map_into_right_body();
                return Box::pin(async move { Ok(response) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
