use actix_web::{
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
    Error, HttpMessage, HttpResponse,
};
use serde_json::json;
use tracing::debug;

use crate::auth::auth::{bearer_token, AuthUser};
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use crate::model::user::TokenType;

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(json!({ "message": message }));
    req.into_response(resp.map_into_boxed_body())
}

/// Validates the access token and stores the caller as [`AuthUser`].
pub async fn auth_middleware(req: ServiceRequest, next: Next<BoxBody>) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let verified = bearer_token(req.headers()).map(|token| verify_token(token, &config.jwt_secret));
    let claims = match verified {
        Some(Ok(claims)) => claims,
        Some(Err(e)) => {
            debug!(error = %e, "Rejected token");
            return Ok(unauthorized(req, "Invalid or expired token"));
        }
        None => return Ok(unauthorized(req, "Missing Authorization header")),
    };

    if claims.token_type != TokenType::Access {
        return Ok(unauthorized(req, "Access token required"));
    }

    let Some(role) = Role::from_id(claims.role) else {
        return Ok(unauthorized(req, "Invalid role"));
    };

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    });

    next.call(req).await
}
