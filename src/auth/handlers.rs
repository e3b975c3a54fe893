use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::auth::auth::bearer_token;
use crate::auth::jwt::{issue, verify_token, Subject};
use crate::auth::password::verify_password;
use crate::config::Config;
use crate::error::AppResult;
use crate::model::user::{LoginRequest, TokenPair, TokenType};
use crate::state::AppState;

fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "message": message }))
}

/// Signs an access/refresh pair and records the refresh jti.
async fn issue_pair(state: &AppState, config: &Config, subject: &Subject) -> AppResult<TokenPair> {
    let (access_token, _) = issue(subject, TokenType::Access, &config.jwt_secret, config.access_token_ttl)?;
    let (refresh_token, refresh_claims) =
        issue(subject, TokenType::Refresh, &config.jwt_secret, config.refresh_token_ttl)?;

    debug!(user_id = subject.user_id, jti = %refresh_claims.jti, "Storing refresh token");
    state
        .users
        .store_refresh_token(subject.user_id, &refresh_claims.jti, refresh_claims.exp as i64)
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(body, state, config), fields(username = %body.username))]
pub async fn login(
    body: web::Json<LoginRequest>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    info!("Login request received");

    let username = body.username.trim();
    if username.is_empty() || body.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": "Username or password required" })));
    }

    let Some(user) = state.users.find_by_username(username).await? else {
        info!("Invalid credentials: user not found");
        return Ok(unauthorized("Invalid credentials"));
    };

    if let Err(e) = verify_password(&body.password, &user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Ok(unauthorized("Invalid credentials"));
    }

    let pair = issue_pair(&state, &config, &Subject::from(&user)).await?;

    // not fatal for the login itself
    if let Err(e) = state.users.touch_last_login(user.id).await {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!(user_id = user.id, "Login successful");
    Ok(HttpResponse::Ok().json(pair))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Rotated token pair", body = TokenPair),
        (status = 401, description = "Missing, invalid or revoked refresh token")
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
#[instrument(name = "auth_refresh", skip_all)]
pub async fn refresh_token(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    let Some(token) = bearer_token(req.headers()) else {
        return Ok(unauthorized("No token"));
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return Ok(unauthorized("Invalid refresh token")),
    };

    match state.users.find_refresh_token(&claims.jti).await? {
        Some(record) if !record.revoked => {}
        _ => return Ok(unauthorized("Invalid refresh token")),
    }

    // a concurrent refresh may have won the rotation
    if !state.users.revoke_refresh_token(&claims.jti).await? {
        return Ok(unauthorized("Invalid refresh token"));
    }

    let pair = issue_pair(&state, &config, &Subject::from(&claims)).await?;
    info!(user_id = claims.user_id, "Refresh token rotated");
    Ok(HttpResponse::Ok().json(pair))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 204, description = "Refresh token revoked, or nothing to revoke")),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn logout(req: HttpRequest, state: web::Data<AppState>, config: web::Data<Config>) -> HttpResponse {
    let claims = bearer_token(req.headers()).and_then(|t| verify_token(t, &config.jwt_secret).ok());

    // only refresh tokens can log out; anything else is a silent no-op
    if let Some(claims) = claims.filter(|c| c.token_type == TokenType::Refresh) {
        if let Err(e) = state.users.revoke_refresh_token(&claims.jti).await {
            error!(error = %e, "Failed to revoke refresh token");
        }
    }

    HttpResponse::NoContent().finish()
}
