//! Authentication handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use std::sync::Arc;

use crate::db::users;
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::security::{password, token::TokenKeys};

/// Register endpoint handler
pub async fn register(
    pool: web::Data<PgPool>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Missing username or password".to_string(),
        ));
    }

    let password_hash = password::hash(&payload.password)?;
    let user = users::create_user(pool.get_ref(), &payload.username, &password_hash).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(HttpResponse::Created().json(RegisterResponse {
        id: user.id,
        username: user.username,
    }))
}

/// Login endpoint handler
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<Arc<TokenKeys>>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Missing username or password".to_string(),
        ));
    }

    let user = match users::find_by_username(pool.get_ref(), &payload.username).await? {
        Some(user) => user,
        None => {
            // Burn comparable hashing work so response timing does not
            // reveal whether the username exists.
            let _ = password::hash(&payload.password);
            return Err(AppError::InvalidCredentials);
        }
    };

    password::verify(&payload.password, &user.password_hash)?;

    let token = keys.issue(user.id, &user.username)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

/// Change password endpoint handler
pub async fn change_password(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    if payload.password.is_empty() {
        return Err(AppError::Validation("Missing password".to_string()));
    }

    let password_hash = password::hash(&payload.password)?;
    users::update_password(pool.get_ref(), user.id, &password_hash).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
