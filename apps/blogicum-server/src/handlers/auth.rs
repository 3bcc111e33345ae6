//! Authentication handlers.

use actix_web::{HttpResponse, web};
use validator::Validate;

use blogicum_core::domain::User;
use blogicum_shared::dto::{AuthResponse, LoginRequest, PasswordChangeRequest, RegisterUserRequest};

use super::{current_user, render};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state.tokens.generate_token(user.id)?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: u64::try_from(state.tokens.expiration_seconds()).unwrap_or(0),
    })
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;

    let user = User::new(req.username, req.email, password_hash, state.clock.now())
        .with_names(req.first_name, req.last_name);
    let saved_user = state.users.insert(user).await?;
    tracing::info!(user_id = %saved_user.id, username = %saved_user.username, "User registered");

    Ok(HttpResponse::Created().json(issue_token(&state, &saved_user)?))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::warn!(username = %req.username, "Failed login attempt");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    Ok(HttpResponse::Ok().json(issue_token(&state, &user)?))
}

/// GET /auth/me/
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;

    Ok(HttpResponse::Ok().json(render::user(&user)))
}

/// POST /auth/password_change/
pub async fn password_change(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PasswordChangeRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let mut user = current_user(&state, &identity).await?;
    if !state.passwords.verify(&req.old_password, &user.password_hash)? {
        return Err(AppError::invalid("old_password", "incorrect password"));
    }

    user.password_hash = state.passwords.hash(&req.new_password)?;
    user.updated_at = state.clock.now();
    state.users.update(user).await?;
    tracing::info!(user_id = %identity.user_id, "Password changed");

    Ok(HttpResponse::NoContent().finish())
}
