//! Profile page and profile editing.

use actix_web::{HttpResponse, web};
use validator::Validate;

use blogicum_core::domain::Author;
use blogicum_core::{DomainError, PageNumber, PageRequest, PostOrder, PostQuery};
use blogicum_shared::dto::{EditProfileRequest, PageParams, ProfileResponse};

use super::{current_user, render};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile/{username}/
///
/// The owner sees all of their posts; other visitors only the public ones.
pub async fn show(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<PageParams>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let now = state.clock.now();

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &username))?;
    let is_owner = identity.actor().user_id() == Some(user.id);

    let mut query = PostQuery::all()
        .by_author(user.id)
        .ordered_by(PostOrder::NewestCreated);
    if !is_owner {
        query = query.relevant(now);
    }
    let request = PageRequest::new(
        PageNumber::parse(params.page.as_deref()),
        state.pagination.profile,
    );
    let page = state.posts.find_page(&query, request).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        profile: render::author(&Author::from(&user)),
        date_joined: user.created_at,
        is_owner,
        edit_profile_url: is_owner.then(|| "/edit_profile/".to_string()),
        password_change_url: is_owner.then(|| "/auth/password_change/".to_string()),
        posts: render::page(page, render::post),
    }))
}

/// POST /edit_profile/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<EditProfileRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    request.validate()?;

    let mut user = current_user(&state, &identity).await?;

    if let Some(other) = state.users.find_by_username(&request.username).await? {
        if other.id != user.id {
            return Err(AppError::invalid("username", "already taken"));
        }
    }
    if let Some(other) = state.users.find_by_email(&request.email).await? {
        if other.id != user.id {
            return Err(AppError::invalid("email", "already registered"));
        }
    }

    user.first_name = request.first_name;
    user.last_name = request.last_name;
    user.username = request.username;
    user.email = request.email;
    user.updated_at = state.clock.now();

    let user = state.users.update(user).await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(render::see_other(render::profile_url(&user.username)))
}
