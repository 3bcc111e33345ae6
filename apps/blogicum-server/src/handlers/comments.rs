//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use blogicum_core::domain::Comment;
use blogicum_core::{DomainError, can_mutate};
use blogicum_shared::dto::CommentRequest;

use super::{current_user, render};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Load a comment that belongs to `post_id`, or fail with 404.
async fn load_comment(state: &AppState, post_id: Uuid, comment_id: Uuid) -> AppResult<Comment> {
    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;

    Ok(comment)
}

/// POST /posts/{id}/comment/
pub async fn add(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let now = state.clock.now();

    if state.posts.find_by_id(post_id).await?.is_none() {
        return Err(DomainError::not_found("Post", post_id).into());
    }

    let request = body.into_inner();
    request.validate()?;

    let author = current_user(&state, &identity).await?;
    let comment = state
        .comments
        .insert(Comment::new(post_id, author.id, request.text, now))
        .await?;
    tracing::info!(%post_id, comment_id = %comment.id, "Comment added");

    Ok(render::see_other(render::post_url(post_id)))
}

/// POST /posts/{id}/edit_comment/{comment_id}/
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: Identity,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = load_comment(&state, post_id, comment_id).await?;

    if !can_mutate(&identity.actor(), &comment) {
        tracing::warn!(%comment_id, user_id = %identity.user_id, "Rejected comment edit by non-author");
        return Ok(render::found(render::post_url(post_id)));
    }

    let request = body.into_inner();
    request.validate()?;

    comment.text = request.text;
    state.comments.update(comment).await?;
    tracing::info!(%comment_id, "Comment updated");

    Ok(render::see_other(render::post_url(post_id)))
}

/// POST /posts/{id}/delete_comment/{comment_id}/
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = load_comment(&state, post_id, comment_id).await?;

    if !can_mutate(&identity.actor(), &comment) {
        tracing::warn!(%comment_id, user_id = %identity.user_id, "Rejected comment delete by non-author");
        return Ok(render::found(render::post_url(post_id)));
    }

    state.comments.delete(comment_id).await?;
    tracing::info!(%comment_id, "Comment deleted");

    Ok(render::see_other(render::post_url(post_id)))
}
