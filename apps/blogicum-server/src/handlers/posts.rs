//! Post listing, detail and mutation handlers.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use blogicum_core::domain::{Post, PostDraft};
use blogicum_core::{
    DomainError, PageNumber, PageRequest, PostOrder, PostQuery, can_mutate, can_view,
};
use blogicum_shared::dto::{PageParams, PostDetailResponse, PostRequest};

use super::{current_user, render};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET / - newest published posts first.
pub async fn index(
    state: web::Data<AppState>,
    params: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let now = state.clock.now();
    let query = PostQuery::all()
        .relevant(now)
        .ordered_by(PostOrder::NewestPublished);
    let request = PageRequest::new(
        PageNumber::parse(params.page.as_deref()),
        state.pagination.index,
    );

    let page = state.posts.find_page(&query, request).await?;

    Ok(HttpResponse::Ok().json(render::page(page, render::post)))
}

/// GET /posts/{id}/
///
/// The author sees their post regardless of its publication state; everybody
/// else only once it is public.
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let now = state.clock.now();
    let actor = identity.actor();

    let post = state
        .posts
        .find_details(post_id)
        .await?
        .filter(|post| can_view(&actor, post, now))
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    let comments = state.comments.find_by_post(post_id).await?;
    let can_edit = can_mutate(&actor, &post);

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: render::post(post),
        comments: comments.into_iter().map(render::comment).collect(),
        can_edit,
    }))
}

/// Validate a post form and resolve its references.
///
/// A missing `pub_date` becomes `default_pub_date`.
async fn read_draft(
    state: &AppState,
    request: PostRequest,
    default_pub_date: DateTime<Utc>,
) -> AppResult<PostDraft> {
    request.validate()?;

    if let Some(category_id) = request.category_id {
        if state.categories.find_by_id(category_id).await?.is_none() {
            return Err(AppError::invalid("category_id", "unknown category"));
        }
    }
    if let Some(location_id) = request.location_id {
        if state.locations.find_by_id(location_id).await?.is_none() {
            return Err(AppError::invalid("location_id", "unknown location"));
        }
    }

    Ok(PostDraft {
        title: request.title,
        text: request.text,
        pub_date: request.pub_date.unwrap_or(default_pub_date),
        category_id: request.category_id,
        location_id: request.location_id,
        is_published: request.is_published,
    })
}

/// Load a post or fail with 404.
async fn load_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    Ok(post)
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let now = state.clock.now();
    let author = current_user(&state, &identity).await?;
    let draft = read_draft(&state, body.into_inner(), now).await?;

    let post = state.posts.insert(Post::new(author.id, draft, now)).await?;
    tracing::info!(post_id = %post.id, author = %author.username, "Post created");

    Ok(render::see_other(render::profile_url(&author.username)))
}

/// POST /posts/{id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let mut post = load_post(&state, post_id).await?;

    if !can_mutate(&identity.actor(), &post) {
        tracing::warn!(%post_id, user_id = %identity.user_id, "Rejected post edit by non-author");
        return Ok(render::found(render::post_url(post_id)));
    }

    let draft = read_draft(&state, body.into_inner(), post.pub_date).await?;
    post.apply(draft);
    state.posts.update(post).await?;
    tracing::info!(%post_id, "Post updated");

    Ok(render::see_other(render::post_url(post_id)))
}

/// POST /posts/{id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = load_post(&state, post_id).await?;

    if !can_mutate(&identity.actor(), &post) {
        tracing::warn!(%post_id, user_id = %identity.user_id, "Rejected post delete by non-author");
        return Ok(render::found(render::post_url(post_id)));
    }

    let author = current_user(&state, &identity).await?;
    state.posts.delete(post_id).await?;
    tracing::info!(%post_id, "Post deleted");

    Ok(render::see_other(render::profile_url(&author.username)))
}
