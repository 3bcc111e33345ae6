//! Category listing handler.

use actix_web::{HttpResponse, web};

use blogicum_core::{DomainError, PageNumber, PageRequest, PostOrder, PostQuery};
use blogicum_shared::dto::{CategoryPostsResponse, PageParams};

use super::render;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /category/{slug}/ - public posts of a published category.
pub async fn posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let now = state.clock.now();

    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(|category| category.is_published)
        .ok_or_else(|| DomainError::not_found("Category", &slug))?;

    let query = PostQuery::all()
        .in_category(category.id)
        .relevant(now)
        .ordered_by(PostOrder::NewestPublished);
    let request = PageRequest::new(
        PageNumber::parse(params.page.as_deref()),
        state.pagination.category,
    );
    let page = state.posts.find_page(&query, request).await?;

    Ok(HttpResponse::Ok().json(CategoryPostsResponse {
        category: render::category(&category),
        posts: render::page(page, render::post),
    }))
}
