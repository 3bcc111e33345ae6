//! Domain to response DTO conversions and redirect helpers.

use actix_web::{HttpResponse, http::header};
use uuid::Uuid;

use blogicum_core::Page;
use blogicum_core::domain::{Author, Category, CommentDetails, PostDetails, User};
use blogicum_core::policy::visible_location;
use blogicum_shared::PageResponse;
use blogicum_shared::dto::{
    AuthorResponse, CategoryResponse, CommentResponse, LocationResponse, PostResponse,
    UserResponse,
};

pub fn author(author: &Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        username: author.username.clone(),
        first_name: author.first_name.clone(),
        last_name: author.last_name.clone(),
    }
}

pub fn category(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title.clone(),
        description: category.description.clone(),
        slug: category.slug.clone(),
    }
}

pub fn user(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        created_at: user.created_at,
    }
}

pub fn post(details: PostDetails) -> PostResponse {
    let location = visible_location(&details).map(|location| LocationResponse {
        id: location.id,
        name: location.name.clone(),
    });

    PostResponse {
        id: details.post.id,
        author: author(&details.author),
        category: details.category.as_ref().map(category),
        location,
        comment_count: details.comment_count,
        title: details.post.title,
        text: details.post.text,
        pub_date: details.post.pub_date,
        is_published: details.post.is_published,
        created_at: details.post.created_at,
    }
}

pub fn comment(details: CommentDetails) -> CommentResponse {
    CommentResponse {
        id: details.comment.id,
        author: author(&details.author),
        text: details.comment.text,
        created_at: details.comment.created_at,
    }
}

pub fn page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageResponse<U> {
    let total_pages = page.total_pages();
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let page = page.map(f);

    PageResponse {
        items: page.items,
        page: page.number,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages,
        has_next,
        has_previous,
    }
}

pub fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

/// 303 redirect after a successful mutation.
pub fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// 302 redirect for a rejected mutation.
pub fn found(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
