//! HTTP handlers and route configuration.

mod auth;
mod category;
mod comments;
mod health;
mod posts;
mod profile;
mod render;

use actix_web::{HttpRequest, error, web};

use blogicum_core::domain::User;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// The account behind a bearer token.
async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/health", web::get().to(health::health_check))
        .route("/", web::get().to(posts::index))
        // Registered before `/posts/{id}/` so that `create` is not taken for an id.
        .route("/posts/create/", web::post().to(posts::create))
        .route("/posts/{id}/", web::get().to(posts::detail))
        .route("/posts/{id}/edit/", web::post().to(posts::edit))
        .route("/posts/{id}/delete/", web::post().to(posts::delete))
        .route("/posts/{id}/comment/", web::post().to(comments::add))
        .route(
            "/posts/{id}/edit_comment/{comment_id}/",
            web::post().to(comments::edit),
        )
        .route(
            "/posts/{id}/delete_comment/{comment_id}/",
            web::post().to(comments::delete),
        )
        .route("/category/{slug}/", web::get().to(category::posts))
        .route("/profile/{username}/", web::get().to(profile::show))
        .route("/edit_profile/", web::post().to(profile::edit))
        .service(
            web::scope("/auth")
                .route("/registration/", web::post().to(auth::register))
                .route("/login/", web::post().to(auth::login))
                .route("/me/", web::get().to(auth::me))
                .route("/password_change/", web::post().to(auth::password_change)),
        );
}
