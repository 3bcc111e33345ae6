//! Problem bodies for framework-generated error responses.
//!
//! Unmatched routes, malformed path parameters and handler failures that do
//! not go through [`AppError`](crate::middleware::error::AppError) produce
//! bare 403/404/500 responses. These are rewritten into RFC 7807 bodies
//! tagged with the request id assigned by `TracingLogger`.

use actix_web::HttpMessage;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderValue};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use tracing_actix_web::RequestId;

use blogicum_shared::ErrorResponse;

/// Error handlers for the statuses that get a problem body.
pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::FORBIDDEN, render_problem)
        .handler(StatusCode::NOT_FOUND, render_problem)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, render_problem)
}

fn has_json_body<B>(res: &ServiceResponse<B>) -> bool {
    res.response()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value.starts_with("application/json") || value.starts_with("application/problem+json")
        })
}

fn render_problem<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    if has_json_body(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let status = res.status();
    let mut problem = ErrorResponse::new(
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error"),
    );
    if let Some(request_id) = res.request().extensions().get::<RequestId>() {
        problem = problem.with_request_id(request_id.to_string());
    }
    if status.is_server_error() {
        tracing::error!(path = %res.request().path(), "Unhandled server error");
    }

    let body = serde_json::to_string(&problem)?;
    let (req, res) = res.into_parts();
    let mut res = res.set_body(body);
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    let res = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}
