/// HTTP handlers for the posts/feed endpoints
///
/// This module contains handlers for:
/// - Posts: create posts and read them one-by-one or as feeds
/// - Comments: append and list comments under a post
/// - Likes: set and clear the caller's like on a post
///
/// Plus the unauthenticated operational endpoints `/health` and `/metrics`.
pub mod comments;
pub mod likes;
pub mod posts;

// Re-export handler functions at module level
pub use comments::{create_comment, get_comments};
pub use likes::{like_post, unlike_post};
pub use posts::{create_post, get_feed, get_my_posts, get_post, get_user_posts};

use actix_web::{web, HttpResponse};
use prometheus::{Encoder, TextEncoder};

/// Register all authenticated API routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/posts", web::post().to(create_post))
        .route("/posts", web::get().to(get_feed))
        .route("/posts/{id}", web::get().to(get_post))
        .route("/posts/{id}/like", web::put().to(like_post))
        .route("/posts/{id}/like", web::delete().to(unlike_post))
        .route("/posts/{id}/comments", web::post().to(create_comment))
        .route("/posts/{id}/comments", web::get().to(get_comments))
        .route("/users/me/posts", web::get().to(get_my_posts))
        .route("/users/{user_id}/posts", web::get().to(get_user_posts));
}

/// Split a comma-separated `fields` query value into the profile field list.
pub(crate) fn parse_fields(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(|f| f.to_string())
            .collect()
    })
    .unwrap_or_default()
}

/// Liveness probe
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Prometheus exposition endpoint
pub async fn metrics() -> HttpResponse {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
