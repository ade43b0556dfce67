/// Like handlers - HTTP endpoints for like operations
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::posts::PostsService;
use actix_web::{web, HttpResponse};

/// Set the caller's like on a post (idempotent)
pub async fn like_post(
    service: web::Data<PostsService>,
    user: AuthUser,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    service.add_like(user.user_id, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Clear the caller's like on a post (idempotent)
pub async fn unlike_post(
    service: web::Data<PostsService>,
    user: AuthUser,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    service.delete_like(user.user_id, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
