/// Comment handlers - HTTP endpoints for comment operations
use crate::error::Result;
use crate::handlers::parse_fields;
use crate::middleware::AuthUser;
use crate::models::SortDirection;
use crate::services::comments::CommentsListParams;
use crate::services::posts::PostsService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub attachment_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub last_id: Option<i64>,
    #[serde(default)]
    pub sort: SortDirection,
    #[serde(default)]
    pub extended: bool,
    pub fields: Option<String>,
}

/// Append a comment to a post
pub async fn create_comment(
    service: web::Data<PostsService>,
    user: AuthUser,
    post_id: web::Path<i64>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let comment = service
        .write_comment(user.user_id, *post_id, req.message, req.attachment_ids)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// List comments of a post
pub async fn get_comments(
    service: web::Data<PostsService>,
    post_id: web::Path<i64>,
    query: web::Query<ListCommentsQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let comments = service
        .get_comments_list(CommentsListParams {
            post_id: *post_id,
            limit: query.limit,
            last_id: query.last_id,
            sort: query.sort,
            extended: query.extended,
            fields: parse_fields(query.fields.as_deref()),
        })
        .await?;

    Ok(HttpResponse::Ok().json(comments))
}
