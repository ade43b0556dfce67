/// Post handlers - HTTP endpoints for post operations
use crate::error::Result;
use crate::handlers::parse_fields;
use crate::middleware::AuthUser;
use crate::models::SortDirection;
use crate::services::comments::CommentsEmbed;
use crate::services::posts::{ListPostsParams, PostsService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub attachment_ids: Vec<i64>,
    #[serde(default)]
    pub linked_acc_ids: Vec<i64>,
}

/// Embed and enrichment options shared by the detail and listing endpoints
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub extended: bool,
    pub fields: Option<String>,
    #[serde(default)]
    pub comments_limit: i64,
    #[serde(default)]
    pub comments_sort: SortDirection,
    #[serde(default)]
    pub comments_extended: bool,
    pub comments_fields: Option<String>,
}

impl ViewQuery {
    fn comments_embed(&self) -> CommentsEmbed {
        CommentsEmbed {
            limit: self.comments_limit,
            extended: self.comments_extended,
            sort: self.comments_sort,
            fields: parse_fields(self.comments_fields.as_deref()),
        }
    }
}

// Query deserialization goes through serde_urlencoded, which cannot flatten
// structs with numeric fields, so the listing query repeats the view options.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub last_id: Option<i64>,
    #[serde(default)]
    pub extended: bool,
    pub fields: Option<String>,
    #[serde(default)]
    pub comments_limit: i64,
    #[serde(default)]
    pub comments_sort: SortDirection,
    #[serde(default)]
    pub comments_extended: bool,
    pub comments_fields: Option<String>,
}

impl ListQuery {
    fn into_params(self) -> ListPostsParams {
        ListPostsParams {
            limit: self.limit,
            last_id: self.last_id,
            extended: self.extended,
            fields: parse_fields(self.fields.as_deref()),
            comments: CommentsEmbed {
                limit: self.comments_limit,
                extended: self.comments_extended,
                sort: self.comments_sort,
                fields: parse_fields(self.comments_fields.as_deref()),
            },
        }
    }
}

/// Create a new post
pub async fn create_post(
    service: web::Data<PostsService>,
    user: AuthUser,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let post = service
        .new_post(user.user_id, req.message, req.attachment_ids, req.linked_acc_ids)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get a single post
pub async fn get_post(
    service: web::Data<PostsService>,
    user: AuthUser,
    id: web::Path<i64>,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse> {
    let post = service
        .get_post_by_id(user.user_id, *id, query.extended, query.comments_embed())
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Get the global feed, newest first
pub async fn get_feed(
    service: web::Data<PostsService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let posts = service
        .get_posts_list(user.user_id, query.into_inner().into_params())
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// Get one user's posts, newest first
pub async fn get_user_posts(
    service: web::Data<PostsService>,
    user: AuthUser,
    user_id: web::Path<i64>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let posts = service
        .get_posts_user(user.user_id, Some(*user_id), query.into_inner().into_params())
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// Get the caller's own posts
pub async fn get_my_posts(
    service: web::Data<PostsService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let posts = service
        .get_posts_user(user.user_id, None, query.into_inner().into_params())
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}
