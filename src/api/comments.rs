use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::parse_id;
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::mutations::MutationCoordinator;
use crate::services::views::{ViewComposer, DEFAULT_PAGE_SIZE};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .route("/video/{videoId}", web::get().to(video_comments))
            .route("/video/{videoId}", web::post().to(add_comment))
            .route("/{commentId}", web::patch().to(update_comment))
            .route("/{commentId}", web::delete().to(delete_comment)),
    );
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

async fn video_comments(
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    let comments = views
        .video_comments(
            video_id,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    Ok(ApiResponse::ok(comments, "Comments fetched"))
}

#[derive(Debug, Deserialize)]
struct CommentBody {
    content: String,
}

async fn add_comment(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<CommentBody>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    let comment = mutations.add_comment(user.0, video_id, &body.content).await?;
    Ok(ApiResponse::created(comment, "Comment added successfully"))
}

async fn update_comment(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<CommentBody>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let comment_id = parse_id(&path.into_inner(), "comment")?;
    let comment = mutations
        .update_comment(user.0, comment_id, &body.content)
        .await?;
    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

async fn delete_comment(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let comment_id = parse_id(&path.into_inner(), "comment")?;
    mutations.delete_comment(user.0, comment_id).await?;
    Ok(ApiResponse::ok(json!({}), "Comment deleted successfully"))
}
