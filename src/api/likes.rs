use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::api::parse_id;
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::db::models::LikeTarget;
use crate::error::ApiError;
use crate::services::mutations::MutationCoordinator;
use crate::services::views::ViewComposer;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/likes")
            .route("/toggle/video/{videoId}", web::post().to(toggle_video_like))
            .route(
                "/toggle/comment/{commentId}",
                web::post().to(toggle_comment_like),
            )
            .route("/toggle/tweet/{tweetId}", web::post().to(toggle_tweet_like))
            .route("/videos", web::get().to(liked_videos))
            .route("/video/{videoId}/count", web::get().to(video_like_count)),
    );
}

async fn toggle_video_like(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    let toggle = mutations
        .toggle_like(user.0, LikeTarget::Video(video_id))
        .await?;
    let message = if toggle.liked {
        "Video liked successfully"
    } else {
        "Video unliked successfully"
    };
    Ok(ApiResponse::ok(
        json!({
            "videoId": video_id,
            "liked": toggle.liked,
            "totalLikes": toggle.total_likes,
        }),
        message,
    ))
}

async fn toggle_comment_like(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let comment_id = parse_id(&path.into_inner(), "comment")?;
    let toggle = mutations
        .toggle_like(user.0, LikeTarget::Comment(comment_id))
        .await?;
    let message = if toggle.liked {
        "Comment liked successfully"
    } else {
        "Comment unliked successfully"
    };
    Ok(ApiResponse::ok(
        json!({
            "commentId": comment_id,
            "liked": toggle.liked,
            "totalLikes": toggle.total_likes,
        }),
        message,
    ))
}

async fn toggle_tweet_like(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let tweet_id = parse_id(&path.into_inner(), "tweet")?;
    let toggle = mutations
        .toggle_like(user.0, LikeTarget::Tweet(tweet_id))
        .await?;
    let message = if toggle.liked {
        "Tweet liked successfully"
    } else {
        "Tweet unliked successfully"
    };
    Ok(ApiResponse::ok(
        json!({
            "tweetId": tweet_id,
            "liked": toggle.liked,
            "totalLikes": toggle.total_likes,
        }),
        message,
    ))
}

async fn liked_videos(
    user: AuthUser,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let videos = views.liked_videos(user.0).await?;
    Ok(ApiResponse::ok(
        videos,
        "Successfully fetched liked videos",
    ))
}

async fn video_like_count(
    path: web::Path<String>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    let total_likes = views.video_like_count(video_id).await?;
    Ok(ApiResponse::ok(
        json!({ "videoId": video_id, "totalLikes": total_likes }),
        "Successfully counted video likes",
    ))
}
