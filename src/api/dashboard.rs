use actix_web::{web, HttpResponse};

use crate::api::parse_id;
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::views::ViewComposer;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("/stats", web::get().to(channel_stats))
            .route("/videos", web::get().to(channel_videos)),
    );
    // Public variant, addressed by user id instead of the caller identity.
    cfg.route("/channels/{userId}/stats", web::get().to(public_stats));
}

async fn channel_stats(
    user: AuthUser,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let stats = views.channel_stats(user.0).await?;
    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

async fn channel_videos(
    user: AuthUser,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let videos = views.channel_videos(user.0).await?;
    Ok(ApiResponse::ok(
        videos,
        "All channel videos fetched successfully",
    ))
}

async fn public_stats(
    path: web::Path<String>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let user_id = parse_id(&path.into_inner(), "user")?;
    let stats = views.channel_stats(user_id).await?;
    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}
