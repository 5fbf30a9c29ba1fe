use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::api::parse_id;
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::mutations::MutationCoordinator;
use crate::services::views::ViewComposer;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("/toggle/{channelId}", web::post().to(toggle_subscription))
            .route("/{channelId}/subscribers", web::get().to(subscriber_count))
            .route(
                "/{subscriberId}/channels",
                web::get().to(subscribed_channels),
            ),
    );
}

async fn toggle_subscription(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let channel_id = parse_id(&path.into_inner(), "channel")?;
    let toggle = mutations.toggle_subscription(user.0, channel_id).await?;
    let message = if toggle.subscribed {
        "Channel subscribed"
    } else {
        "Channel unsubscribed"
    };
    Ok(ApiResponse::ok(toggle, message))
}

async fn subscriber_count(
    path: web::Path<String>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let channel_id = parse_id(&path.into_inner(), "channel")?;
    let count = views.subscriber_count(channel_id).await?;
    Ok(ApiResponse::ok(
        json!({ "subscribersCount": count }),
        "Subscribers fetched successfully",
    ))
}

async fn subscribed_channels(
    path: web::Path<String>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let subscriber_id = parse_id(&path.into_inner(), "user")?;
    let channels = views.subscribed_channels(subscriber_id).await?;
    Ok(ApiResponse::ok(
        channels,
        "Subscribed channels fetched successfully",
    ))
}
