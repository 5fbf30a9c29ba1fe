use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::forms::read_form;
use crate::api::parse_id;
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::mutations::MutationCoordinator;
use crate::services::views::{FeedParams, SortField, ViewComposer, DEFAULT_PAGE_SIZE};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/videos")
            .route("", web::get().to(feed))
            .route("", web::post().to(publish))
            .route("/{videoId}", web::get().to(video_by_id))
            .route("/{videoId}", web::patch().to(update_video))
            .route("/{videoId}", web::delete().to(delete_video))
            .route(
                "/{videoId}/toggle-publish",
                web::patch().to(toggle_publish),
            )
            .route("/{videoId}/view", web::post().to(record_view)),
    );
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl FeedQuery {
    fn into_params(self) -> FeedParams {
        FeedParams {
            query: self.query.unwrap_or_default(),
            sort_by: SortField::parse(self.sort_by.as_deref().unwrap_or("")),
            // "asc" sorts ascending; anything else means descending.
            descending: self.sort_type.as_deref() != Some("asc"),
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

async fn feed(
    query: web::Query<FeedQuery>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner().into_params();
    let videos = views.video_feed(&params).await?;
    Ok(ApiResponse::ok(videos, "All videos fetched successfully"))
}

async fn publish(
    user: AuthUser,
    payload: Multipart,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let mut form = read_form(payload).await?;
    let title = form.require_text("title")?.to_string();
    let description = form.require_text("description")?.to_string();
    let video_file = form
        .require_file("videoFile")
        .map_err(|_| ApiError::BadRequest("Video file is required".into()))?;
    let thumbnail = form
        .require_file("thumbnail")
        .map_err(|_| ApiError::BadRequest("Thumbnail is required".into()))?;

    let video = mutations
        .publish_video(user.0, &title, &description, video_file, thumbnail)
        .await?;
    Ok(ApiResponse::created(video, "Video uploaded successfully"))
}

async fn video_by_id(
    path: web::Path<String>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    let video = views.video_by_id(video_id).await?;
    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

async fn update_video(
    user: AuthUser,
    path: web::Path<String>,
    payload: Multipart,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    let mut form = read_form(payload).await?;
    let title = form.require_text("title")?.to_string();
    let description = form.require_text("description")?.to_string();
    let thumbnail = form.take_file("thumbnail");

    let video = mutations
        .update_video(user.0, video_id, &title, &description, thumbnail)
        .await?;
    Ok(ApiResponse::ok(video, "Video details updated successfully"))
}

async fn delete_video(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    mutations.delete_video(user.0, video_id).await?;
    Ok(ApiResponse::ok(json!({}), "Video deleted successfully"))
}

async fn toggle_publish(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    let video = mutations.toggle_publish(user.0, video_id).await?;
    Ok(ApiResponse::ok(video, "Publish status modified"))
}

async fn record_view(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let video_id = parse_id(&path.into_inner(), "video")?;
    let views = mutations.record_view(user.0, video_id).await?;
    Ok(ApiResponse::ok(
        json!({ "views": views }),
        "View count updated",
    ))
}
