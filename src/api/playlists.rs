use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::parse_id;
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::mutations::MutationCoordinator;
use crate::services::views::ViewComposer;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/playlists")
            .route("", web::post().to(create_playlist))
            .route("/user/{userId}", web::get().to(user_playlists))
            .route("/{playlistId}", web::get().to(playlist_by_id))
            .route("/{playlistId}", web::patch().to(update_playlist))
            .route("/{playlistId}", web::delete().to(delete_playlist))
            .route(
                "/{playlistId}/videos/{videoId}",
                web::patch().to(add_video),
            )
            .route(
                "/{playlistId}/videos/{videoId}",
                web::delete().to(remove_video),
            ),
    );
}

#[derive(Debug, Deserialize)]
struct PlaylistBody {
    name: String,
    description: String,
}

async fn create_playlist(
    user: AuthUser,
    body: web::Json<PlaylistBody>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let playlist = mutations
        .create_playlist(user.0, &body.name, &body.description)
        .await?;
    Ok(ApiResponse::created(
        playlist,
        "New playlist created successfully",
    ))
}

async fn user_playlists(
    path: web::Path<String>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let user_id = parse_id(&path.into_inner(), "user")?;
    let playlists = views.user_playlists(user_id).await?;
    Ok(ApiResponse::ok(
        playlists,
        "All user playlists fetched successfully",
    ))
}

async fn playlist_by_id(
    path: web::Path<String>,
    views: web::Data<ViewComposer>,
) -> Result<HttpResponse, ApiError> {
    let playlist_id = parse_id(&path.into_inner(), "playlist")?;
    let playlist = views.playlist_by_id(playlist_id).await?;
    Ok(ApiResponse::ok(playlist, "Playlist fetched successfully"))
}

async fn update_playlist(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<PlaylistBody>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let playlist_id = parse_id(&path.into_inner(), "playlist")?;
    let playlist = mutations
        .update_playlist(user.0, playlist_id, &body.name, &body.description)
        .await?;
    Ok(ApiResponse::ok(playlist, "Playlist details updated"))
}

async fn delete_playlist(
    user: AuthUser,
    path: web::Path<String>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let playlist_id = parse_id(&path.into_inner(), "playlist")?;
    mutations.delete_playlist(user.0, playlist_id).await?;
    Ok(ApiResponse::ok(json!({}), "Playlist deleted"))
}

async fn add_video(
    user: AuthUser,
    path: web::Path<(String, String)>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let (playlist_raw, video_raw) = path.into_inner();
    let playlist_id = parse_id(&playlist_raw, "playlist")?;
    let video_id = parse_id(&video_raw, "video")?;
    let playlist = mutations
        .add_playlist_video(user.0, playlist_id, video_id)
        .await?;
    Ok(ApiResponse::ok(playlist, "Video added to the playlist"))
}

async fn remove_video(
    user: AuthUser,
    path: web::Path<(String, String)>,
    mutations: web::Data<MutationCoordinator>,
) -> Result<HttpResponse, ApiError> {
    let (playlist_raw, video_raw) = path.into_inner();
    let playlist_id = parse_id(&playlist_raw, "playlist")?;
    let video_id = parse_id(&video_raw, "video")?;
    let playlist = mutations
        .remove_playlist_video(user.0, playlist_id, video_id)
        .await?;
    Ok(ApiResponse::ok(playlist, "Video removed from the playlist"))
}
