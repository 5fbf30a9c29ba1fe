pub mod memory;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::{Comment, Like, LikeTarget, Playlist, Subscription, User, Video};
use crate::error::ApiError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails `Conflict` when the username or email is already taken.
    async fn insert_user(&self, user: User) -> StoreResult<()>;
    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Lookup by the stored (lowercase) username.
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    /// Lookup by username or email, for login.
    async fn user_by_login(&self, identifier: &str) -> StoreResult<Option<User>>;
    async fn update_account(&self, id: Uuid, full_name: String, email: String)
        -> StoreResult<User>;
    async fn set_password(&self, id: Uuid, password_hash: String) -> StoreResult<()>;
    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> StoreResult<()>;
    /// Replaces the avatar, returning the updated user and the previous
    /// asset identifier so the caller can clean it up.
    async fn set_avatar(&self, id: Uuid, url: String, asset_id: String)
        -> StoreResult<(User, String)>;
    async fn set_cover(
        &self,
        id: Uuid,
        url: String,
        asset_id: String,
    ) -> StoreResult<(User, Option<String>)>;
    async fn clear_watch_history(&self, id: Uuid) -> StoreResult<()>;
    async fn remove_watch_entry(&self, id: Uuid, video: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait VideoRepo: Send + Sync {
    async fn insert_video(&self, video: Video) -> StoreResult<()>;
    async fn video_by_id(&self, id: Uuid) -> StoreResult<Option<Video>>;
    /// Full scan, ordered by (created_at, id). The composer applies its own
    /// filter, sort and pagination on top.
    async fn videos(&self) -> StoreResult<Vec<Video>>;
    async fn videos_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Video>>;
    async fn update_video_details(
        &self,
        id: Uuid,
        title: String,
        description: String,
        thumbnail: Option<(String, String)>,
    ) -> StoreResult<Video>;
    async fn set_published(&self, id: Uuid, published: bool) -> StoreResult<Video>;
    /// Returns the removed record so media assets can be cleaned up.
    async fn delete_video(&self, id: Uuid) -> StoreResult<Video>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn insert_comment(&self, comment: Comment) -> StoreResult<()>;
    async fn comment_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    async fn comments_by_video(&self, video: Uuid) -> StoreResult<Vec<Comment>>;
    async fn update_comment(&self, id: Uuid, content: String) -> StoreResult<Comment>;
    async fn delete_comment(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait LikeRepo: Send + Sync {
    /// Conditional upsert-or-delete in one call: creates the edge when
    /// absent, removes it when present. Returns the new "liked" state.
    async fn toggle_like(&self, liked_by: Uuid, target: LikeTarget) -> StoreResult<bool>;
    async fn count_likes(&self, target: LikeTarget) -> StoreResult<u64>;
    async fn likes_by(&self, liked_by: Uuid) -> StoreResult<Vec<Like>>;
    /// Likes whose target is one of the given videos (two-hop stats input).
    async fn count_likes_for_videos(&self, videos: &[Uuid]) -> StoreResult<u64>;
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Same upsert-or-delete contract as `toggle_like`.
    async fn toggle_subscription(&self, subscriber: Uuid, channel: Uuid) -> StoreResult<bool>;
    async fn count_subscribers(&self, channel: Uuid) -> StoreResult<u64>;
    async fn count_subscriptions(&self, subscriber: Uuid) -> StoreResult<u64>;
    async fn is_subscribed(&self, subscriber: Uuid, channel: Uuid) -> StoreResult<bool>;
    async fn subscriptions_to(&self, channel: Uuid) -> StoreResult<Vec<Subscription>>;
    async fn subscriptions_by(&self, subscriber: Uuid) -> StoreResult<Vec<Subscription>>;
}

#[async_trait]
pub trait PlaylistRepo: Send + Sync {
    /// Fails `Conflict` when the owner already has a playlist of that name.
    async fn insert_playlist(&self, playlist: Playlist) -> StoreResult<()>;
    async fn playlist_by_id(&self, id: Uuid) -> StoreResult<Option<Playlist>>;
    async fn playlists_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Playlist>>;
    async fn update_playlist_details(
        &self,
        id: Uuid,
        name: String,
        description: String,
    ) -> StoreResult<Playlist>;
    /// Fails `Conflict` when the video is already in the playlist.
    async fn add_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Playlist>;
    /// Fails `Conflict` when the video is not in the playlist.
    async fn remove_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Playlist>;
    async fn delete_playlist(&self, id: Uuid) -> StoreResult<()>;
}

/// Combined store handed to the view composer and mutation coordinator.
/// Cross-entity writes that must not tear live here.
#[async_trait]
pub trait DataStore:
    UserRepo + VideoRepo + CommentRepo + LikeRepo + SubscriptionRepo + PlaylistRepo + Send + Sync
{
    /// First view by this user appends to their watch history and bumps the
    /// view counter, as one unit; repeat views change nothing. Returns the
    /// current view count either way.
    async fn record_view(&self, viewer: Uuid, video: Uuid) -> StoreResult<u64>;
}
