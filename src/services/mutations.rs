//! Write-path component. Validates input, enforces ownership, and applies
//! single-entity or toggle writes through the store's atomic primitives.
//! Media uploads happen before any store write; cleanup of replaced assets
//! is best-effort and never rolls back an applied change.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{Comment, LikeTarget, Playlist, User, Video};
use crate::db::DataStore;
use crate::error::ApiError;
use crate::services::media::{MediaKind, MediaStore};

/// A file received from the transport layer, already buffered.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub liked: bool,
    pub total_likes: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionToggle {
    pub subscribed: bool,
    pub total_subscribers: u64,
}

pub struct MutationCoordinator {
    store: Arc<dyn DataStore>,
    media: Arc<dyn MediaStore>,
}

impl MutationCoordinator {
    pub fn new(store: Arc<dyn DataStore>, media: Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }

    async fn discard_asset(&self, identifier: &str, kind: MediaKind) {
        if let Err(e) = self.media.delete(identifier, kind).await {
            log::warn!("Failed to delete asset {identifier}: {e:#}");
        }
    }

    // ----- accounts -----

    pub async fn register(
        &self,
        new_user: NewUser,
        avatar: FileUpload,
        cover: Option<FileUpload>,
    ) -> Result<User, ApiError> {
        let NewUser {
            username,
            email,
            full_name,
            password,
        } = new_user;
        if username.trim().is_empty()
            || email.trim().is_empty()
            || full_name.trim().is_empty()
            || password.is_empty()
        {
            return Err(ApiError::BadRequest("All fields are required".into()));
        }
        if !email.contains('@') || !email.contains('.') {
            return Err(ApiError::BadRequest("Invalid email format".into()));
        }

        let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
            .map_err(|e| ApiError::Internal(anyhow!(e)))?;

        let avatar_asset = self
            .media
            .upload(&avatar.filename, avatar.bytes, MediaKind::Image)
            .await?;
        let cover_asset = match cover {
            Some(cover) => Some(
                self.media
                    .upload(&cover.filename, cover.bytes, MediaKind::Image)
                    .await?,
            ),
            None => None,
        };

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.trim().to_lowercase(),
            email: email.trim().to_lowercase(),
            full_name: full_name.trim().to_string(),
            password_hash,
            avatar_url: avatar_asset.url.clone(),
            avatar_asset_id: avatar_asset.identifier.clone(),
            cover_url: cover_asset.as_ref().map(|a| a.url.clone()),
            cover_asset_id: cover_asset.as_ref().map(|a| a.identifier.clone()),
            watch_history: Vec::new(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.store.insert_user(user.clone()).await {
            // No record may reference an asset that will never be served.
            self.discard_asset(&avatar_asset.identifier, MediaKind::Image)
                .await;
            if let Some(cover_asset) = &cover_asset {
                self.discard_asset(&cover_asset.identifier, MediaKind::Image)
                    .await;
            }
            return Err(e.into());
        }
        Ok(user)
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, ApiError> {
        if identifier.trim().is_empty() {
            return Err(ApiError::BadRequest("Username or email is required".into()));
        }
        let user = self
            .store
            .user_by_login(&identifier.trim().to_lowercase())
            .await?
            .ok_or_else(|| ApiError::NotFound("User does not exist".into()))?;
        let valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| ApiError::Internal(anyhow!(e)))?;
        if !valid {
            return Err(ApiError::Unauthorized("Invalid or wrong password".into()));
        }
        Ok(user)
    }

    pub async fn store_refresh_token(
        &self,
        user: Uuid,
        token: Option<String>,
    ) -> Result<(), ApiError> {
        Ok(self.store.set_refresh_token(user, token).await?)
    }

    /// Refresh-token rotation: the presented token must match the single
    /// stored value for the user.
    pub async fn verify_stored_refresh_token(
        &self,
        user: Uuid,
        token: &str,
    ) -> Result<User, ApiError> {
        let user = self
            .store
            .user_by_id(user)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".into()))?;
        if user.refresh_token.as_deref() != Some(token) {
            return Err(ApiError::Unauthorized(
                "Refresh token is expired or used".into(),
            ));
        }
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ApiError> {
        if new_password != confirm_password {
            return Err(ApiError::BadRequest(
                "New and confirm password should be same".into(),
            ));
        }
        if new_password.is_empty() {
            return Err(ApiError::BadRequest("New password is required".into()));
        }
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
        let valid = bcrypt::verify(old_password, &user.password_hash)
            .map_err(|e| ApiError::Internal(anyhow!(e)))?;
        if !valid {
            return Err(ApiError::BadRequest("Invalid old password".into()));
        }
        let password_hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
            .map_err(|e| ApiError::Internal(anyhow!(e)))?;
        Ok(self.store.set_password(user_id, password_hash).await?)
    }

    pub async fn update_account(
        &self,
        user_id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<User, ApiError> {
        if full_name.trim().is_empty() || email.trim().is_empty() {
            return Err(ApiError::BadRequest("All fields are required".into()));
        }
        Ok(self
            .store
            .update_account(
                user_id,
                full_name.trim().to_string(),
                email.trim().to_lowercase(),
            )
            .await?)
    }

    /// Upload first, apply, then best-effort delete of the replaced asset.
    /// A failed delete is logged and never rolls back the applied URL.
    pub async fn update_avatar(&self, user_id: Uuid, upload: FileUpload) -> Result<User, ApiError> {
        let asset = self
            .media
            .upload(&upload.filename, upload.bytes, MediaKind::Image)
            .await?;
        let (user, old_asset) = match self
            .store
            .set_avatar(user_id, asset.url.clone(), asset.identifier.clone())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                self.discard_asset(&asset.identifier, MediaKind::Image).await;
                return Err(e.into());
            }
        };
        self.discard_asset(&old_asset, MediaKind::Image).await;
        Ok(user)
    }

    pub async fn update_cover(&self, user_id: Uuid, upload: FileUpload) -> Result<User, ApiError> {
        let asset = self
            .media
            .upload(&upload.filename, upload.bytes, MediaKind::Image)
            .await?;
        let (user, old_asset) = match self
            .store
            .set_cover(user_id, asset.url.clone(), asset.identifier.clone())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                self.discard_asset(&asset.identifier, MediaKind::Image).await;
                return Err(e.into());
            }
        };
        if let Some(old_asset) = old_asset {
            self.discard_asset(&old_asset, MediaKind::Image).await;
        }
        Ok(user)
    }

    // ----- videos -----

    pub async fn publish_video(
        &self,
        owner: Uuid,
        title: &str,
        description: &str,
        video_file: FileUpload,
        thumbnail: FileUpload,
    ) -> Result<Video, ApiError> {
        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Title and description are required".into(),
            ));
        }

        let video_asset = self
            .media
            .upload(&video_file.filename, video_file.bytes, MediaKind::Video)
            .await?;
        let thumbnail_asset = match self
            .media
            .upload(&thumbnail.filename, thumbnail.bytes, MediaKind::Image)
            .await
        {
            Ok(asset) => asset,
            Err(e) => {
                self.discard_asset(&video_asset.identifier, MediaKind::Video)
                    .await;
                return Err(e.into());
            }
        };

        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            owner,
            video_file: video_asset.url.clone(),
            video_asset_id: video_asset.identifier.clone(),
            thumbnail: thumbnail_asset.url.clone(),
            thumbnail_asset_id: thumbnail_asset.identifier.clone(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            duration: video_asset.duration.unwrap_or(0.0),
            views: 0,
            is_published: true,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.store.insert_video(video.clone()).await {
            self.discard_asset(&video_asset.identifier, MediaKind::Video)
                .await;
            self.discard_asset(&thumbnail_asset.identifier, MediaKind::Image)
                .await;
            return Err(e.into());
        }
        Ok(video)
    }

    async fn owned_video(&self, actor: Uuid, video_id: Uuid) -> Result<Video, ApiError> {
        let video = self
            .store
            .video_by_id(video_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Video not found".into()))?;
        if video.owner != actor {
            return Err(ApiError::Forbidden(
                "You are not allowed to modify another user's video".into(),
            ));
        }
        Ok(video)
    }

    pub async fn update_video(
        &self,
        actor: Uuid,
        video_id: Uuid,
        title: &str,
        description: &str,
        thumbnail: Option<FileUpload>,
    ) -> Result<Video, ApiError> {
        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Title and description are required".into(),
            ));
        }
        let current = self.owned_video(actor, video_id).await?;

        let new_thumbnail = match thumbnail {
            Some(upload) => {
                let asset = self
                    .media
                    .upload(&upload.filename, upload.bytes, MediaKind::Image)
                    .await?;
                Some(asset)
            }
            None => None,
        };

        let updated = match self
            .store
            .update_video_details(
                video_id,
                title.trim().to_string(),
                description.trim().to_string(),
                new_thumbnail
                    .as_ref()
                    .map(|a| (a.url.clone(), a.identifier.clone())),
            )
            .await
        {
            Ok(video) => video,
            Err(e) => {
                if let Some(asset) = &new_thumbnail {
                    self.discard_asset(&asset.identifier, MediaKind::Image).await;
                }
                return Err(e.into());
            }
        };

        if new_thumbnail.is_some() {
            self.discard_asset(&current.thumbnail_asset_id, MediaKind::Image)
                .await;
        }
        Ok(updated)
    }

    pub async fn delete_video(&self, actor: Uuid, video_id: Uuid) -> Result<(), ApiError> {
        self.owned_video(actor, video_id).await?;
        let removed = self.store.delete_video(video_id).await?;
        self.discard_asset(&removed.video_asset_id, MediaKind::Video)
            .await;
        self.discard_asset(&removed.thumbnail_asset_id, MediaKind::Image)
            .await;
        Ok(())
    }

    pub async fn toggle_publish(&self, actor: Uuid, video_id: Uuid) -> Result<Video, ApiError> {
        let video = self.owned_video(actor, video_id).await?;
        Ok(self
            .store
            .set_published(video_id, !video.is_published)
            .await?)
    }

    pub async fn record_view(&self, viewer: Uuid, video_id: Uuid) -> Result<u64, ApiError> {
        Ok(self.store.record_view(viewer, video_id).await?)
    }

    pub async fn clear_watch_history(&self, viewer: Uuid) -> Result<(), ApiError> {
        Ok(self.store.clear_watch_history(viewer).await?)
    }

    pub async fn remove_watch_entry(&self, viewer: Uuid, video_id: Uuid) -> Result<(), ApiError> {
        Ok(self.store.remove_watch_entry(viewer, video_id).await?)
    }

    // ----- comments -----

    pub async fn add_comment(
        &self,
        actor: Uuid,
        video_id: Uuid,
        content: &str,
    ) -> Result<Comment, ApiError> {
        if content.trim().is_empty() {
            return Err(ApiError::BadRequest("Content is required".into()));
        }
        if self.store.video_by_id(video_id).await?.is_none() {
            return Err(ApiError::NotFound("Video not found".into()));
        }
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            owner: actor,
            video: video_id,
            content: content.trim().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_comment(comment.clone()).await?;
        Ok(comment)
    }

    async fn owned_comment(&self, actor: Uuid, comment_id: Uuid) -> Result<Comment, ApiError> {
        let comment = self
            .store
            .comment_by_id(comment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;
        if comment.owner != actor {
            return Err(ApiError::Forbidden(
                "You are not allowed to modify this comment".into(),
            ));
        }
        Ok(comment)
    }

    pub async fn update_comment(
        &self,
        actor: Uuid,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Comment, ApiError> {
        if content.trim().is_empty() {
            return Err(ApiError::BadRequest("Content is required".into()));
        }
        self.owned_comment(actor, comment_id).await?;
        Ok(self
            .store
            .update_comment(comment_id, content.trim().to_string())
            .await?)
    }

    pub async fn delete_comment(&self, actor: Uuid, comment_id: Uuid) -> Result<(), ApiError> {
        self.owned_comment(actor, comment_id).await?;
        Ok(self.store.delete_comment(comment_id).await?)
    }

    // ----- toggles -----

    /// One store call flips the edge; the fresh count comes back with the
    /// new state so callers need not re-query.
    pub async fn toggle_like(
        &self,
        actor: Uuid,
        target: LikeTarget,
    ) -> Result<LikeToggle, ApiError> {
        let liked = self.store.toggle_like(actor, target).await?;
        let total_likes = self.store.count_likes(target).await?;
        Ok(LikeToggle { liked, total_likes })
    }

    pub async fn toggle_subscription(
        &self,
        actor: Uuid,
        channel: Uuid,
    ) -> Result<SubscriptionToggle, ApiError> {
        if actor == channel {
            return Err(ApiError::BadRequest(
                "You cannot subscribe to your own channel".into(),
            ));
        }
        if self.store.user_by_id(channel).await?.is_none() {
            return Err(ApiError::NotFound("Channel not found".into()));
        }
        let subscribed = self.store.toggle_subscription(actor, channel).await?;
        let total_subscribers = self.store.count_subscribers(channel).await?;
        Ok(SubscriptionToggle {
            subscribed,
            total_subscribers,
        })
    }

    // ----- playlists -----

    pub async fn create_playlist(
        &self,
        actor: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Playlist, ApiError> {
        if name.trim().is_empty() || description.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Both playlist name and description required".into(),
            ));
        }
        let now = Utc::now();
        let playlist = Playlist {
            id: Uuid::new_v4(),
            owner: actor,
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            videos: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_playlist(playlist.clone()).await?;
        Ok(playlist)
    }

    async fn owned_playlist(&self, actor: Uuid, playlist_id: Uuid) -> Result<Playlist, ApiError> {
        let playlist = self
            .store
            .playlist_by_id(playlist_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Playlist not found".into()))?;
        if playlist.owner != actor {
            return Err(ApiError::Forbidden(
                "You are not allowed to modify this playlist".into(),
            ));
        }
        Ok(playlist)
    }

    pub async fn update_playlist(
        &self,
        actor: Uuid,
        playlist_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Playlist, ApiError> {
        if name.trim().is_empty() || description.trim().is_empty() {
            return Err(ApiError::BadRequest("All the fields are required".into()));
        }
        self.owned_playlist(actor, playlist_id).await?;
        Ok(self
            .store
            .update_playlist_details(
                playlist_id,
                name.trim().to_string(),
                description.trim().to_string(),
            )
            .await?)
    }

    pub async fn delete_playlist(&self, actor: Uuid, playlist_id: Uuid) -> Result<(), ApiError> {
        self.owned_playlist(actor, playlist_id).await?;
        Ok(self.store.delete_playlist(playlist_id).await?)
    }

    pub async fn add_playlist_video(
        &self,
        actor: Uuid,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<Playlist, ApiError> {
        self.owned_playlist(actor, playlist_id).await?;
        if self.store.video_by_id(video_id).await?.is_none() {
            return Err(ApiError::NotFound("Video not found".into()));
        }
        Ok(self.store.add_playlist_video(playlist_id, video_id).await?)
    }

    pub async fn remove_playlist_video(
        &self,
        actor: Uuid,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<Playlist, ApiError> {
        self.owned_playlist(actor, playlist_id).await?;
        Ok(self
            .store
            .remove_playlist_video(playlist_id, video_id)
            .await?)
    }
}
