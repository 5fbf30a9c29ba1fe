//! Read-path component. Every operation composes a denormalized projection
//! by joining across the stores (filter, join, project, sort, paginate) and
//! never writes. Listings return empty collections when nothing matches;
//! `NotFound` is reserved for single-entity lookups.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{User, Video};
use crate::db::DataStore;
use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Owner fields embedded in joined views: username, full name, avatar only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

impl OwnerSummary {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar_url.clone(),
        }
    }
}

/// The allow-listed projection of a user's own record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserPublic {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar_url.clone(),
            cover_image: user.cover_url.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub subscribers_count: u64,
    pub channels_subscribed_to_count: u64,
    pub is_subscribed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithOwner {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: OwnerSummary,
}

/// Dashboard variant: the owner also sees the publish state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideo {
    #[serde(flatten)]
    pub video: VideoWithOwner,
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    pub video: VideoWithOwner,
    pub liked_by: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Option<OwnerSummary>,
    pub videos: Vec<VideoWithOwner>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: u64,
    pub total_views: u64,
    pub total_subscribers: u64,
    pub total_likes: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub created_by: OwnerSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannels {
    pub total_count: u64,
    pub channels: Vec<OwnerSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl SortField {
    /// Unknown field names fall back to creation time, the default sort key.
    pub fn parse(name: &str) -> Self {
        match name {
            "views" => SortField::Views,
            "duration" => SortField::Duration,
            "title" => SortField::Title,
            _ => SortField::CreatedAt,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedParams {
    pub query: String,
    pub sort_by: SortField,
    pub descending: bool,
    pub page: u64,
    pub limit: u64,
}

impl Default for FeedParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            sort_by: SortField::CreatedAt,
            descending: true,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FeedParams {
    fn page(&self) -> u64 {
        self.page.max(1)
    }

    fn limit(&self) -> u64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

pub struct ViewComposer {
    store: Arc<dyn DataStore>,
}

impl ViewComposer {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Map of owner summaries for a batch of videos, skipping dangling refs.
    async fn owner_summaries(
        &self,
        videos: &[Video],
    ) -> Result<HashMap<Uuid, OwnerSummary>, ApiError> {
        let mut owners = HashMap::new();
        for video in videos {
            if owners.contains_key(&video.owner) {
                continue;
            }
            if let Some(user) = self.store.user_by_id(video.owner).await? {
                owners.insert(video.owner, OwnerSummary::from_user(&user));
            }
        }
        Ok(owners)
    }

    fn join_owner(video: &Video, owners: &HashMap<Uuid, OwnerSummary>) -> Option<VideoWithOwner> {
        let created_by = owners.get(&video.owner)?.clone();
        Some(VideoWithOwner {
            id: video.id,
            video_file: video.video_file.clone(),
            thumbnail: video.thumbnail.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            duration: video.duration,
            views: video.views,
            created_at: video.created_at,
            created_by,
        })
    }

    pub async fn current_user(&self, id: Uuid) -> Result<UserPublic, ApiError> {
        let user = self
            .store
            .user_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
        Ok(UserPublic::from_user(&user))
    }

    /// Channel profile with snapshot subscriber/subscription counts and the
    /// viewer's subscription flag. Counts are exact at query time and do not
    /// depend on subscription insertion order.
    pub async fn channel_profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
    ) -> Result<ChannelProfile, ApiError> {
        let user = self
            .store
            .user_by_username(&username.trim().to_lowercase())
            .await?
            .ok_or_else(|| ApiError::NotFound("Channel does not exist".into()))?;

        let subscribers_count = self.store.count_subscribers(user.id).await?;
        let channels_subscribed_to_count = self.store.count_subscriptions(user.id).await?;
        let is_subscribed = match viewer {
            Some(viewer) => self.store.is_subscribed(viewer, user.id).await?,
            None => false,
        };

        Ok(ChannelProfile {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            avatar: user.avatar_url,
            cover_image: user.cover_url,
            subscribers_count,
            channels_subscribed_to_count,
            is_subscribed,
            created_at: user.created_at,
        })
    }

    /// Published videos matching the query, with owner summaries, sorted and
    /// paginated. Ties on the sort key break by id ascending so that pages
    /// concatenate without gaps or duplicates.
    pub async fn video_feed(&self, params: &FeedParams) -> Result<Vec<VideoWithOwner>, ApiError> {
        let needle = params.query.to_lowercase();
        let mut matched: Vec<Video> = self
            .store
            .videos()
            .await?
            .into_iter()
            .filter(|v| v.is_published)
            .filter(|v| {
                needle.is_empty()
                    || v.title.to_lowercase().contains(&needle)
                    || v.description.to_lowercase().contains(&needle)
            })
            .collect();

        let sort_by = params.sort_by;
        let descending = params.descending;
        matched.sort_by(|a, b| {
            let primary = match sort_by {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Views => a.views.cmp(&b.views),
                SortField::Duration => a
                    .duration
                    .partial_cmp(&b.duration)
                    .unwrap_or(Ordering::Equal),
                SortField::Title => a.title.cmp(&b.title),
            };
            let primary = if descending { primary.reverse() } else { primary };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        // Saturate so an absurd page number yields an empty page, not overflow.
        let skip = params.page().saturating_sub(1).saturating_mul(params.limit());
        let page: Vec<Video> = matched
            .into_iter()
            .skip(skip as usize)
            .take(params.limit() as usize)
            .collect();

        let owners = self.owner_summaries(&page).await?;
        Ok(page
            .iter()
            .filter_map(|v| Self::join_owner(v, &owners))
            .collect())
    }

    pub async fn video_by_id(&self, id: Uuid) -> Result<VideoWithOwner, ApiError> {
        let video = self
            .store
            .video_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Video not found".into()))?;
        let owners = self.owner_summaries(std::slice::from_ref(&video)).await?;
        Self::join_owner(&video, &owners)
            .ok_or_else(|| ApiError::NotFound("Video owner not found".into()))
    }

    /// Likes of the viewer whose target is a video, joined through to the
    /// video and its owner. Comment and tweet likes are filtered out by the
    /// target discriminant.
    pub async fn liked_videos(&self, viewer: Uuid) -> Result<Vec<LikedVideo>, ApiError> {
        let likes = self.store.likes_by(viewer).await?;
        let mut videos = Vec::new();
        for like in &likes {
            let Some(video_id) = like.target.video_id() else {
                continue;
            };
            if let Some(video) = self.store.video_by_id(video_id).await? {
                videos.push(video);
            }
        }
        let owners = self.owner_summaries(&videos).await?;
        Ok(videos
            .iter()
            .filter_map(|v| Self::join_owner(v, &owners))
            .map(|video| LikedVideo {
                video,
                liked_by: viewer,
            })
            .collect())
    }

    async fn playlist_view(
        &self,
        playlist: crate::db::models::Playlist,
    ) -> Result<PlaylistView, ApiError> {
        let created_by = self
            .store
            .user_by_id(playlist.owner)
            .await?
            .map(|u| OwnerSummary::from_user(&u));

        // Preserve the playlist's stored ordering through the join.
        let mut videos = Vec::new();
        for video_id in &playlist.videos {
            if let Some(video) = self.store.video_by_id(*video_id).await? {
                videos.push(video);
            }
        }
        let owners = self.owner_summaries(&videos).await?;
        let videos = videos
            .iter()
            .filter_map(|v| Self::join_owner(v, &owners))
            .collect();

        Ok(PlaylistView {
            id: playlist.id,
            name: playlist.name,
            description: playlist.description,
            created_by,
            videos,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        })
    }

    pub async fn playlist_by_id(&self, id: Uuid) -> Result<PlaylistView, ApiError> {
        let playlist = self
            .store
            .playlist_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Playlist not found".into()))?;
        self.playlist_view(playlist).await
    }

    pub async fn user_playlists(&self, owner: Uuid) -> Result<Vec<PlaylistView>, ApiError> {
        if self.store.user_by_id(owner).await?.is_none() {
            return Err(ApiError::NotFound("User not found".into()));
        }
        let playlists = self.store.playlists_by_owner(owner).await?;
        let mut views = Vec::with_capacity(playlists.len());
        for playlist in playlists {
            views.push(self.playlist_view(playlist).await?);
        }
        Ok(views)
    }

    /// Four independent sub-aggregates; any with no matching rows yields 0.
    /// Total likes is the two-hop join: likes targeting videos owned by the
    /// channel.
    pub async fn channel_stats(&self, channel: Uuid) -> Result<ChannelStats, ApiError> {
        let videos = self.store.videos_by_owner(channel).await?;
        let total_videos = videos.len() as u64;
        let total_views = videos.iter().map(|v| v.views).sum();
        let total_subscribers = self.store.count_subscribers(channel).await?;
        let video_ids: Vec<Uuid> = videos.iter().map(|v| v.id).collect();
        let total_likes = self.store.count_likes_for_videos(&video_ids).await?;

        Ok(ChannelStats {
            total_videos,
            total_views,
            total_subscribers,
            total_likes,
        })
    }

    /// Every video of the channel, published or not, for the dashboard.
    pub async fn channel_videos(&self, channel: Uuid) -> Result<Vec<ChannelVideo>, ApiError> {
        let videos = self.store.videos_by_owner(channel).await?;
        let owners = self.owner_summaries(&videos).await?;
        Ok(videos
            .iter()
            .filter_map(|v| {
                Self::join_owner(v, &owners).map(|video| ChannelVideo {
                    video,
                    is_published: v.is_published,
                })
            })
            .collect())
    }

    /// Watch history in stored (append) order; deleted videos are skipped.
    pub async fn watch_history(&self, viewer: Uuid) -> Result<Vec<VideoWithOwner>, ApiError> {
        let user = self
            .store
            .user_by_id(viewer)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
        let mut videos = Vec::new();
        for video_id in &user.watch_history {
            if let Some(video) = self.store.video_by_id(*video_id).await? {
                videos.push(video);
            }
        }
        let owners = self.owner_summaries(&videos).await?;
        Ok(videos
            .iter()
            .filter_map(|v| Self::join_owner(v, &owners))
            .collect())
    }

    pub async fn video_comments(
        &self,
        video: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<Vec<CommentWithAuthor>, ApiError> {
        if self.store.video_by_id(video).await?.is_none() {
            return Err(ApiError::NotFound("Video not found".into()));
        }
        let comments = self.store.comments_by_video(video).await?;
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let mut out = Vec::new();
        for comment in comments
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(limit) as usize)
            .take(limit as usize)
        {
            if let Some(author) = self.store.user_by_id(comment.owner).await? {
                out.push(CommentWithAuthor {
                    id: comment.id,
                    content: comment.content,
                    created_at: comment.created_at,
                    created_by: OwnerSummary::from_user(&author),
                });
            }
        }
        Ok(out)
    }

    pub async fn video_like_count(&self, video: Uuid) -> Result<u64, ApiError> {
        Ok(self
            .store
            .count_likes(crate::db::models::LikeTarget::Video(video))
            .await?)
    }

    pub async fn subscriber_count(&self, channel: Uuid) -> Result<u64, ApiError> {
        Ok(self.store.count_subscribers(channel).await?)
    }

    pub async fn subscribed_channels(
        &self,
        subscriber: Uuid,
    ) -> Result<SubscribedChannels, ApiError> {
        let subscriptions = self.store.subscriptions_by(subscriber).await?;
        let total_count = subscriptions.len() as u64;
        let mut channels = Vec::new();
        for subscription in &subscriptions {
            if let Some(user) = self.store.user_by_id(subscription.channel).await? {
                channels.push(OwnerSummary::from_user(&user));
            }
        }
        Ok(SubscribedChannels {
            total_count,
            channels,
        })
    }
}
