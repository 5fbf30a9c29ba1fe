use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user doubles as a channel: the same record owns videos and receives
/// subscriptions. `password_hash` and `refresh_token` never leave the store
/// layer serialized; read views project an allow-list instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub avatar_asset_id: String,
    pub cover_url: Option<String>,
    pub cover_asset_id: Option<String>,
    /// Ordered, duplicate-free list of watched video ids (append order).
    pub watch_history: Vec<Uuid>,
    /// Single active refresh token, cleared on logout.
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub owner: Uuid,
    pub video_file: String,
    #[serde(skip_serializing)]
    pub video_asset_id: String,
    pub thumbnail: String,
    #[serde(skip_serializing)]
    pub thumbnail_asset_id: String,
    pub title: String,
    pub description: String,
    /// Seconds, taken from the upload probe.
    pub duration: f64,
    pub views: u64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub owner: Uuid,
    pub video: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A like always points at exactly one content item; the tagged union makes
/// the one-target invariant structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "targetId", rename_all = "lowercase")]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    pub fn video_id(&self) -> Option<Uuid> {
        match self {
            LikeTarget::Video(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub liked_by: Uuid,
    #[serde(flatten)]
    pub target: LikeTarget,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber: Uuid,
    pub channel: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub description: String,
    /// Ordered, duplicate-free video references.
    pub videos: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
