//! In-memory document store. One write lock spans every check-then-act
//! sequence, so the toggle and record-view primitives are atomic per call.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{Comment, Like, LikeTarget, Playlist, Subscription, User, Video};
use crate::db::{
    CommentRepo, DataStore, LikeRepo, PlaylistRepo, StoreError, StoreResult, SubscriptionRepo,
    UserRepo, VideoRepo,
};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    videos: HashMap<Uuid, Video>,
    comments: HashMap<Uuid, Comment>,
    likes: HashMap<Uuid, Like>,
    subscriptions: HashMap<Uuid, Subscription>,
    playlists: HashMap<Uuid, Playlist>,
}

pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_by_creation<T, K>(iter: impl Iterator<Item = T>, key: K) -> Vec<T>
where
    K: Fn(&T) -> (chrono::DateTime<Utc>, Uuid),
{
    let mut items: Vec<T> = iter.collect();
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Conflict(
                "User already exists with this email or username".into(),
            ));
        }
        inner.users.insert(user.id, user);
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn user_by_login(&self, identifier: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn update_account(
        &self,
        id: Uuid,
        full_name: String,
        email: String,
    ) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .values()
            .any(|u| u.id != id && u.email == email)
        {
            return Err(StoreError::Conflict("Email is already in use".into()));
        }
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        user.full_name = full_name;
        user.email = email;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        user.refresh_token = token;
        Ok(())
    }

    async fn set_avatar(
        &self,
        id: Uuid,
        url: String,
        asset_id: String,
    ) -> StoreResult<(User, String)> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        let previous = std::mem::replace(&mut user.avatar_asset_id, asset_id);
        user.avatar_url = url;
        user.updated_at = Utc::now();
        Ok((user.clone(), previous))
    }

    async fn set_cover(
        &self,
        id: Uuid,
        url: String,
        asset_id: String,
    ) -> StoreResult<(User, Option<String>)> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        let previous = std::mem::replace(&mut user.cover_asset_id, Some(asset_id));
        user.cover_url = Some(url);
        user.updated_at = Utc::now();
        Ok((user.clone(), previous))
    }

    async fn clear_watch_history(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        user.watch_history.clear();
        Ok(())
    }

    async fn remove_watch_entry(&self, id: Uuid, video: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        user.watch_history.retain(|v| *v != video);
        Ok(())
    }
}

#[async_trait]
impl VideoRepo for MemoryStore {
    async fn insert_video(&self, video: Video) -> StoreResult<()> {
        self.inner.write().await.videos.insert(video.id, video);
        Ok(())
    }

    async fn video_by_id(&self, id: Uuid) -> StoreResult<Option<Video>> {
        Ok(self.inner.read().await.videos.get(&id).cloned())
    }

    async fn videos(&self) -> StoreResult<Vec<Video>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_creation(inner.videos.values().cloned(), |v| {
            (v.created_at, v.id)
        }))
    }

    async fn videos_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Video>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_creation(
            inner.videos.values().filter(|v| v.owner == owner).cloned(),
            |v| (v.created_at, v.id),
        ))
    }

    async fn update_video_details(
        &self,
        id: Uuid,
        title: String,
        description: String,
        thumbnail: Option<(String, String)>,
    ) -> StoreResult<Video> {
        let mut inner = self.inner.write().await;
        let video = inner
            .videos
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Video"))?;
        video.title = title;
        video.description = description;
        if let Some((url, asset_id)) = thumbnail {
            video.thumbnail = url;
            video.thumbnail_asset_id = asset_id;
        }
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    async fn set_published(&self, id: Uuid, published: bool) -> StoreResult<Video> {
        let mut inner = self.inner.write().await;
        let video = inner
            .videos
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Video"))?;
        video.is_published = published;
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    async fn delete_video(&self, id: Uuid) -> StoreResult<Video> {
        let mut inner = self.inner.write().await;
        inner.videos.remove(&id).ok_or(StoreError::NotFound("Video"))
    }
}

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn insert_comment(&self, comment: Comment) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .comments
            .insert(comment.id, comment);
        Ok(())
    }

    async fn comment_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.inner.read().await.comments.get(&id).cloned())
    }

    async fn comments_by_video(&self, video: Uuid) -> StoreResult<Vec<Comment>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_creation(
            inner
                .comments
                .values()
                .filter(|c| c.video == video)
                .cloned(),
            |c| (c.created_at, c.id),
        ))
    }

    async fn update_comment(&self, id: Uuid, content: String) -> StoreResult<Comment> {
        let mut inner = self.inner.write().await;
        let comment = inner
            .comments
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Comment"))?;
        comment.content = content;
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("Comment"))
    }
}

#[async_trait]
impl LikeRepo for MemoryStore {
    async fn toggle_like(&self, liked_by: Uuid, target: LikeTarget) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .likes
            .values()
            .find(|l| l.liked_by == liked_by && l.target == target)
            .map(|l| l.id);
        match existing {
            Some(id) => {
                inner.likes.remove(&id);
                Ok(false)
            }
            None => {
                let like = Like {
                    id: Uuid::new_v4(),
                    liked_by,
                    target,
                    created_at: Utc::now(),
                };
                inner.likes.insert(like.id, like);
                Ok(true)
            }
        }
    }

    async fn count_likes(&self, target: LikeTarget) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.likes.values().filter(|l| l.target == target).count() as u64)
    }

    async fn likes_by(&self, liked_by: Uuid) -> StoreResult<Vec<Like>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_creation(
            inner
                .likes
                .values()
                .filter(|l| l.liked_by == liked_by)
                .cloned(),
            |l| (l.created_at, l.id),
        ))
    }

    async fn count_likes_for_videos(&self, videos: &[Uuid]) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .likes
            .values()
            .filter(|l| l.target.video_id().is_some_and(|id| videos.contains(&id)))
            .count() as u64)
    }
}

#[async_trait]
impl SubscriptionRepo for MemoryStore {
    async fn toggle_subscription(&self, subscriber: Uuid, channel: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .subscriptions
            .values()
            .find(|s| s.subscriber == subscriber && s.channel == channel)
            .map(|s| s.id);
        match existing {
            Some(id) => {
                inner.subscriptions.remove(&id);
                Ok(false)
            }
            None => {
                let subscription = Subscription {
                    id: Uuid::new_v4(),
                    subscriber,
                    channel,
                    created_at: Utc::now(),
                };
                inner.subscriptions.insert(subscription.id, subscription);
                Ok(true)
            }
        }
    }

    async fn count_subscribers(&self, channel: Uuid) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .subscriptions
            .values()
            .filter(|s| s.channel == channel)
            .count() as u64)
    }

    async fn count_subscriptions(&self, subscriber: Uuid) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .subscriptions
            .values()
            .filter(|s| s.subscriber == subscriber)
            .count() as u64)
    }

    async fn is_subscribed(&self, subscriber: Uuid, channel: Uuid) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .subscriptions
            .values()
            .any(|s| s.subscriber == subscriber && s.channel == channel))
    }

    async fn subscriptions_to(&self, channel: Uuid) -> StoreResult<Vec<Subscription>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_creation(
            inner
                .subscriptions
                .values()
                .filter(|s| s.channel == channel)
                .cloned(),
            |s| (s.created_at, s.id),
        ))
    }

    async fn subscriptions_by(&self, subscriber: Uuid) -> StoreResult<Vec<Subscription>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_creation(
            inner
                .subscriptions
                .values()
                .filter(|s| s.subscriber == subscriber)
                .cloned(),
            |s| (s.created_at, s.id),
        ))
    }
}

#[async_trait]
impl PlaylistRepo for MemoryStore {
    async fn insert_playlist(&self, playlist: Playlist) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner
            .playlists
            .values()
            .any(|p| p.owner == playlist.owner && p.name == playlist.name)
        {
            return Err(StoreError::Conflict(
                "A playlist with this name already exists".into(),
            ));
        }
        inner.playlists.insert(playlist.id, playlist);
        Ok(())
    }

    async fn playlist_by_id(&self, id: Uuid) -> StoreResult<Option<Playlist>> {
        Ok(self.inner.read().await.playlists.get(&id).cloned())
    }

    async fn playlists_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Playlist>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_creation(
            inner
                .playlists
                .values()
                .filter(|p| p.owner == owner)
                .cloned(),
            |p| (p.created_at, p.id),
        ))
    }

    async fn update_playlist_details(
        &self,
        id: Uuid,
        name: String,
        description: String,
    ) -> StoreResult<Playlist> {
        let mut inner = self.inner.write().await;
        let owner = inner
            .playlists
            .get(&id)
            .ok_or(StoreError::NotFound("Playlist"))?
            .owner;
        if inner
            .playlists
            .values()
            .any(|p| p.id != id && p.owner == owner && p.name == name)
        {
            return Err(StoreError::Conflict(
                "A playlist with this name already exists".into(),
            ));
        }
        let playlist = inner
            .playlists
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Playlist"))?;
        playlist.name = name;
        playlist.description = description;
        playlist.updated_at = Utc::now();
        Ok(playlist.clone())
    }

    async fn add_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Playlist> {
        let mut inner = self.inner.write().await;
        let playlist = inner
            .playlists
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Playlist"))?;
        if playlist.videos.contains(&video) {
            return Err(StoreError::Conflict(
                "Video already exists in the playlist".into(),
            ));
        }
        playlist.videos.push(video);
        playlist.updated_at = Utc::now();
        Ok(playlist.clone())
    }

    async fn remove_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Playlist> {
        let mut inner = self.inner.write().await;
        let playlist = inner
            .playlists
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Playlist"))?;
        if !playlist.videos.contains(&video) {
            return Err(StoreError::Conflict(
                "Video does not exist in the playlist".into(),
            ));
        }
        playlist.videos.retain(|v| *v != video);
        playlist.updated_at = Utc::now();
        Ok(playlist.clone())
    }

    async fn delete_playlist(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .playlists
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("Playlist"))
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn record_view(&self, viewer: Uuid, video: Uuid) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&viewer) {
            return Err(StoreError::NotFound("User"));
        }
        if !inner.videos.contains_key(&video) {
            return Err(StoreError::NotFound("Video"));
        }
        let already_watched = inner
            .users
            .get(&viewer)
            .map(|u| u.watch_history.contains(&video))
            .unwrap_or(false);
        if !already_watched {
            if let Some(user) = inner.users.get_mut(&viewer) {
                user.watch_history.push(video);
            }
            if let Some(v) = inner.videos.get_mut(&video) {
                v.views += 1;
            }
        }
        Ok(inner.videos.get(&video).map(|v| v.views).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::LikeTarget;

    fn sample_user(name: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{name}@example.com"),
            full_name: name.to_string(),
            password_hash: "hash".into(),
            avatar_url: "http://localhost/a.png".into(),
            avatar_asset_id: "a".into(),
            cover_url: None,
            cover_asset_id: None,
            watch_history: Vec::new(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_video(owner: Uuid, title: &str) -> Video {
        let now = Utc::now();
        Video {
            id: Uuid::new_v4(),
            owner,
            video_file: "http://localhost/v.mp4".into(),
            video_asset_id: "v".into(),
            thumbnail: "http://localhost/t.jpg".into(),
            thumbnail_asset_id: "t".into(),
            title: title.to_string(),
            description: String::new(),
            duration: 10.0,
            views: 0,
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let store = MemoryStore::new();
        store.insert_user(sample_user("alice")).await.unwrap();
        let err = store.insert_user(sample_user("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn like_toggle_flips_state() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let target = LikeTarget::Video(Uuid::new_v4());
        assert!(store.toggle_like(user, target).await.unwrap());
        assert_eq!(store.count_likes(target).await.unwrap(), 1);
        assert!(!store.toggle_like(user, target).await.unwrap());
        assert_eq!(store.count_likes(target).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn record_view_is_idempotent_per_viewer() {
        let store = MemoryStore::new();
        let user = sample_user("bob");
        let user_id = user.id;
        store.insert_user(user).await.unwrap();
        let video = sample_video(Uuid::new_v4(), "clip");
        let video_id = video.id;
        store.insert_video(video).await.unwrap();

        assert_eq!(store.record_view(user_id, video_id).await.unwrap(), 1);
        assert_eq!(store.record_view(user_id, video_id).await.unwrap(), 1);
        let history = store.user_by_id(user_id).await.unwrap().unwrap().watch_history;
        assert_eq!(history, vec![video_id]);
    }

    #[tokio::test]
    async fn playlist_membership_is_duplicate_free() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let playlist = Playlist {
            id: Uuid::new_v4(),
            owner: Uuid::new_v4(),
            name: "P1".into(),
            description: "d".into(),
            videos: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let id = playlist.id;
        store.insert_playlist(playlist).await.unwrap();
        let video = Uuid::new_v4();
        store.add_playlist_video(id, video).await.unwrap();
        assert!(matches!(
            store.add_playlist_video(id, video).await.unwrap_err(),
            StoreError::Conflict(_)
        ));
        store.remove_playlist_video(id, video).await.unwrap();
        assert!(matches!(
            store.remove_playlist_video(id, video).await.unwrap_err(),
            StoreError::Conflict(_)
        ));
    }
}
