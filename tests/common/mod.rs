//! Shared fixtures: an in-memory store seeded directly, plus a stub media
//! collaborator that records uploads and deletes.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use vidtube::db::memory::MemoryStore;
use vidtube::db::models::{Playlist, User, Video};
use vidtube::db::{DataStore, PlaylistRepo, UserRepo, VideoRepo};
use vidtube::services::media::{MediaAsset, MediaKind, MediaStore};
use vidtube::services::mutations::{FileUpload, MutationCoordinator};
use vidtube::services::views::ViewComposer;

pub struct StubMedia {
    pub uploads: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
}

impl StubMedia {
    pub fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MediaStore for StubMedia {
    async fn upload(&self, _filename: &str, _bytes: Vec<u8>, kind: MediaKind) -> Result<MediaAsset> {
        let identifier = Uuid::new_v4().to_string();
        self.uploads.lock().unwrap().push(identifier.clone());
        Ok(MediaAsset {
            url: format!("http://media.test/{identifier}"),
            identifier,
            duration: matches!(kind, MediaKind::Video).then_some(42.0),
        })
    }

    async fn delete(&self, identifier: &str, _kind: MediaKind) -> Result<()> {
        self.deleted.lock().unwrap().push(identifier.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub media: Arc<StubMedia>,
    pub views: ViewComposer,
    pub mutations: MutationCoordinator,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let media = Arc::new(StubMedia::new());
    let data: Arc<dyn DataStore> = store.clone();
    TestApp {
        views: ViewComposer::new(data.clone()),
        mutations: MutationCoordinator::new(data, media.clone()),
        store,
        media,
    }
}

pub fn upload(name: &str) -> FileUpload {
    FileUpload {
        filename: name.to_string(),
        bytes: vec![0u8; 4],
    }
}

pub async fn seed_user(store: &MemoryStore, username: &str) -> User {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        full_name: format!("{username} surname"),
        password_hash: "$2b$04$invalidhashvalueforseeds".to_string(),
        avatar_url: format!("http://media.test/{username}-avatar.png"),
        avatar_asset_id: format!("{username}-avatar"),
        cover_url: None,
        cover_asset_id: None,
        watch_history: Vec::new(),
        refresh_token: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(user.clone()).await.unwrap();
    user
}

/// `age_seconds` pushes creation into the past so ordering is deterministic.
pub async fn seed_video(store: &MemoryStore, owner: Uuid, title: &str, age_seconds: i64) -> Video {
    let created_at = Utc::now() - Duration::seconds(age_seconds);
    let video = Video {
        id: Uuid::new_v4(),
        owner,
        video_file: format!("http://media.test/{title}.mp4"),
        video_asset_id: format!("{title}.mp4"),
        thumbnail: format!("http://media.test/{title}.jpg"),
        thumbnail_asset_id: format!("{title}.jpg"),
        title: title.to_string(),
        description: format!("about {title}"),
        duration: 30.0,
        views: 0,
        is_published: true,
        created_at,
        updated_at: created_at,
    };
    store.insert_video(video.clone()).await.unwrap();
    video
}

pub async fn seed_playlist(store: &MemoryStore, owner: Uuid, name: &str) -> Playlist {
    let now = Utc::now();
    let playlist = Playlist {
        id: Uuid::new_v4(),
        owner,
        name: name.to_string(),
        description: format!("{name} description"),
        videos: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    store.insert_playlist(playlist.clone()).await.unwrap();
    playlist
}
