//! Read-path behavior: joined projections, feed pagination and sorting,
//! aggregate counts, and the empty-vs-missing distinction.

mod common;

use uuid::Uuid;

use common::{seed_playlist, seed_user, seed_video, test_app};
use vidtube::db::models::LikeTarget;
use vidtube::db::{DataStore, LikeRepo, PlaylistRepo, SubscriptionRepo, VideoRepo};
use vidtube::error::ApiError;
use vidtube::services::views::{FeedParams, SortField};

#[tokio::test]
async fn channel_profile_reports_counts_and_viewer_flag() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let bob = seed_user(&app.store, "bob").await;
    let carol = seed_user(&app.store, "carol").await;

    app.store.toggle_subscription(bob.id, alice.id).await.unwrap();
    app.store.toggle_subscription(carol.id, alice.id).await.unwrap();
    app.store.toggle_subscription(alice.id, bob.id).await.unwrap();

    let profile = app
        .views
        .channel_profile("alice", Some(bob.id))
        .await
        .unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.subscribers_count, 2);
    assert_eq!(profile.channels_subscribed_to_count, 1);
    assert!(profile.is_subscribed);

    let anonymous = app.views.channel_profile("alice", None).await.unwrap();
    assert!(!anonymous.is_subscribed);
}

#[tokio::test]
async fn channel_profile_for_unknown_username_is_not_found() {
    let app = test_app();
    let err = app
        .views
        .channel_profile("nobody", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn feed_pages_concatenate_to_the_full_result_set() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let mut all_ids = Vec::new();
    for i in 0..25 {
        let video = seed_video(&app.store, alice.id, &format!("video-{i:02}"), 1000 - i).await;
        all_ids.push(video.id);
    }

    let mut seen = Vec::new();
    for page in 1..=3u64 {
        let params = FeedParams {
            page,
            limit: 10,
            ..FeedParams::default()
        };
        let results = app.views.video_feed(&params).await.unwrap();
        let expected = if page == 3 { 5 } else { 10 };
        assert_eq!(results.len(), expected, "page {page}");
        seen.extend(results.iter().map(|v| v.id));
    }

    assert_eq!(seen.len(), 25);
    let mut unique = seen.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 25, "pages overlap");

    // Default sort is newest first; video-24 has the smallest age.
    let params = FeedParams::default();
    let first_page = app.views.video_feed(&params).await.unwrap();
    assert_eq!(first_page[0].title, "video-24");
    assert_eq!(first_page[9].title, "video-15");
}

#[tokio::test]
async fn feed_beyond_the_last_page_is_an_empty_list() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    seed_video(&app.store, alice.id, "only", 10).await;

    let params = FeedParams {
        page: 5,
        ..FeedParams::default()
    };
    let results = app.views.video_feed(&params).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn astronomical_page_numbers_yield_empty_results() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let video = seed_video(&app.store, alice.id, "only", 10).await;

    let params = FeedParams {
        page: u64::MAX,
        ..FeedParams::default()
    };
    let results = app.views.video_feed(&params).await.unwrap();
    assert!(results.is_empty());

    let comments = app
        .views
        .video_comments(video.id, u64::MAX, 10)
        .await
        .unwrap();
    assert!(comments.is_empty());
}

#[tokio::test]
async fn feed_matches_title_or_description_case_insensitively() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    seed_video(&app.store, alice.id, "Rust Tutorial", 30).await;
    seed_video(&app.store, alice.id, "cooking", 20).await;
    // The description of every seeded video mentions its title.
    seed_video(&app.store, alice.id, "gardening RUSTIC", 10).await;

    let params = FeedParams {
        query: "rust".to_string(),
        ..FeedParams::default()
    };
    let results = app.views.video_feed(&params).await.unwrap();
    let titles: Vec<&str> = results.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, vec!["gardening RUSTIC", "Rust Tutorial"]);
}

#[tokio::test]
async fn feed_excludes_unpublished_videos() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let hidden = seed_video(&app.store, alice.id, "hidden", 20).await;
    seed_video(&app.store, alice.id, "visible", 10).await;
    app.store.set_published(hidden.id, false).await.unwrap();

    let results = app.views.video_feed(&FeedParams::default()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "visible");
}

#[tokio::test]
async fn feed_sort_ties_break_by_id_ascending() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    // All three have zero views, so the views sort is one big tie.
    let a = seed_video(&app.store, alice.id, "a", 30).await;
    let b = seed_video(&app.store, alice.id, "b", 20).await;
    let c = seed_video(&app.store, alice.id, "c", 10).await;
    let mut expected = vec![a.id, b.id, c.id];
    expected.sort();

    let params = FeedParams {
        sort_by: SortField::Views,
        descending: true,
        ..FeedParams::default()
    };
    let descending: Vec<Uuid> = app
        .views
        .video_feed(&params)
        .await
        .unwrap()
        .iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(descending, expected);

    let params = FeedParams {
        sort_by: SortField::Views,
        descending: false,
        ..FeedParams::default()
    };
    let ascending: Vec<Uuid> = app
        .views
        .video_feed(&params)
        .await
        .unwrap()
        .iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(ascending, expected);
}

#[tokio::test]
async fn feed_joins_owner_summary_fields() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    seed_video(&app.store, alice.id, "joined", 10).await;

    let results = app.views.video_feed(&FeedParams::default()).await.unwrap();
    assert_eq!(results.len(), 1);
    let owner = &results[0].created_by;
    assert_eq!(owner.id, alice.id);
    assert_eq!(owner.username, "alice");
    assert_eq!(owner.avatar, alice.avatar_url);
}

#[tokio::test]
async fn liked_videos_only_resolves_video_targets() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let bob = seed_user(&app.store, "bob").await;
    let video = seed_video(&app.store, alice.id, "liked", 10).await;

    app.store
        .toggle_like(bob.id, LikeTarget::Video(video.id))
        .await
        .unwrap();
    app.store
        .toggle_like(bob.id, LikeTarget::Comment(Uuid::new_v4()))
        .await
        .unwrap();
    app.store
        .toggle_like(bob.id, LikeTarget::Tweet(Uuid::new_v4()))
        .await
        .unwrap();

    let liked = app.views.liked_videos(bob.id).await.unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].video.id, video.id);
    assert_eq!(liked[0].liked_by, bob.id);
}

#[tokio::test]
async fn playlist_view_preserves_stored_video_order() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let playlist = seed_playlist(&app.store, alice.id, "mix").await;
    // Creation order is oldest first, insertion order is newest first.
    let old = seed_video(&app.store, alice.id, "old", 300).await;
    let mid = seed_video(&app.store, alice.id, "mid", 200).await;
    let new = seed_video(&app.store, alice.id, "new", 100).await;
    for id in [new.id, old.id, mid.id] {
        app.store.add_playlist_video(playlist.id, id).await.unwrap();
    }

    let view = app.views.playlist_by_id(playlist.id).await.unwrap();
    let ids: Vec<Uuid> = view.videos.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![new.id, old.id, mid.id]);
    assert_eq!(view.created_by.as_ref().unwrap().username, "alice");
}

#[tokio::test]
async fn user_playlists_for_unknown_user_is_not_found() {
    let app = test_app();
    let err = app.views.user_playlists(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let alice = seed_user(&app.store, "alice").await;
    let playlists = app.views.user_playlists(alice.id).await.unwrap();
    assert!(playlists.is_empty());
}

#[tokio::test]
async fn channel_stats_are_zero_for_an_empty_channel() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let stats = app.views.channel_stats(alice.id).await.unwrap();
    assert_eq!(stats.total_videos, 0);
    assert_eq!(stats.total_views, 0);
    assert_eq!(stats.total_subscribers, 0);
    assert_eq!(stats.total_likes, 0);
}

#[tokio::test]
async fn channel_stats_count_likes_across_the_channels_videos_only() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let bob = seed_user(&app.store, "bob").await;
    let carol = seed_user(&app.store, "carol").await;
    let first = seed_video(&app.store, alice.id, "first", 30).await;
    let second = seed_video(&app.store, alice.id, "second", 20).await;
    let other = seed_video(&app.store, bob.id, "other", 10).await;

    for viewer in [bob.id, carol.id] {
        app.store.record_view(viewer, first.id).await.unwrap();
    }
    app.store.record_view(bob.id, second.id).await.unwrap();

    app.store
        .toggle_like(bob.id, LikeTarget::Video(first.id))
        .await
        .unwrap();
    app.store
        .toggle_like(carol.id, LikeTarget::Video(first.id))
        .await
        .unwrap();
    app.store
        .toggle_like(bob.id, LikeTarget::Video(second.id))
        .await
        .unwrap();
    // A like on bob's video must not count toward alice.
    app.store
        .toggle_like(carol.id, LikeTarget::Video(other.id))
        .await
        .unwrap();
    // Comment likes never reach video stats.
    app.store
        .toggle_like(carol.id, LikeTarget::Comment(Uuid::new_v4()))
        .await
        .unwrap();

    app.store.toggle_subscription(bob.id, alice.id).await.unwrap();

    let stats = app.views.channel_stats(alice.id).await.unwrap();
    assert_eq!(stats.total_videos, 2);
    assert_eq!(stats.total_views, 3);
    assert_eq!(stats.total_subscribers, 1);
    assert_eq!(stats.total_likes, 3);

    // The aggregate agrees with the subscriber listing.
    let listed = app.store.subscriptions_to(alice.id).await.unwrap();
    assert_eq!(stats.total_subscribers, listed.len() as u64);
}

#[tokio::test]
async fn watch_history_keeps_order_and_skips_deleted_videos() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let bob = seed_user(&app.store, "bob").await;
    let first = seed_video(&app.store, alice.id, "first", 30).await;
    let second = seed_video(&app.store, alice.id, "second", 20).await;
    let third = seed_video(&app.store, alice.id, "third", 10).await;

    for id in [second.id, first.id, third.id] {
        app.store.record_view(bob.id, id).await.unwrap();
    }
    app.store.delete_video(first.id).await.unwrap();

    let history = app.views.watch_history(bob.id).await.unwrap();
    let ids: Vec<Uuid> = history.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![second.id, third.id]);
}

#[tokio::test]
async fn video_comments_require_an_existing_video() {
    let app = test_app();
    let err = app
        .views
        .video_comments(Uuid::new_v4(), 1, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn dashboard_videos_include_unpublished_ones() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let hidden = seed_video(&app.store, alice.id, "draft", 20).await;
    seed_video(&app.store, alice.id, "live", 10).await;
    app.store.set_published(hidden.id, false).await.unwrap();

    let videos = app.views.channel_videos(alice.id).await.unwrap();
    assert_eq!(videos.len(), 2);
    let draft = videos.iter().find(|v| v.video.title == "draft").unwrap();
    assert!(!draft.is_published);
}

#[tokio::test]
async fn subscribed_channels_list_matches_the_count() {
    let app = test_app();
    let alice = seed_user(&app.store, "alice").await;
    let bob = seed_user(&app.store, "bob").await;
    let carol = seed_user(&app.store, "carol").await;
    app.store.toggle_subscription(alice.id, bob.id).await.unwrap();
    app.store
        .toggle_subscription(alice.id, carol.id)
        .await
        .unwrap();

    let subscribed = app.views.subscribed_channels(alice.id).await.unwrap();
    assert_eq!(subscribed.total_count, 2);
    assert_eq!(subscribed.channels.len(), 2);

    let empty = app.views.subscribed_channels(carol.id).await.unwrap();
    assert_eq!(empty.total_count, 0);
    assert!(empty.channels.is_empty());
}
