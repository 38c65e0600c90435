//! Library and cover store integration tests

mod common;

use cadence_core::{OperationStatus, PlaylistId, TrackId, TrackMetadata};
use cadence_playback::{CoverStore, Library, PlaybackConfig, LIKED_TITLE};
use common::{GatedFetcher, Harness, MockCatalog, MockEngine};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

fn catalog() -> MockCatalog {
    MockCatalog::new()
        .with_metadata("1", "One")
        .with_metadata("2", "Two")
        .with_metadata("3", "Three")
        .with_liked(&["2", "1"])
        .with_playlist("p1", "Road trip", &["3", "1"])
}

// ===== Playlists =====

#[tokio::test]
async fn test_liked_playlist_comes_first() {
    let library = Library::new(Arc::new(catalog()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _sub = library.subscribe_playlists(move |status| sink.lock().unwrap().push(*status));

    assert_eq!(library.playlists_status(), OperationStatus::Empty);
    library.load_playlists().await.unwrap();

    let playlists = library.playlists().unwrap();
    let titles: Vec<&str> = playlists.iter().map(|p| p.title()).collect();
    assert_eq!(titles, vec![LIKED_TITLE, "Road trip"]);
    assert!(playlists[0].id().is_liked());

    assert_eq!(
        *seen.lock().unwrap(),
        vec![OperationStatus::Pending, OperationStatus::Completed]
    );
}

#[tokio::test]
async fn test_playlist_failure_rejects() {
    let library = Library::new(Arc::new(MockCatalog::new().failing_playlists()));

    assert!(library.load_playlists().await.is_err());
    assert_eq!(library.playlists_status(), OperationStatus::Rejected);
    assert!(library.playlists().is_none());
}

// ===== Track lists =====

#[tokio::test]
async fn test_load_liked_tracks_records_metadata() {
    let library = Library::new(Arc::new(catalog()));
    library.load_playlists().await.unwrap();
    let liked = library.playlist(&PlaylistId::liked()).unwrap();

    assert_eq!(liked.status(), OperationStatus::Empty);
    library.load_tracks(&liked).await.unwrap();

    assert_eq!(liked.status(), OperationStatus::Completed);
    assert_eq!(
        &*liked.tracks().unwrap(),
        &[TrackId::from("2"), TrackId::from("1")]
    );
    assert_eq!(library.track(&TrackId::from("2")).unwrap().title, "Two");
    assert!(library.track(&TrackId::from("3")).is_none());
}

#[tokio::test]
async fn test_load_user_playlist_tracks() {
    let library = Library::new(Arc::new(catalog()));
    library.load_playlists().await.unwrap();
    let road_trip = library.playlist(&PlaylistId::from("p1")).unwrap();

    library.load_tracks(&road_trip).await.unwrap();

    assert_eq!(
        &*road_trip.tracks().unwrap(),
        &[TrackId::from("3"), TrackId::from("1")]
    );
    assert_eq!(library.track(&TrackId::from("3")).unwrap().title, "Three");
}

#[tokio::test]
async fn test_missing_metadata_rejects_track_list() {
    let library = Library::new(Arc::new(
        MockCatalog::new()
            .with_metadata("1", "One")
            .with_playlist("p1", "Broken", &["1", "ghost"]),
    ));
    library.load_playlists().await.unwrap();
    let broken = library.playlist(&PlaylistId::from("p1")).unwrap();

    assert!(library.load_tracks(&broken).await.is_err());
    assert_eq!(broken.status(), OperationStatus::Rejected);
    assert!(broken.tracks().is_none());
}

#[tokio::test]
async fn test_activate_makes_playlist_the_queue() {
    let h = Harness::new(MockCatalog::new(), MockEngine::new(), GatedFetcher::new());
    let library = Library::new(Arc::new(catalog()));
    library.load_playlists().await.unwrap();
    let liked = library.playlist(&PlaylistId::liked()).unwrap();

    // Not loaded yet
    assert!(!library.activate(&liked, &h.orchestrator));
    assert!(h.orchestrator.queue().is_empty());

    library.load_tracks(&liked).await.unwrap();
    assert!(library.activate(&liked, &h.orchestrator));
    assert!(Arc::ptr_eq(&h.orchestrator.queue(), &liked.tracks().unwrap()));
}

// ===== Covers =====

#[tokio::test]
async fn test_cover_is_downloaded_once() {
    let h = Harness::new(
        MockCatalog::new().with_cover("1", b"jpeg"),
        MockEngine::new(),
        GatedFetcher::new(),
    );
    let covers = CoverStore::from_config(
        h.catalog.clone(),
        Arc::clone(&h.cache),
        &PlaybackConfig::default(),
    );

    let first = covers.cover_path(&TrackId::from("1")).await.unwrap().unwrap();
    let second = covers.cover_path(&TrackId::from("1")).await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(std::fs::read(&first).unwrap(), b"jpeg");
    assert_eq!(h.catalog.cover_calls.load(Ordering::SeqCst), 1);
    assert!(h.cache.exists_committed("remote/track/1/cover"));
}

#[tokio::test]
async fn test_concurrent_cover_requests_share_download() {
    let h = Harness::new(
        MockCatalog::new().with_cover("1", b"jpeg"),
        MockEngine::new(),
        GatedFetcher::new(),
    );
    let covers = CoverStore::new(h.catalog.clone(), Arc::clone(&h.cache), "remote", "100x100");
    let id = TrackId::from("1");

    let (a, b) = tokio::join!(covers.cover_path(&id), covers.cover_path(&id));

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(h.catalog.cover_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_track_without_cover() {
    let h = Harness::new(MockCatalog::new(), MockEngine::new(), GatedFetcher::new());
    let covers = CoverStore::new(h.catalog.clone(), Arc::clone(&h.cache), "remote", "100x100");

    assert!(covers.cover_path(&TrackId::from("1")).await.unwrap().is_none());
    assert!(!h.cache.contains("remote/track/1/cover"));
}

#[tokio::test]
async fn test_cover_of_skips_catalog_for_coverless_track() {
    let h = Harness::new(
        MockCatalog::new().with_cover("1", b"jpeg").with_cover("2", b"png"),
        MockEngine::new(),
        GatedFetcher::new(),
    );
    let covers = CoverStore::new(h.catalog.clone(), Arc::clone(&h.cache), "remote", "100x100");

    let plain = TrackMetadata::new("1", "One");
    assert!(covers.cover_of(&plain).await.unwrap().is_none());
    assert_eq!(h.catalog.cover_calls.load(Ordering::SeqCst), 0);

    let mut illustrated = TrackMetadata::new("2", "Two");
    illustrated.has_cover = true;
    let path = covers.cover_of(&illustrated).await.unwrap().unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"png");
    assert_eq!(h.catalog.cover_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cover_does_not_collide_with_audio() {
    let h = Harness::new(
        MockCatalog::new().with_cover("1", b"jpeg"),
        MockEngine::new(),
        GatedFetcher::new(),
    );
    let audio = h.precache("1", b"audio");
    let covers = CoverStore::new(h.catalog.clone(), Arc::clone(&h.cache), "remote", "100x100");

    let cover = covers.cover_path(&TrackId::from("1")).await.unwrap().unwrap();

    assert_ne!(audio, cover);
    assert_eq!(std::fs::read(&audio).unwrap(), b"audio");
}
