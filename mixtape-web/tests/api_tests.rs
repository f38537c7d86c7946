//! Integration tests for mixtape-web API endpoints
//!
//! Tests cover routing, request validation, and the polled lifecycle of
//! both pipelines. The search/download tool is pointed at a nonexistent
//! binary, so provider calls fail fast and deterministically.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mixtape_common::config::Config;
use mixtape_web::services::library_index::LibraryIndex;
use mixtape_web::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

/// Test fixture bundling the router with its backing temp directories.
struct TestApp {
    app: axum::Router,
    state: AppState,
    _dirs: tempfile::TempDir,
}

fn test_config(root: &Path) -> Config {
    Config {
        music_index_path: root.join("music_index.json"),
        playlist_dir: root.join("playlists"),
        download_dir: root.join("downloads"),
        music_root: root.join("music"),
        bind_addr: "127.0.0.1:0".to_string(),
        search_pacing: Duration::ZERO,
        max_download_delay_secs: 0,
        provider_concurrency: 1,
        ytdlp_bin: "/nonexistent/yt-dlp".to_string(),
        auto_tag_script: root.join("no_auto_tag.py"),
        organize_script: root.join("no_organize.py"),
    }
}

/// Build an app over a temp tree, optionally seeding the index file.
fn setup_app(index_json: Option<&str>) -> TestApp {
    let dirs = tempfile::tempdir().unwrap();
    let config = test_config(dirs.path());

    if let Some(json) = index_json {
        let mut file = std::fs::File::create(&config.music_index_path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
    }

    // Degrade to an empty catalog like main does on a broken index
    let library = LibraryIndex::load(&config.music_index_path).unwrap_or_default();
    let state = AppState::new(config, library);
    TestApp {
        app: build_router(state.clone()),
        state,
        _dirs: dirs,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Health and library status
// =============================================================================

#[tokio::test]
async fn health_reports_module_and_version() {
    let t = setup_app(None);
    let response = t.app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mixtape-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn library_status_counts_only_valid_entries() {
    let t = setup_app(Some(
        r#"[
            {"artist":"The Beatles","title":"Let It Be","path":"/m/lib.mp3"},
            {"artist":"Queen","title":"Under Pressure","path":"/m/up.mp3"},
            {"artist":"","title":"Broken","path":"/m/broken.mp3"}
        ]"#,
    ));

    let response = t.app.oneshot(get("/library-status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["indexed"], 2);
    assert!(body["index_path"].as_str().unwrap().ends_with("music_index.json"));
}

#[tokio::test]
async fn root_serves_html_ui() {
    let t = setup_app(None);
    let response = t.app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/html"));
}

// =============================================================================
// Search pipeline endpoints
// =============================================================================

#[tokio::test]
async fn blank_song_list_is_rejected() {
    let t = setup_app(None);
    let response = t
        .app
        .oneshot(post_json("/search-songs", json!({ "song_list": "   \n " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_search_id_is_a_404() {
    let t = setup_app(None);
    let response = t
        .app
        .oneshot(get(
            "/search-results/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_run_is_accepted_and_reaches_a_terminal_state() {
    let t = setup_app(Some(
        r#"[{"artist":"some artist","title":"some song","path":"/m/some.mp3"}]"#,
    ));

    let response = t
        .app
        .clone()
        .oneshot(post_json(
            "/search-songs",
            json!({ "song_list": "Some Artist - Some Song\nnot a song line" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = extract_json(response.into_body()).await;
    let search_id = body["search_id"].as_str().unwrap().to_string();
    assert_eq!(body["message"], "Search started");

    // Poll until the background run finishes
    for _ in 0..100 {
        let response = t
            .app
            .clone()
            .oneshot(get(&format!("/search-results/{search_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = extract_json(response.into_body()).await;
        if body["status"] == "complete" {
            let results = body["results"].as_array().unwrap();
            assert_eq!(results.len(), 2);
            // Provider binary is missing, yet the library match holds and
            // the line degrades to an empty candidate list
            assert_eq!(results[0]["status"], "in_library");
            assert_eq!(results[0]["library_match"]["path"], "/m/some.mp3");
            assert_eq!(results[0]["candidates"].as_array().unwrap().len(), 0);
            // The separator-less line never reaches the provider
            assert_eq!(results[1]["status"], "invalid_format");
            return;
        }
        assert_eq!(body["status"], "processing");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("search run never completed");
}

// =============================================================================
// Download pipeline endpoints
// =============================================================================

#[tokio::test]
async fn empty_download_selection_is_rejected_before_any_mutation() {
    let t = setup_app(None);
    let response = t
        .app
        .clone()
        .oneshot(post_json("/download-selected", json!({ "downloads": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Status record untouched
    let response = t.app.oneshot(get("/download-status")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["running"], false);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn second_download_run_is_refused_while_active() {
    let t = setup_app(None);

    // Occupy the tracker as an active run would
    let _token = t.state.downloads.try_start(1).await.unwrap();

    let response = t
        .app
        .oneshot(post_json(
            "/download-selected",
            json!({ "downloads": [
                { "artist": "A", "title": "B", "youtube_url": "https://example.com/x" }
            ]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn download_run_reaches_terminal_state_even_when_every_job_fails() {
    let t = setup_app(None);

    let response = t
        .app
        .clone()
        .oneshot(post_json(
            "/download-selected",
            json!({ "downloads": [
                { "artist": "A", "title": "One", "youtube_url": "https://example.com/1" },
                { "artist": "B", "title": "Two", "youtube_url": "https://example.com/2" }
            ]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 2);

    for _ in 0..100 {
        let response = t.app.clone().oneshot(get("/download-status")).await.unwrap();
        let body = extract_json(response.into_body()).await;
        if body["complete"] == true {
            assert_eq!(body["running"], false);
            assert_eq!(body["downloaded"], 2);
            assert_eq!(body["total"], 2);
            assert!(body["progress"].as_str().unwrap().contains("Failures: 2"));
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("download run never completed");
}

#[tokio::test]
async fn cancel_without_active_download_is_rejected() {
    let t = setup_app(None);
    let response = t
        .app
        .oneshot(post_json("/download-cancel", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Playlists
// =============================================================================

#[tokio::test]
async fn playlist_round_trip_create_list_download() {
    let t = setup_app(None);

    let response = t
        .app
        .clone()
        .oneshot(post_json(
            "/create-playlist",
            json!({
                "playlist_name": "road trip",
                "songs": [
                    { "library_path": "/a.mp3" },
                    { "download_path": "/b.mp3" },
                    {}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Playlist created: road_trip.m3u");

    // Written file holds exactly the two resolved paths
    let contents = std::fs::read_to_string(body["path"].as_str().unwrap()).unwrap();
    assert_eq!(contents, "/a.mp3\n/b.mp3\n");

    // Listing surfaces the new playlist with a positive size
    let response = t.app.clone().oneshot(get("/playlists")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    let playlists = body.as_array().unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0]["name"], "road_trip");
    assert!(playlists[0]["size"].as_u64().unwrap() > 0);

    // Raw download of the playlist file
    let response = t
        .app
        .oneshot(get("/playlist/road_trip.m3u"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"/a.mp3\n/b.mp3\n");
}

#[tokio::test]
async fn missing_playlist_file_is_a_404() {
    let t = setup_app(None);
    let response = t.app.oneshot(get("/playlist/nope.m3u")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_playlist_requires_songs() {
    let t = setup_app(None);
    let response = t
        .app
        .oneshot(post_json("/create-playlist", json!({ "songs": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Index reload
// =============================================================================

#[tokio::test]
async fn reload_with_missing_file_succeeds_with_zero_tracks() {
    let t = setup_app(Some(r#"[{"artist":"a","title":"t","path":"/p.mp3"}]"#));

    // Verify the seeded catalog, then remove the file and reload
    assert_eq!(t.state.library.read().await.len(), 1);
    std::fs::remove_file(&t.state.config.music_index_path).unwrap();

    let response = t
        .app
        .clone()
        .oneshot(post_json("/reload-index", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["indexed"], 0);

    let response = t.app.oneshot(get("/library-status")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["indexed"], 0);
}

#[tokio::test]
async fn reload_with_malformed_file_is_a_500() {
    let t = setup_app(Some("this is not json"));

    let response = t
        .app
        .oneshot(post_json("/reload-index", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
