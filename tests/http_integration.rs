use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tempfile::{TempDir, tempdir};
use tokio::sync::mpsc;
use tower::ServiceExt;

use jam_sync::error::{PlayerError, PlayerResult};
use jam_sync::player::{
    AppState, CatalogProvider, DirectoryCatalog, DownloadProvider, DownloadResponse,
    ManualClock, ServerMessage, SharedState, SongId, create_player_router,
};

/// Pretends to download by writing a file named after the last URL segment.
struct FakeDownloader {
    dir: PathBuf,
}

#[async_trait]
impl DownloadProvider for FakeDownloader {
    async fn fetch(&self, source_url: &str) -> PlayerResult<SongId> {
        if source_url.contains("broken") {
            return Err(PlayerError::DownloadFailed("video unavailable".to_string()));
        }
        let name = format!("{}.mp3", source_url.rsplit('/').next().unwrap_or("song"));
        tokio::fs::write(self.dir.join(&name), b"ID3").await?;
        Ok(name)
    }
}

struct Fixture {
    audio: TempDir,
    static_dir: TempDir,
    state: SharedState,
}

impl Fixture {
    async fn new(files: &[(&str, &[u8])]) -> Self {
        let audio = tempdir().unwrap();
        let static_dir = tempdir().unwrap();
        for (name, contents) in files {
            fs::write(audio.path().join(name), contents).unwrap();
        }

        let catalog: Arc<dyn CatalogProvider> = Arc::new(DirectoryCatalog::new(audio.path()));
        let downloader = Arc::new(FakeDownloader {
            dir: audio.path().to_path_buf(),
        });
        let state = AppState::new(audio.path().to_path_buf(), catalog, downloader)
            .with_clock(Arc::new(ManualClock::new(1_000.0)))
            .into_shared();
        state.refresh_catalog().await.unwrap();

        Self {
            audio,
            static_dir,
            state,
        }
    }

    fn app(&self) -> axum::Router {
        create_player_router(self.state.clone(), self.static_dir.path())
    }

    fn audio_path(&self) -> &Path {
        self.audio.path()
    }
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_text(response: axum::response::Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_range(uri: &str, range: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::RANGE, range)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

// ── GET / ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn index_page_renders_html() {
    let fixture = Fixture::new(&[("a.mp3", b"x"), ("b.mp3", b"y")]).await;

    let response = fixture.app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"), "{content_type}");

    let body = body_text(response).await;
    assert!(body.contains("Jam Session"));
    assert!(body.contains("2 song(s)"));
    assert!(body.contains("/ws"));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let fixture = Fixture::new(&[]).await;
    let response = fixture.app().oneshot(get("/nowhere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_files_are_served() {
    let fixture = Fixture::new(&[]).await;
    fs::write(fixture.static_dir.path().join("style.css"), "body {}").unwrap();

    let response = fixture.app().oneshot(get("/static/style.css")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "body {}");
}

// ── GET /audio/{filename} ────────────────────────────────────────────────────

#[tokio::test]
async fn audio_full_file() {
    let fixture = Fixture::new(&[("song.mp3", b"0123456789")]).await;

    let response = fixture.app().oneshot(get("/audio/song.mp3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
    assert_eq!(body_bytes(response).await, b"0123456789");
}

#[tokio::test]
async fn audio_with_spaces_in_name() {
    let fixture = Fixture::new(&[("My Song.ogg", b"abc")]).await;

    let response = fixture.app().oneshot(get("/audio/My%20Song.ogg")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/ogg");
}

#[tokio::test]
async fn audio_byte_range() {
    let fixture = Fixture::new(&[("song.mp3", b"0123456789")]).await;

    let response = fixture
        .app()
        .oneshot(get_range("/audio/song.mp3", "bytes=2-5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2-5/10");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "4");
    assert_eq!(body_bytes(response).await, b"2345");
}

#[tokio::test]
async fn audio_open_ended_and_suffix_ranges() {
    let fixture = Fixture::new(&[("song.wav", b"0123456789")]).await;

    let response = fixture
        .app()
        .oneshot(get_range("/audio/song.wav", "bytes=7-"))
        .await
        .unwrap();
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 7-9/10");
    assert_eq!(body_bytes(response).await, b"789");

    let response = fixture
        .app()
        .oneshot(get_range("/audio/song.wav", "bytes=-3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(body_bytes(response).await, b"789");
}

#[tokio::test]
async fn audio_range_past_end_is_416() {
    let fixture = Fixture::new(&[("song.mp3", b"0123456789")]).await;

    let response = fixture
        .app()
        .oneshot(get_range("/audio/song.mp3", "bytes=10-20"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */10");
}

#[tokio::test]
async fn audio_missing_file_is_404() {
    let fixture = Fixture::new(&[]).await;
    let response = fixture.app().oneshot(get("/audio/nope.mp3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audio_directory_is_404() {
    let fixture = Fixture::new(&[]).await;
    fs::create_dir(fixture.audio_path().join("folder.mp3")).unwrap();

    let response = fixture.app().oneshot(get("/audio/folder.mp3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audio_path_escape_is_rejected() {
    let fixture = Fixture::new(&[]).await;

    let response = fixture
        .app()
        .oneshot(get("/audio/..%2Fsecret.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = fixture.app().oneshot(get("/audio/%2E%2E")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn audio_with_dots_in_title_streams() {
    let fixture = Fixture::new(&[("Wait... What.mp3", b"abc")]).await;
    assert!(fixture.state.playback.lock().available_songs().contains("Wait... What.mp3"));

    let response = fixture
        .app()
        .oneshot(get("/audio/Wait...%20What.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"abc");
}

#[tokio::test]
async fn audio_backwards_range_serves_full_file() {
    let fixture = Fixture::new(&[("song.mp3", b"0123456789")]).await;

    let response = fixture
        .app()
        .oneshot(get_range("/audio/song.mp3", "bytes=9-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"0123456789");
}

// ── POST /download-youtube ───────────────────────────────────────────────────

#[tokio::test]
async fn download_without_url_is_400() {
    let fixture = Fixture::new(&[]).await;

    let response = fixture
        .app()
        .oneshot(post_json("/download-youtube", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = fixture
        .app()
        .oneshot(post_json("/download-youtube", r#"{"url": "   "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_with_non_http_url_is_400() {
    let fixture = Fixture::new(&[]).await;

    let response = fixture
        .app()
        .oneshot(post_json("/download-youtube", r#"{"url": "file:///etc/passwd"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_adds_song_and_broadcasts_catalog() {
    let fixture = Fixture::new(&[("old.mp3", b"x")]).await;
    let (tx, mut rx) = mpsc::channel(8);
    fixture.state.connections.register(tx);

    let response = fixture
        .app()
        .oneshot(post_json(
            "/download-youtube",
            r#"{"url": "https://youtube.example/watch/fresh"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let result: DownloadResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(result.success);
    assert_eq!(result.filename, "fresh.mp3");

    let expected: BTreeSet<SongId> = ["fresh.mp3", "old.mp3"].iter().map(|s| s.to_string()).collect();
    assert_eq!(fixture.state.playback.lock().available_songs(), &expected);

    let payload = rx.try_recv().unwrap();
    let ServerMessage::StateUpdate(snapshot) = serde_json::from_str(payload.as_str()).unwrap();
    assert_eq!(snapshot.available_songs, vec!["fresh.mp3", "old.mp3"]);
}

#[tokio::test]
async fn failed_download_is_500_and_changes_nothing() {
    let fixture = Fixture::new(&[("old.mp3", b"x")]).await;
    let (tx, mut rx) = mpsc::channel(8);
    fixture.state.connections.register(tx);

    let response = fixture
        .app()
        .oneshot(post_json(
            "/download-youtube",
            r#"{"url": "https://youtube.example/watch/broken"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("video unavailable"));

    assert_eq!(fixture.state.playback.lock().available_songs().len(), 1);
    assert!(rx.try_recv().is_err());
}
