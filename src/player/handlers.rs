use axum::Json;
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::{PlayerError, PlayerResult};

use super::catalog::content_type_for;
use super::session::handle_connection;
use super::templates::IndexTemplate;
use super::types::{SharedState, SongId};
use super::validation::{validate_song_name, validate_source_url};

/// Renders the listening room page.
pub async fn index_page(State(state): State<SharedState>) -> IndexTemplate {
    let song_count = state.playback.lock().available_songs().len();

    IndexTemplate {
        title: "Jam Session".to_string(),
        song_count,
        listener_count: state.connections.len(),
    }
}

/// WebSocket entrypoint for the sync protocol. No state is modified here.
pub async fn sync_websocket(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub filename: SongId,
}

/// Downloads a song and announces it to every connected client.
pub async fn download_song(
    State(state): State<SharedState>,
    Json(request): Json<DownloadRequest>,
) -> PlayerResult<Json<DownloadResponse>> {
    let url = validate_source_url(request.url.as_deref())?;
    let filename = state.download_song(url).await?;

    Ok(Json(DownloadResponse {
        success: true,
        filename,
    }))
}

/// Parses a "bytes=start-end" range header into inclusive (start, end) byte offsets.
///
/// `Ok(None)` means there is no usable header and the whole file is served.
/// A well formed range that falls outside the file is an error.
pub fn parse_range_header(headers: &HeaderMap, file_size: u64) -> PlayerResult<Option<(u64, u64)>> {
    let Some(range_str) = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("bytes="))
    else {
        return Ok(None);
    };

    // Multiple ranges are not supported, fall back to the full file
    if range_str.contains(',') {
        return Ok(None);
    }

    let Some((start_str, end_str)) = range_str.trim().split_once('-') else {
        return Ok(None);
    };

    let range = match (start_str.parse::<u64>(), end_str.parse::<u64>()) {
        // "bytes=500-999"; a last-pos before first-pos is not a valid range, ignore it
        (Ok(start), Ok(end)) if end < start => return Ok(None),
        (Ok(start), Ok(end)) => (start, end.min(file_size.saturating_sub(1))),
        // "bytes=500-"
        (Ok(start), Err(_)) if end_str.is_empty() => (start, file_size.saturating_sub(1)),
        // "bytes=-500", the last 500 bytes
        (Err(_), Ok(suffix)) if start_str.is_empty() => {
            if suffix == 0 {
                return Err(PlayerError::RangeNotSatisfiable(file_size));
            }
            (file_size.saturating_sub(suffix), file_size.saturating_sub(1))
        }
        _ => return Ok(None),
    };

    if file_size == 0 || range.0 > range.1 || range.0 >= file_size {
        return Err(PlayerError::RangeNotSatisfiable(file_size));
    }

    Ok(Some(range))
}

/// Streams an audio file from the audio directory, with byte-range support
/// so the browser player can seek.
pub async fn stream_audio(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> PlayerResult<Response> {
    let filename = validate_song_name(&filename)?;
    let file_path = state.audio_dir.join(filename);

    let metadata = match tokio::fs::metadata(&file_path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Err(PlayerError::SongNotFound(filename.to_string())),
    };
    let file_size = metadata.len();
    let content_type = content_type_for(filename);

    let mut file = File::open(&file_path).await?;

    if let Some((start, end)) = parse_range_header(&headers, file_size)? {
        file.seek(std::io::SeekFrom::Start(start)).await?;

        let length = end - start + 1;
        let stream = ReaderStream::with_capacity(file.take(length), 128 * 1024);

        return Ok(Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::ACCEPT_RANGES, "bytes")
            .header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", start, end, file_size),
            )
            .header(header::CONTENT_LENGTH, length.to_string())
            .body(axum::body::Body::from_stream(stream))?);
    }

    let stream = ReaderStream::with_capacity(file, 128 * 1024);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .body(axum::body::Body::from_stream(stream))?)
}

/// Unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
