use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::PlayerResult;

use super::types::SongId;

/// File extensions that count as playable audio, lowercase.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a"];

/// Produces the full set of playable songs. The result replaces the catalog wholesale.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn refresh(&self) -> PlayerResult<BTreeSet<SongId>>;
}

/// Catalog backed by the audio files sitting directly in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    dir: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl CatalogProvider for DirectoryCatalog {
    async fn refresh(&self) -> PlayerResult<BTreeSet<SongId>> {
        let mut songs = BTreeSet::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!("Skipping non UTF-8 file name: {:?}", entry.file_name());
                continue;
            };

            if !is_audio_file(&filename) {
                continue;
            }

            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {
                    songs.insert(filename);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Cannot stat {}: {}", filename, e),
            }
        }

        tracing::debug!("Scanned {}: {} audio file(s)", self.dir.display(), songs.len());
        Ok(songs)
    }
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_audio_file(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type sent with `/audio/{filename}` responses.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}
