use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{PlayerError, PlayerResult};

use super::types::SongId;

/// Fetches audio from an external source into the audio directory.
/// Runs off the state lock; the caller refreshes the catalog afterwards.
#[async_trait]
pub trait DownloadProvider: Send + Sync {
    async fn fetch(&self, source_url: &str) -> PlayerResult<SongId>;
}

/// Downloads through the `yt-dlp` executable, extracting mp3 audio named after the title.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    binary: PathBuf,
    output_dir: PathBuf,
    cookies: Option<PathBuf>,
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            output_dir: output_dir.into(),
            cookies: None,
        }
    }

    pub fn with_cookies(mut self, cookies: Option<PathBuf>) -> Self {
        self.cookies = cookies;
        self
    }

    fn arguments(&self, source_url: &str) -> Vec<String> {
        let template = self.output_dir.join("%(title)s.%(ext)s");

        let mut args = vec![
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--audio-quality".to_string(),
            "320K".to_string(),
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "--no-simulate".to_string(),
            "--output".to_string(),
            template.to_string_lossy().into_owned(),
            // final path once post-processing has renamed the file
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ];

        if let Some(cookies) = &self.cookies {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }

        args.push("--".to_string());
        args.push(source_url.to_string());
        args
    }
}

#[async_trait]
impl DownloadProvider for YtDlpDownloader {
    async fn fetch(&self, source_url: &str) -> PlayerResult<SongId> {
        let output = Command::new(&self.binary)
            .args(self.arguments(source_url))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlayerError::DownloadFailed(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        song_from_output(&stdout).ok_or_else(|| {
            PlayerError::DownloadFailed(format!(
                "{} did not report a file for {}",
                self.binary.display(),
                source_url
            ))
        })
    }
}

/// Picks the file name out of the last path yt-dlp printed.
pub fn song_from_output(stdout: &str) -> Option<SongId> {
    let path = stdout.lines().map(str::trim).filter(|l| !l.is_empty()).last()?;
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}
