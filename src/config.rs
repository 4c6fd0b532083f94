use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SEND_BUFFER: usize = 32;

#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub audio_dir: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub yt_dlp: Option<PathBuf>,
    pub cookies: Option<PathBuf>,
    pub send_buffer: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub audio_dir: PathBuf,
    pub static_dir: PathBuf,
    pub yt_dlp: PathBuf,
    pub cookies: Option<PathBuf>,
    pub send_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config::resolve(None, &crate::cli::Args::default())
    }
}

impl Config {
    /// CLI flags win over the config file, which wins over built-in defaults.
    pub fn resolve(file: Option<FileConfig>, args: &crate::cli::Args) -> Self {
        let file = file.unwrap_or_default();
        Config {
            host: args.host.clone().or(file.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            audio_dir: args
                .audio_dir
                .clone()
                .or(file.audio_dir)
                .unwrap_or_else(|| PathBuf::from("audio_files")),
            static_dir: args
                .static_dir
                .clone()
                .or(file.static_dir)
                .unwrap_or_else(|| PathBuf::from("static")),
            yt_dlp: args
                .yt_dlp
                .clone()
                .or(file.yt_dlp)
                .unwrap_or_else(|| PathBuf::from("yt-dlp")),
            cookies: args.cookies.clone().or(file.cookies),
            // zero would make every client look permanently slow
            send_buffer: args
                .send_buffer
                .or(file.send_buffer)
                .unwrap_or(DEFAULT_SEND_BUFFER)
                .max(1),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from("jam-sync.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    if let Some(config_dir) = dirs::config_dir() {
        let xdg_config = config_dir.join("jam-sync").join("config.toml");
        if xdg_config.exists() {
            return Some(xdg_config);
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}
