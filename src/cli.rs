use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "jam-sync",
    about = "Shared listening room: everyone connected hears the same song at the same position",
    long_about = None,
    version,
)]
pub struct Args {
    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP port to listen on [default: 8000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the playable audio files [default: audio_files]
    #[arg(short, long, value_name = "DIR")]
    pub audio_dir: Option<PathBuf>,

    /// Directory served under /static [default: static]
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// yt-dlp executable used for downloads [default: yt-dlp]
    #[arg(long, value_name = "PATH")]
    pub yt_dlp: Option<PathBuf>,

    /// Cookies file handed to yt-dlp
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Outbound messages buffered per client before it is dropped as too slow [default: 32]
    #[arg(long)]
    pub send_buffer: Option<usize>,

    /// Path to TOML config file (overrides default search: ./jam-sync.toml, ~/.config/jam-sync/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
