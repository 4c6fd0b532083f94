use clap::Parser;

use jam_sync::logging::init_logging;
use jam_sync::{cli, config, player};

#[tokio::main]
async fn main() {
    init_logging();

    let args = cli::Args::parse();

    let file_config = config::find_config_file(args.config.as_deref())
        .and_then(|path| {
            match config::load_config(&path) {
                Ok(cfg) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    Some(cfg)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}", e);
                    None
                }
            }
        });

    let config = config::Config::resolve(file_config, &args);
    tracing::debug!("Resolved configuration: {:?}", config);

    if let Err(e) = player::initialize(config).await {
        tracing::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
