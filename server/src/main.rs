mod broadcaster;
mod matchmaker;
mod rate_limiter;
mod server_config;
mod session_manager;
mod web_server;
mod ws_handler;

use clap::Parser;
use common::Logger;
use common::config::{ConfigManager, FileContentConfigProvider, YamlConfigSerializer};
use std::path::PathBuf;
use std::time::Duration;

use broadcaster::Broadcaster;
use matchmaker::Matchmaker;
use rate_limiter::RateLimiter;
use server_config::ServerConfig;
use session_manager::SessionManager;
use web_server::WebServerState;

#[derive(Parser)]
#[command(name = "ttt_infinity_server")]
struct Args {
    /// Path to the yaml config; defaults apply when the file is absent.
    #[arg(long, default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_manager: ConfigManager<FileContentConfigProvider, ServerConfig, YamlConfigSerializer> =
        ConfigManager::from_yaml_file(&args.config);
    let config = config_manager.get_config()?;

    let logger = Logger::new(config.log_buffer_capacity);
    logger.info("Tic Tac Toe Infinity server starting");

    let broadcaster = Broadcaster::new(logger.clone());
    let matchmaker = Matchmaker::new();
    let rate_limiter = RateLimiter::new(
        Duration::from_millis(config.rate_limit_window_ms),
        config.max_moves_per_window,
    );
    let session_manager = SessionManager::new(
        broadcaster.clone(),
        matchmaker,
        rate_limiter,
        logger.clone(),
    );

    let state = WebServerState {
        broadcaster,
        session_manager,
        logger: logger.clone(),
    };

    web_server::run_web_server(
        state,
        &config.listen_addr,
        config.static_files_path.clone().map(PathBuf::from),
    )
    .await;

    logger.info("Server shut down gracefully");
    Ok(())
}
