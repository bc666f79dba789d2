mod commands;

use clap::Parser;
use commands::{execute_command, utils::restore_saved_session, Commands};
use playlist_client::{AppConfig, AppServices};
use std::sync::Arc;

/// Playlist client: manage the shared playlist and your account
#[derive(Parser)]
#[command(name = "playlist", about = "Manage the shared playlist", long_about = None)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = AppConfig::from_env();
    let http = Arc::new(http_client::native::NativeClient::new());
    let services = match AppServices::start(config, http) {
        Ok(services) => services,
        Err(e) => {
            eprintln!("❌ Failed to start: {e}");
            eprintln!();
            eprintln!("Check the PLAYLIST_* environment variables, for example:");
            eprintln!("  PLAYLIST_API_URL=https://host/api/playlist");
            std::process::exit(1);
        }
    };

    restore_saved_session(&services, args.verbose);

    if let Err(e) = execute_command(args.command, &services).await {
        match e.downcast_ref::<playlist_client::PlaylistError>() {
            Some(error) => eprintln!("❌ {} ({error})", error.notice()),
            None => eprintln!("❌ Command failed: {e}"),
        }
        std::process::exit(1);
    }

    services.shutdown();
    Ok(())
}
