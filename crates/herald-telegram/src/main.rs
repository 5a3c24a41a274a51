//! Torrent Herald binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx TELEGRAM_CHAT_ID=123 QB_URL=http://localhost:8080 \
//!     cargo run -p herald-telegram
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use herald_core::{config, AppConfig};
use herald_telegram::HeraldBot;
use tracing_subscriber::EnvFilter;

/// Torrent Herald - qBittorrent from Telegram, with download notifications
#[derive(Parser, Debug)]
#[command(name = "torrent-herald")]
#[command(about = "Telegram bot for qBittorrent with completion notifications")]
struct Args {
    /// Env file to load instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Seconds between torrent list polls (overrides POLL_INTERVAL)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: Option<u64>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Env files first so RUST_LOG from them applies
    config::load_env_files(args.env_file.as_deref())?;

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => "herald_telegram=info,herald_monitor=info,teloxide=warn",
        1 => "herald_telegram=debug,herald_monitor=debug,herald_qbittorrent=debug,herald_jackett=debug,teloxide=info",
        2 => "herald_telegram=trace,herald_monitor=trace,herald_qbittorrent=trace,herald_jackett=trace,teloxide=debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut app_config = AppConfig::from_env()?;
    if let Some(secs) = args.poll_interval {
        app_config.poll_interval = Duration::from_secs(secs);
    }

    let bot = HeraldBot::new(&app_config)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\nTorrent Herald");
            println!("   Bot: @{}", username);
            println!("   qBittorrent: {}", app_config.qb_url);
            println!("   Poll interval: {}s", app_config.poll_interval.as_secs());
            if let Some(jackett) = &app_config.jackett {
                println!("   Jackett: {}", jackett.url);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    // An unreachable qBittorrent is not fatal; the monitor keeps retrying.
    match bot.qbit().version().await {
        Ok(version) => tracing::info!(version = %version, "Connected to qBittorrent"),
        Err(e) => tracing::warn!(error = %e, "qBittorrent not reachable yet"),
    }

    println!("\nOpen Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling().await?;

    Ok(())
}
