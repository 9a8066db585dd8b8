#![forbid(unsafe_code)]

//! Builds or updates a YouTube playlist from videos recently published by a
//! configured category of channels. Meant to run from cron or by hand; one
//! invocation does one full pass and exits.
//!
//! Credentials are consumed as-is: an API key in `YOUTUBE_API_KEY` and an
//! OAuth bearer token in `YOUTUBE_ACCESS_TOKEN`. Obtaining or refreshing
//! them is someone else's job.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use std::env;
use std::path::PathBuf;

use tubedigest_tools::config::{AppConfig, DEFAULT_CONFIG_PATH};
use tubedigest_tools::naming;
use tubedigest_tools::playlist::PlaylistManager;
use tubedigest_tools::search::VideoSearcher;
use tubedigest_tools::window::TimeWindow;
use tubedigest_tools::youtube::DataApiClient;

const MAX_RESULTS_PER_CHANNEL: u32 = 50;
const API_KEY_ENV: &str = "YOUTUBE_API_KEY";
const ACCESS_TOKEN_ENV: &str = "YOUTUBE_ACCESS_TOKEN";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Create or update a YouTube playlist from channel videos by category and date."
)]
struct Cli {
    #[arg(
        short = 'c',
        long,
        default_value = "news",
        help = "Category of channels to search"
    )]
    category: String,
    #[arg(
        short = 'd',
        long,
        value_name = "YYYY-MM-DD",
        help = "Target date (default: today)"
    )]
    date: Option<String>,
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH, help = "Path to the config file")]
    config: PathBuf,
}

/// Validates the `--date` flag before anything touches the network.
fn parse_target_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date format: {raw}. Use YYYY-MM-DD")),
        None => Ok(today),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let now: DateTime<Utc> = Utc::now();

    // Everything that can fail on local input fails here, before the first
    // remote call.
    let target_date = parse_target_date(cli.date.as_deref(), now.date_naive())?;
    let config = AppConfig::load(&cli.config)?;
    let hours_back = config.category(&cli.category)?.hours_back;
    let channels = config.category_channels(&cli.category)?;

    let api_key = match env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => key,
        _ => bail!("{API_KEY_ENV} is not set"),
    };
    let access_token = match env::var(ACCESS_TOKEN_ENV) {
        Ok(token) if !token.is_empty() => token,
        _ => bail!("{ACCESS_TOKEN_ENV} is not set"),
    };

    let window = TimeWindow::resolve(target_date, hours_back, now);

    log::info!("category: {}", cli.category);
    log::info!(
        "channels: {}",
        channels
            .iter()
            .map(|channel| channel.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    match hours_back {
        Some(hours) => log::info!("searching for videos from the last {hours} hours"),
        None => log::info!("searching for videos from {target_date}"),
    }
    log::info!(
        "time range: {} to {}",
        window.published_after(),
        window.published_before()
    );

    let client = DataApiClient::new(api_key, access_token);

    let searcher = VideoSearcher::new(&client);
    log::info!("searching videos from {} channel(s)...", channels.len());
    let videos = searcher.search_channels(&channels, &window, MAX_RESULTS_PER_CHANNEL)?;

    if videos.is_empty() {
        println!("No videos found matching your criteria");
        return Ok(());
    }

    for video in &videos {
        log::info!(
            "  {} | {} | {}",
            video.published_at.format("%Y-%m-%d %H:%M"),
            video.source_channel,
            video.title
        );
    }

    let title = naming::playlist_title(
        &cli.category,
        &channels,
        target_date,
        &config.playlist.title_template,
    )?;
    let description = naming::playlist_description(
        &cli.category,
        &channels,
        target_date,
        videos.len(),
        now.date_naive(),
        &config.playlist.description_template,
    )?;

    let manager = PlaylistManager::new(&client);
    log::info!("looking for existing playlist: {title}");
    let resolved = manager.get_or_create(&title, &description, config.playlist.privacy)?;

    log::info!("adding videos to playlist...");
    let outcome = manager.sync_membership(&resolved.id, &videos, true);

    println!("===================================");
    println!("Playlist update summary");
    println!("===================================");
    println!("Category: {}", cli.category);
    println!("Date: {target_date}");
    println!("Playlist: {title}");
    println!(
        "Reused existing playlist: {}",
        if resolved.existed { "yes" } else { "no" }
    );
    println!("Videos added: {}", outcome.added);
    println!("Videos failed: {}", outcome.failed);
    println!("Duplicates skipped: {}", outcome.skipped_duplicate);
    println!("Total videos found: {}", videos.len());
    println!();
    println!("{}", resolved.url);

    Ok(())
}
