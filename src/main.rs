//! appstore-reviews - Download public App Store customer reviews for any app.

use anyhow::Result;
use appstore_reviews::appstore::storefronts::Storefront;
use appstore_reviews::commands::FetchCommand;
use appstore_reviews::config::{Config, OutputMode};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "appstore-reviews",
    version,
    about = "Download public App Store customer reviews for any app",
    long_about = "Walks Apple's public customer-reviews feed page by page for every \
                  selected storefront and saves the reviews as JSON, newest to oldest."
)]
struct Cli {
    /// Path to config file
    #[arg(short = 'C', long, global = true)]
    config: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "APPSTORE_PROXY")]
    proxy: Option<String>,

    /// Pause between page requests in milliseconds
    #[arg(long, global = true, env = "APPSTORE_DELAY")]
    delay: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download reviews for an app
    #[command(alias = "f")]
    Fetch {
        /// Numeric app id (trackId), as seen in the App Store URL
        app_id: String,

        /// 2-letter storefront code. Can be used multiple times.
        /// If omitted, all storefronts are fetched.
        #[arg(short, long = "country")]
        country: Vec<String>,

        /// Destination directory for the JSON files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Save every review to one merged <app_id>-all.json instead of
        /// one file per storefront
        #[arg(short, long)]
        single_file: bool,
    },

    /// List known storefronts
    Storefronts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Fetch { app_id, country, output_dir, single_file } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if single_file {
                config.mode = OutputMode::Merged;
            }

            let cmd = FetchCommand::new(config);
            let report = cmd.execute(&app_id, &country).await?;
            println!("{}", report);
        }

        Commands::Storefronts => {
            println!("Known App Store storefronts:\n");
            println!("{:<6} {}", "Code", "Name");
            println!("{:-<6} {:-<30}", "", "");

            for storefront in Storefront::all() {
                println!("{:<6} {}", storefront.code(), storefront.name());
            }
        }
    }

    Ok(())
}
